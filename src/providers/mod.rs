/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: OpenAI chat completions API (also used for LM Studio)
 * - Anthropic: Anthropic messages API
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// Exactly one HTTP call is made; there is no retry.
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Classify a reqwest failure while sending a request
///
/// Anything that went wrong on the wire (connect, timeout, a socket dropped
/// mid-request) is a connection error; only a request that could not be
/// built or was otherwise rejected before transport is a request failure.
pub(crate) fn classify_reqwest_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if is_transport_failure(&error) {
        ProviderError::ConnectionError(format!("{} is unreachable: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("Failed to send request to {}: {}", provider, error))
    }
}

/// Classify a reqwest failure while reading a response body
///
/// A body cut off by the transport is a connection error; a complete body
/// that does not deserialize is a parse error.
pub(crate) fn classify_response_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if is_transport_failure(&error) {
        ProviderError::ConnectionError(format!("Lost connection to {} while reading the response: {}", provider, error))
    } else {
        ProviderError::ParseError(format!("Failed to parse {} response: {}", provider, error))
    }
}

fn is_transport_failure(error: &reqwest::Error) -> bool {
    if error.is_builder() {
        return false;
    }

    error.is_connect()
        || error.is_timeout()
        || error.is_request()
        || error.is_body()
        || has_io_source(error)
}

fn has_io_source(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return true;
        }
        source = std::error::Error::source(cause);
    }
    false
}

pub mod anthropic;
pub mod mock;
pub mod openai;
