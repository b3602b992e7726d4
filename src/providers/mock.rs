/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Answers like a well-behaved model (`[TRANSLATED] ...`)
 * - `MockProvider::scripted()` - Returns canned replies in order
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::unreachable()` - Always fails to connect
 * - `MockProvider::down_from()` - Works, then becomes unreachable
 *
 * Clones share their request counter and request log, so a test can keep a
 * handle while the pipeline owns the provider.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::core::CompletionBackend;
use crate::translation::prompts::templates::{items_from_user_prompt, BatchItem};

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// System instructions
    pub system_prompt: String,
    /// User message carrying the batch payload
    pub user_prompt: String,
}

impl MockRequest {
    /// Batch items carried by the user message, if it has the expected shape
    pub fn items(&self) -> Vec<BatchItem> {
        items_from_user_prompt(&self.user_prompt).unwrap_or_default()
    }
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The reply text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo every item back prefixed with `[TRANSLATED] `
    Working,
    /// Pop the next scripted reply; behaves like `Working` once they run out
    Scripted,
    /// Fails with a 503 every Nth request
    Intermittent { fail_every: usize },
    /// Always fails with a 500
    Failing,
    /// Always fails to connect
    Unreachable,
    /// Works until the given 1-based call, then fails to connect from there on
    DownFrom { call: usize },
    /// Returns an empty reply
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    replies: Arc<Mutex<VecDeque<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns the given replies, one per call
    pub fn scripted<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        let provider = Self::new(MockBehavior::Scripted);
        if let Ok(mut queue) = provider.replies.lock() {
            queue.extend(replies.into_iter().map(Into::into));
        }
        provider
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose service can never be reached
    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    /// Create a mock that goes down on the given 1-based call
    pub fn down_from(call: usize) -> Self {
        Self::new(MockBehavior::DownFrom { call })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received so far, including failed ones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Reply a well-behaved model would give for these items
    pub fn generate_batch_response(items: &[BatchItem]) -> String {
        let translated: Vec<BatchItem> = items
            .iter()
            .map(|item| BatchItem {
                id: item.id,
                text: format!("[TRANSLATED] {}", item.text),
            })
            .collect();
        serde_json::to_string(&translated).unwrap_or_else(|_| "[]".to_string())
    }

    fn next_scripted_reply(&self) -> Option<String> {
        self.replies.lock().ok().and_then(|mut queue| queue.pop_front())
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        let echo = || MockResponse {
            text: Self::generate_batch_response(&request.items()),
        };

        match self.behavior {
            MockBehavior::Working => Ok(echo()),

            MockBehavior::Scripted => Ok(match self.next_scripted_reply() {
                Some(text) => MockResponse { text },
                None => echo(),
            }),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && call % fail_every == 0 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", call),
                        status_code: 503,
                    })
                } else {
                    Ok(echo())
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unreachable => Err(ProviderError::ConnectionError(
                "Simulated connection refused".to_string(),
            )),

            MockBehavior::DownFrom { call: down_at } => {
                if call >= down_at {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated outage (request #{})",
                        call
                    )))
                } else {
                    Ok(echo())
                }
            }

            MockBehavior::Empty => Ok(MockResponse { text: String::new() }),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}

#[async_trait]
impl CompletionBackend for MockProvider {
    async fn complete_chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = MockRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        };
        let response = self.complete(request).await?;
        Ok(Self::extract_text(&response))
    }
}
