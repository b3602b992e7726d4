/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;
use subtrans::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.common.batch_size, 10);
    assert_eq!(config.translation.common.temperature, 0.3);
    assert_eq!(config.log_level, LogLevel::Info);

    let openai = config.translation.get_provider_config(&TranslationProvider::OpenAI)
        .expect("OpenAI provider config should exist");
    assert_eq!(openai.model, "gpt-4o-mini");
    assert_eq!(openai.endpoint, "https://api.openai.com/v1");
    assert_eq!(openai.max_tokens, 4096);

    let lmstudio = config.translation.get_provider_config(&TranslationProvider::LMStudio)
        .expect("LM Studio provider config should exist");
    assert_eq!(lmstudio.timeout_secs, 300);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.translation.common.temperature = 2.5;
    assert!(config.validate().is_err());
    config.translation.common.temperature = 0.3;

    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());
    config.translation.common.batch_size = 10;

    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.translation.active_provider_config_mut().endpoint = "http://localhost:8080/v1".to_string();

    config.translation.active_provider_config_mut().max_tokens = 0;
    assert!(config.validate().is_err());
}

/// Test loading a partial JSON file fills in defaults
#[test]
fn test_load_or_create_withPartialFile_shouldApplyDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "translation": {
                "provider": "anthropic",
                "available_providers": [{ "type": "anthropic", "model": "claude-3-5-sonnet-latest" }],
                "common": { "batch_size": 25 }
            },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.get_model(), "claude-3-5-sonnet-latest");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
    assert_eq!(config.translation.common.batch_size, 25);
    assert_eq!(config.translation.common.temperature, 0.3);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test a missing file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let reloaded: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(reloaded.translation.provider, config.translation.provider);
    assert_eq!(reloaded.translation.common.batch_size, 10);
    Ok(())
}

/// Test a broken file is an error
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ broken")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Test provider parsing and naming
#[test]
fn test_translationProvider_fromStr_shouldParseKnownNames() {
    assert_eq!("openai".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("Anthropic".parse::<TranslationProvider>().unwrap(), TranslationProvider::Anthropic);
    assert_eq!("lmstudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("deepl".parse::<TranslationProvider>().is_err());

    assert_eq!(TranslationProvider::LMStudio.to_string(), "lmstudio");
    assert_eq!(TranslationProvider::LMStudio.display_name(), "LM Studio");
    assert_eq!(TranslationProvider::Anthropic.api_key_env_var(), Some("ANTHROPIC_API_KEY"));
    assert_eq!(TranslationProvider::LMStudio.api_key_env_var(), None);
}

/// Test the model override creates the provider entry when missing
#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Anthropic;

    config.translation.active_provider_config_mut().model = "custom".to_string();

    assert_eq!(config.translation.get_model(), "custom");
    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.available_providers[0].provider_type, "anthropic");
}

/// Test credential resolution from the config file and for keyless providers
#[test]
fn test_resolve_api_key_withConfigKeyOrKeylessProvider_shouldSucceed() {
    let mut config = Config::default();

    config.translation.provider = TranslationProvider::LMStudio;
    assert_eq!(config.translation.resolve_api_key().unwrap(), "lm-studio");

    // The file value is only used when the environment has none; a key in
    // the file always makes resolution succeed.
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.available_providers = vec![ProviderConfig {
        api_key: "sk-from-file".to_string(),
        ..ProviderConfig::new(TranslationProvider::OpenAI)
    }];
    assert!(config.translation.resolve_api_key().is_ok());
}

/// Test log level mapping
#[test]
fn test_logLevel_toLevelFilter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
