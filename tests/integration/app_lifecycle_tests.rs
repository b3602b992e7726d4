/*!
 * Tests for the application controller from configuration to output file
 */

use anyhow::Result;
use std::fs;
use subtrans::app_config::{Config, TranslationProvider};
use subtrans::app_controller::Controller;
use subtrans::checkpoint::CheckpointStore;
use subtrans::providers::mock::MockProvider;
use crate::common;

fn config_with_batch_size(batch_size: usize) -> Config {
    let mut config = Config::default();
    config.translation.common.batch_size = batch_size;
    config
}

#[test]
fn test_withConfig_withZeroBatchSize_shouldFail() {
    assert!(Controller::with_config(config_with_batch_size(0)).is_err());
}

#[test]
fn test_withConfig_withDefaults_shouldSucceed() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    assert_eq!(controller.config().translation.common.batch_size, 10);
    Ok(())
}

#[tokio::test]
async fn test_runWithBackend_shouldWriteTranslatedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 5)?;
    let output = temp_dir.path().join("target.srt");
    let backend = MockProvider::working();

    let controller = Controller::with_config(config_with_batch_size(2))?;
    let result = controller.run_with_backend(backend.clone(), &input, &output, "en", "fr").await?;

    assert_eq!(result.entries.len(), 5);
    assert_eq!(backend.request_count(), 3);
    assert_eq!(common::read_entries(&output), result.entries);
    assert!(!CheckpointStore::for_output(&output).exists());
    Ok(())
}

#[tokio::test]
async fn test_runWithBackend_verbose_shouldResumeFromCheckpoint() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 4)?;
    let output = temp_dir.path().join("target.srt");

    let done: Vec<_> = common::numbered_entries(2)
        .iter()
        .map(|e| e.with_text(format!("Fait {}", e.index)))
        .collect();
    CheckpointStore::for_output(&output).save(&done);

    let backend = MockProvider::working();
    let controller = Controller::with_config(config_with_batch_size(2))?.verbose(true);
    let result = controller.run_with_backend(backend.clone(), &input, &output, "en", "fr").await?;

    assert!(result.was_resumed());
    assert_eq!(backend.request_count(), 1);
    assert_eq!(result.entries[1].text, "Fait 2");
    assert_eq!(result.entries[3].text, "[TRANSLATED] Line 4");
    Ok(())
}

#[test]
fn test_runWithBackend_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let backend = MockProvider::working();
    let controller = Controller::with_config(Config::default())?;

    let result = tokio_test::block_on(controller.run_with_backend(
        backend.clone(),
        &temp_dir.path().join("missing.srt"),
        &temp_dir.path().join("out.srt"),
        "en",
        "fr",
    ));

    assert!(result.is_err());
    assert_eq!(backend.request_count(), 0);
    assert!(!temp_dir.path().join("out.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_runWithBackend_withOutage_shouldKeepProgress() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 6)?;
    let output = temp_dir.path().join("target.srt");

    let controller = Controller::with_config(config_with_batch_size(3))?;
    let result = controller
        .run_with_backend(MockProvider::down_from(2), &input, &output, "en", "fr")
        .await;

    let message = format!("{:#}", result.expect_err("outage should stop the run"));
    assert!(message.contains("Failed to translate"));
    assert_eq!(CheckpointStore::for_output(&output).load().len(), 3);
    assert_eq!(common::read_entries(&output).len(), 3);
    Ok(())
}

/// A local provider that is not running fails on the first batch
#[tokio::test]
async fn test_run_withUnreachableLocalServer_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 2)?;
    let output = temp_dir.path().join("target.srt");

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    config.translation.active_provider_config_mut().endpoint = "http://127.0.0.1:9/v1".to_string();
    config.translation.active_provider_config_mut().timeout_secs = 5;

    let controller = Controller::with_config(config)?;
    let result = controller.run(&input, &output, "en", "fr").await;

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

/// The default configuration file is created on first use
#[test]
fn test_loadOrCreate_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let reloaded: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(reloaded.translation.common.batch_size, config.translation.common.batch_size);
    Ok(())
}
