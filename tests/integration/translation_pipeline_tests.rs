/*!
 * Integration tests for the resumable translation pipeline
 */

use anyhow::Result;
use std::fs;
use std::sync::{Arc, Mutex};
use subtrans::checkpoint::CheckpointStore;
use subtrans::errors::{ProviderError, SubtitleError, TranslationError};
use subtrans::providers::mock::MockProvider;
use subtrans::subtitle_processor::SubtitleCollection;
use subtrans::translation::{translate_file, BatchTranslator, BatchWarning, TranslationPipeline};
use crate::common;

fn pipeline(backend: MockProvider, batch_size: usize) -> TranslationPipeline<MockProvider> {
    TranslationPipeline::new(BatchTranslator::new(backend), batch_size).expect("valid batch size")
}

/// A hard failure on the second batch keeps the first; the rerun only sends the rest
#[tokio::test]
async fn test_run_withOutageOnSecondBatch_shouldResumeAtThirdEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 3)?;
    let output = temp_dir.path().join("target.srt");
    let checkpoint = CheckpointStore::for_output(&output);

    let first = pipeline(MockProvider::down_from(2), 2);
    let result = first.run(&input, &output, "en", "fr").await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::ConnectionError(_)))
    ));
    let partial = common::read_entries(&output);
    assert_eq!(partial.len(), 2);
    assert_eq!(partial[1].text, "[TRANSLATED] Line 2");
    assert_eq!(checkpoint.load(), partial);

    let second = pipeline(MockProvider::working(), 2);
    let result = second.run(&input, &output, "en", "fr").await?;

    assert_eq!(result.resumed_from, 2);
    assert_eq!(result.batches_translated, 1);
    let requests = second.translator().backend().requests();
    assert_eq!(requests.len(), 1);
    let items = requests[0].items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Line 3");

    let final_entries = common::read_entries(&output);
    assert_eq!(final_entries.len(), 3);
    assert_eq!(final_entries[2].text, "[TRANSLATED] Line 3");
    assert!(!checkpoint.exists());
    Ok(())
}

/// Interrupted-then-resumed output equals an uninterrupted run
#[tokio::test]
async fn test_run_resumed_shouldMatchUninterruptedOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 9)?;
    let straight = temp_dir.path().join("straight.srt");
    let resumed = temp_dir.path().join("resumed.srt");

    pipeline(MockProvider::working(), 4).run(&input, &straight, "en", "de").await?;

    assert!(pipeline(MockProvider::down_from(3), 4).run(&input, &resumed, "en", "de").await.is_err());
    let rerun = pipeline(MockProvider::working(), 4);
    let result = rerun.run(&input, &resumed, "en", "de").await?;

    assert_eq!(result.resumed_from, 8);
    assert_eq!(rerun.translator().backend().request_count(), 1);
    assert_eq!(fs::read_to_string(&straight)?, fs::read_to_string(&resumed)?);
    Ok(())
}

/// The checkpoint grows by whole batches and the output always parses
#[tokio::test]
async fn test_run_shouldGrowCheckpointByWholeBatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 7)?;
    let output = temp_dir.path().join("target.srt");

    let observed = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&observed);
    let output_for_callback = output.clone();
    let checkpoint = CheckpointStore::for_output(&output);

    let pipeline = pipeline(MockProvider::working(), 3).with_progress_callback(move |done, total| {
        let saved = checkpoint.load().len();
        let written = common::read_entries(&output_for_callback).len();
        seen.lock().unwrap().push((done, total, saved, written));
    });
    pipeline.run(&input, &output, "en", "fr").await?;

    assert_eq!(
        *observed.lock().unwrap(),
        vec![(3, 7, 3, 3), (6, 7, 6, 6), (7, 7, 7, 7)]
    );
    Ok(())
}

/// Five entries with a batch size of ten is a single request
#[tokio::test]
async fn test_run_withLargeBatchSize_shouldSendOneRequest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 5)?;
    let output = temp_dir.path().join("target.srt");

    let pipeline = pipeline(MockProvider::working(), 10);
    let result = pipeline.run(&input, &output, "en", "fr").await?;

    assert_eq!(result.entries.len(), 5);
    assert_eq!(result.batches_translated, 1);
    assert_eq!(pipeline.translator().backend().request_count(), 1);
    assert!(!CheckpointStore::path_for(&output).exists());
    Ok(())
}

/// A checkpoint written for another file is ignored
#[tokio::test]
async fn test_run_withStaleCheckpoint_shouldStartOver() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 4)?;
    let output = temp_dir.path().join("target.srt");

    let mut stale = common::numbered_entries(2);
    stale[0].end_time = "01:00:00,000".to_string();
    CheckpointStore::for_output(&output).save(&stale);

    let result = pipeline(MockProvider::working(), 2).run(&input, &output, "en", "fr").await?;

    assert_eq!(result.resumed_from, 0);
    assert_eq!(result.batches_translated, 2);
    assert_eq!(result.entries[0].end_time, "00:00:01,900");
    Ok(())
}

/// A corrupt checkpoint counts as no checkpoint
#[tokio::test]
async fn test_run_withCorruptCheckpoint_shouldStartOver() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 2)?;
    let output = temp_dir.path().join("target.srt");
    fs::write(CheckpointStore::path_for(&output), "[{\"index\": ")?;

    let result = pipeline(MockProvider::working(), 1).run(&input, &output, "en", "fr").await?;

    assert_eq!(result.resumed_from, 0);
    assert_eq!(result.entries.len(), 2);
    Ok(())
}

/// Server errors do not stop the run; entries keep their source text
#[tokio::test]
async fn test_run_withServerErrors_shouldFinishWithOriginals() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 4)?;
    let output = temp_dir.path().join("target.srt");

    let result = pipeline(MockProvider::intermittent(2), 2).run(&input, &output, "en", "fr").await?;

    let texts: Vec<&str> = result.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["[TRANSLATED] Line 1", "[TRANSLATED] Line 2", "Line 3", "Line 4"]);
    assert!(matches!(result.warnings.as_slice(), [BatchWarning::ServiceFailed(_)]));
    assert!(!CheckpointStore::path_for(&output).exists());
    Ok(())
}

/// Failing to write the output stops the run
#[tokio::test]
async fn test_run_withUnwritableOutput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 2)?;
    let output = temp_dir.path().join("occupied");
    fs::create_dir(&output)?;

    let result = pipeline(MockProvider::working(), 1).run(&input, &output, "en", "fr").await;

    assert!(matches!(result, Err(TranslationError::Subtitle(SubtitleError::Io { .. }))));
    Ok(())
}

/// A file with no usable entries produces an empty output and no requests
#[tokio::test]
async fn test_run_withNoEntries_shouldWriteEmptyOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "source.srt", "not\na subtitle\n")?;
    let output = temp_dir.path().join("target.srt");

    let pipeline = pipeline(MockProvider::working(), 3);
    let result = pipeline.run(&input, &output, "en", "fr").await?;

    assert!(result.entries.is_empty());
    assert_eq!(pipeline.translator().backend().request_count(), 0);
    assert_eq!(fs::read_to_string(&output)?, "");
    Ok(())
}

/// Blank replies and blank lines inside replies never break the written file
#[tokio::test]
async fn test_run_withBlankReplyTexts_shouldWriteParsableOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_numbered_subtitle(temp_dir.path(), "source.srt", 3)?;
    let output = temp_dir.path().join("target.srt");

    let reply = r#"[{"id":0,"text":"A\n\nB"},{"id":1,"text":""},{"id":2,"text":"C"}]"#;
    let result = pipeline(MockProvider::scripted([reply]), 3).run(&input, &output, "en", "fr").await?;

    let texts: Vec<&str> = result.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["A\nB", "Line 2", "C"]);
    assert_eq!(result.warnings, vec![BatchWarning::MissingIds(vec![1])]);

    let report = SubtitleCollection::parse_srt_string(&fs::read_to_string(&output)?);
    assert!(report.skipped.is_empty());
    assert_eq!(report.entries, result.entries);
    Ok(())
}

/// The convenience function returns the translated entries
#[tokio::test]
async fn test_translateFile_shouldReturnEntriesAndRejectZeroBatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "source.srt")?;
    let output = temp_dir.path().join("target.srt");

    let entries = translate_file(BatchTranslator::new(MockProvider::working()), &input, &output, "en", "es", 2).await?;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].text, "[TRANSLATED] This is a test subtitle.");
    assert_eq!(SubtitleCollection::from_srt_file(&output)?.entries, entries);

    let zero = translate_file(BatchTranslator::new(MockProvider::working()), &input, &output, "en", "es", 0).await;
    assert!(matches!(zero, Err(TranslationError::InvalidSettings(_))));
    Ok(())
}
