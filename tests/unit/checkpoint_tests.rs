/*!
 * Tests for checkpoint persistence
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use subtrans::checkpoint::CheckpointStore;
use crate::common;

/// Test the checkpoint path is derived from the output path
#[test]
fn test_pathFor_shouldAppendSuffix() {
    assert_eq!(
        CheckpointStore::path_for("out/movie.fr.srt"),
        PathBuf::from("out/movie.fr.srt.checkpoint")
    );
    assert_eq!(
        CheckpointStore::for_output("movie.srt").path(),
        PathBuf::from("movie.srt.checkpoint").as_path()
    );
}

/// Test save then load
#[test]
fn test_saveAndLoad_shouldReturnSameEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::for_output(temp_dir.path().join("out.srt"));
    let entries = common::numbered_entries(4);

    assert!(store.save(&entries));
    assert!(store.exists());
    assert_eq!(store.load(), entries);
    Ok(())
}

/// Test the file format is a readable JSON list
#[test]
fn test_save_shouldWritePrettyJsonList() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::for_output(temp_dir.path().join("out.srt"));

    store.save(&common::numbered_entries(1));

    let content = fs::read_to_string(store.path())?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    assert_eq!(value[0]["index"], 1);
    assert_eq!(value[0]["start_time"], "00:00:01,000");
    assert_eq!(value[0]["end_time"], "00:00:01,900");
    assert_eq!(value[0]["text"], "Line 1");
    assert!(content.contains('\n'));
    Ok(())
}

/// Test missing and corrupt checkpoints load as empty
#[test]
fn test_load_withMissingOrCorruptFile_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::for_output(temp_dir.path().join("out.srt"));
    assert!(store.load().is_empty());

    fs::write(store.path(), "{ not json")?;
    assert!(store.load().is_empty());

    fs::write(store.path(), r#"{"index": 1}"#)?;
    assert!(store.load().is_empty());
    Ok(())
}

/// Test a checkpoint from another input is ignored
#[test]
fn test_loadFor_withMismatchedSource_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::for_output(temp_dir.path().join("out.srt"));
    let source = common::numbered_entries(4);

    // Matching prefix, translated text
    let prefix: Vec<_> = source[..2].iter().map(|e| e.with_text("translated")).collect();
    store.save(&prefix);
    assert_eq!(store.load_for(&source), prefix);

    // Longer than the source
    store.save(&common::numbered_entries(5));
    assert!(store.load_for(&source).is_empty());

    // Different timing
    let mut shifted = prefix.clone();
    shifted[1].start_time = "00:10:00,000".to_string();
    store.save(&shifted);
    assert!(store.load_for(&source).is_empty());
    Ok(())
}

/// Test discard removes the file and tolerates absence
#[test]
fn test_discard_shouldRemoveFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::for_output(temp_dir.path().join("out.srt"));

    assert!(store.discard());
    store.save(&common::numbered_entries(1));
    assert!(store.discard());
    assert!(!store.exists());
    Ok(())
}

/// Test a failed save is reported, not raised
#[test]
fn test_save_withUnwritableLocation_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(temp_dir.path(), "blocker", "not a directory")?;
    let store = CheckpointStore::at(blocker.join("out.srt.checkpoint"));

    assert!(!store.save(&common::numbered_entries(1)));
    assert!(!store.exists());
    Ok(())
}
