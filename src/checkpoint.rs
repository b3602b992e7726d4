/*!
 * Checkpoint persistence for resumable translation runs.
 *
 * A checkpoint is the list of entries translated so far, stored as JSON next
 * to the output file. It only ever holds whole batches and is always a prefix
 * of the source entry sequence. Every operation here fails soft: problems are
 * logged and reported as "nothing to resume" or "not saved", never as errors.
 */

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::subtitle_processor::SubtitleEntry;

/// Suffix appended to the output file name to locate its checkpoint
pub const CHECKPOINT_SUFFIX: &str = ".checkpoint";

/// File-backed store for translation progress of one output file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store for the checkpoint that belongs to `output_path`
    pub fn for_output<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            path: Self::path_for(output_path),
        }
    }

    /// Store backed by an explicit checkpoint file
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Checkpoint path derived from an output path (`movie.fr.srt.checkpoint`)
    pub fn path_for<P: AsRef<Path>>(output_path: P) -> PathBuf {
        let mut raw = output_path.as_ref().as_os_str().to_os_string();
        raw.push(CHECKPOINT_SUFFIX);
        PathBuf::from(raw)
    }

    /// Location of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkpoint file is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load previously translated entries
    ///
    /// Returns an empty list when there is no checkpoint or when it cannot be
    /// read or decoded.
    pub fn load(&self) -> Vec<SubtitleEntry> {
        if !self.exists() {
            return Vec::new();
        }

        match self.read_entries() {
            Ok(entries) => {
                debug!("Loaded {} entries from checkpoint {}", entries.len(), self.path.display());
                entries
            }
            Err(e) => {
                warn!("Could not load checkpoint file {}: {:#}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Load previously translated entries that still match `source`
    ///
    /// A checkpoint that is not a prefix of the source sequence (more entries
    /// than the source, or a cue whose index or timing differs) was written
    /// for another input and is ignored.
    pub fn load_for(&self, source: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
        let entries = self.load();
        if entries.is_empty() {
            return entries;
        }

        if entries.len() > source.len() {
            warn!(
                "Ignoring checkpoint {}: it holds {} entries but the source only has {}",
                self.path.display(),
                entries.len(),
                source.len()
            );
            return Vec::new();
        }

        if let Some(pos) = entries.iter().zip(source).position(|(saved, src)| !saved.same_cue(src)) {
            warn!(
                "Ignoring checkpoint {}: entry {} does not match the source file",
                self.path.display(),
                pos + 1
            );
            return Vec::new();
        }

        entries
    }

    /// Persist the full translated-so-far sequence, replacing any previous checkpoint
    ///
    /// Returns false when the write failed; the failure is logged and the
    /// caller keeps going with its in-memory progress.
    pub fn save(&self, entries: &[SubtitleEntry]) -> bool {
        match self.write_entries(entries) {
            Ok(()) => {
                debug!("Saved checkpoint with {} entries to {}", entries.len(), self.path.display());
                true
            }
            Err(e) => {
                warn!("Could not save checkpoint {}: {:#}", self.path.display(), e);
                false
            }
        }
    }

    /// Remove the checkpoint file if present
    ///
    /// Returns false only when a present file could not be removed.
    pub fn discard(&self) -> bool {
        if !self.exists() {
            return true;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed checkpoint {}", self.path.display());
                true
            }
            Err(e) => {
                warn!("Could not remove checkpoint {}: {}", self.path.display(), e);
                false
            }
        }
    }

    fn read_entries(&self) -> Result<Vec<SubtitleEntry>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let entries = serde_json::from_str(&content)
            .context("Checkpoint is not a valid list of subtitle entries")?;
        Ok(entries)
    }

    // Temp file in the same directory, then rename over the old checkpoint,
    // so a crash mid-write leaves the previous checkpoint intact.
    fn write_entries(&self, entries: &[SubtitleEntry]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(entries)
            .context("Failed to serialize checkpoint")?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write checkpoint data")?;
        tmp.flush().context("Failed to flush checkpoint data")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move checkpoint into place at {}", self.path.display()))?;

        Ok(())
    }
}
