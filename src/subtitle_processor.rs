use std::fs;
use std::fs::File;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use log::{warn, debug};
use crate::errors::SubtitleError;

// @module: Subtitle parsing and writing

// @const: SRT timing line regex, anchored at line start
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    // @field: Index as written in the source file
    pub index: usize,

    // @field: Start timestamp, kept verbatim
    pub start_time: String,

    // @field: End timestamp, kept verbatim
    pub end_time: String,

    // @field: Cue text, may span several lines
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(index: usize, start_time: impl Into<String>, end_time: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }

    /// Copy of this entry with the same index and timing but a different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index: self.index,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            text: text.into(),
        }
    }

    /// True when both entries occupy the same slot (index and timing)
    pub fn same_cue(&self, other: &SubtitleEntry) -> bool {
        self.index == other.index
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }

    /// Short single-line preview of the text for logs
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.text.replace('\n', " ");
        if flat.chars().count() > max_chars {
            let cut: String = flat.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            flat
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Why a block of the input was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three lines (index, timing, text)
    TooFewLines,
    /// First line is not an integer
    InvalidIndex,
    /// Second line does not hold a timing pair
    InvalidTiming,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooFewLines => write!(f, "fewer than 3 lines"),
            Self::InvalidIndex => write!(f, "index line is not an integer"),
            Self::InvalidTiming => write!(f, "timing line does not match"),
        }
    }
}

/// A malformed block that the parser skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// 1-based position of the block in the file
    pub position: usize,
    /// What was wrong with it
    pub reason: SkipReason,
}

/// Entries parsed from SRT content along with the blocks that were skipped
#[derive(Debug, Clone, Default)]
pub struct SrtParseReport {
    /// Well-formed entries in file order
    pub entries: Vec<SubtitleEntry>,
    /// Malformed blocks, in file order
    pub skipped: Vec<SkippedBlock>,
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Load and parse an SRT file
    ///
    /// A missing or unreadable file is an error. Malformed blocks are not:
    /// they are logged and left out of the collection.
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SubtitleError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path).map_err(|e| SubtitleError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let report = Self::parse_srt_string(&content);
        if !report.skipped.is_empty() {
            warn!(
                "Skipped {} malformed subtitle block(s) in {}",
                report.skipped.len(),
                path.display()
            );
        }

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries: report.entries,
        })
    }

    /// Write subtitles to an SRT file, replacing any previous content
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        Self::write_entries(&self.entries, path)
    }

    /// Write a slice of entries to an SRT file, replacing any previous content
    pub fn write_entries<P: AsRef<Path>>(entries: &[SubtitleEntry], path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let io_error = |e: std::io::Error| SubtitleError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        for entry in entries {
            write!(writer, "{}", entry).map_err(io_error)?;
        }
        writer.flush().map_err(io_error)?;

        Ok(())
    }

    /// Render entries as SRT text
    pub fn to_srt_string(entries: &[SubtitleEntry]) -> String {
        entries.iter().map(|e| e.to_string()).collect()
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Blocks are separated by a blank line. Each block needs an integer index
    /// line, a timing line and at least one line of text; anything else is
    /// skipped and reported. Entries keep file order and their original index.
    pub fn parse_srt_string(content: &str) -> SrtParseReport {
        let normalized = content
            .trim_start_matches('\u{feff}')
            .replace("\r\n", "\n");

        let mut report = SrtParseReport::default();

        for (block_idx, block) in normalized.trim().split("\n\n").enumerate() {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            let position = block_idx + 1;
            match Self::parse_block(block) {
                Ok(entry) => report.entries.push(entry),
                Err(reason) => {
                    debug!("Skipping subtitle block {}: {}", position, reason);
                    report.skipped.push(SkippedBlock { position, reason });
                }
            }
        }

        report
    }

    fn parse_block(block: &str) -> Result<SubtitleEntry, SkipReason> {
        let lines: Vec<&str> = block.split('\n').collect();
        if lines.len() < 3 {
            return Err(SkipReason::TooFewLines);
        }

        let index = lines[0]
            .trim()
            .parse::<usize>()
            .map_err(|_| SkipReason::InvalidIndex)?;

        let caps = TIMING_REGEX
            .captures(lines[1])
            .ok_or(SkipReason::InvalidTiming)?;

        Ok(SubtitleEntry {
            index,
            start_time: caps[1].to_string(),
            end_time: caps[2].to_string(),
            text: lines[2..].join("\n"),
        })
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
