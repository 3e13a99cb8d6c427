use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::Result;

use crate::file_utils::FileManager;

// @module: Subtitle document reading and line classification

// @const: WebVTT cue timing regex, seconds optional on both sides
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}(?::\d{2})?\.\d{3} --> \d{2}:\d{2}(?::\d{2})?\.\d{3}").unwrap()
});

/// What a single document line is, as far as translation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Cue timing or blank separator, copied to the output verbatim
    StructuralMarker,
    /// Subtitle text to be translated
    Dialogue,
}

impl LineKind {
    pub fn is_structural(self) -> bool {
        self == LineKind::StructuralMarker
    }
}

/// Classify one line of a subtitle document.
///
/// The line is trimmed first. Empty lines and lines that start with a
/// `start --> end` timing pair are structural; trailing cue settings such
/// as `align:start` do not change that. Everything else is dialogue.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() || TIMESTAMP_REGEX.is_match(trimmed) {
        LineKind::StructuralMarker
    } else {
        LineKind::Dialogue
    }
}

// @struct: Subtitle document as raw lines, terminators included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    lines: Vec<String>,
}

impl SubtitleDocument {
    /// Split text into lines, each keeping its own `\n` or `\r\n` terminator
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    // @reads: Whole UTF-8 file into a document
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines that will go through the translation backend
    pub fn dialogue_line_count(&self) -> usize {
        self.lines.iter().filter(|line| classify(line) == LineKind::Dialogue).count()
    }
}
