use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::{BookError, Result};

/// Line terminator used to cut the source stream into lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Crlf => b"\r\n",
            LineEnding::Lf => b"\n",
        }
    }
}

/// What to do when two chapter headings normalize to the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// Later chapter replaces the earlier file.
    #[default]
    Overwrite,
    /// Fail the split.
    Reject,
}

#[derive(Debug, Clone)]
pub struct SplitParams {
    pub book_name: PathBuf,
    pub save_to_path: PathBuf,
    pub line_ending: LineEnding,
    pub preserve_line_breaks: bool,
    pub duplicate_keys: DuplicateKeys,
}

impl SplitParams {
    pub fn new(book_name: impl Into<PathBuf>, save_to_path: impl Into<PathBuf>) -> Self {
        Self {
            book_name: book_name.into(),
            save_to_path: save_to_path.into(),
            line_ending: LineEnding::default(),
            preserve_line_breaks: false,
            duplicate_keys: DuplicateKeys::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.book_name, "book_name")?;
        require(&self.save_to_path, "save_to_path")
    }
}

#[derive(Debug, Clone)]
pub struct AssembleParams {
    pub book_path: PathBuf,
    pub save_to_file: PathBuf,
}

impl AssembleParams {
    pub fn new(book_path: impl Into<PathBuf>, save_to_file: impl Into<PathBuf>) -> Self {
        Self {
            book_path: book_path.into(),
            save_to_file: save_to_file.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.book_path, "book_path")?;
        require(&self.save_to_file, "save_to_file")
    }
}

fn require(path: &Path, name: &'static str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(BookError::MissingParam(name));
    }
    Ok(())
}
