use std::fmt;
use std::path::{Path, PathBuf};

pub const HEADER_FILE: &str = "HEADER.txt";
pub const CONTENTS_FILE: &str = "CONTENTS.txt";
pub const APPENDIX_FILE: &str = "APPENDIX.txt";
pub const CHAPTERS_DIR: &str = "chapters";

/// One unit of the tree: a fixed page or a chapter named by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Header,
    Contents,
    Chapter(String),
    Appendix,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => f.write_str("HEADER"),
            Section::Contents => f.write_str("CONTENTS"),
            Section::Chapter(key) => write!(f, "chapter {:?}", key),
            Section::Appendix => f.write_str("APPENDIX"),
        }
    }
}

/// File layout of a split book rooted at one directory.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    root: PathBuf,
}

impl TreeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn header(&self) -> PathBuf {
        self.root.join(HEADER_FILE)
    }

    pub fn contents(&self) -> PathBuf {
        self.root.join(CONTENTS_FILE)
    }

    pub fn appendix(&self) -> PathBuf {
        self.root.join(APPENDIX_FILE)
    }

    pub fn chapters_dir(&self) -> PathBuf {
        self.root.join(CHAPTERS_DIR)
    }

    pub fn chapter(&self, key: &str) -> PathBuf {
        self.chapters_dir().join(format!("{}.txt", key))
    }

    pub fn path_for(&self, section: &Section) -> PathBuf {
        match section {
            Section::Header => self.header(),
            Section::Contents => self.contents(),
            Section::Chapter(key) => self.chapter(key),
            Section::Appendix => self.appendix(),
        }
    }
}
