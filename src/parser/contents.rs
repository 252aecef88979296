use std::collections::HashSet;

use serde::Serialize;

use super::title::{chapter_key, is_chapter_heading};

/// Chapter keys already listed in the table of contents.
///
/// Every chapter heading appears twice in a book: once as a contents entry
/// and once atop the chapter itself. The first repeat marks the end of the
/// listing.
#[derive(Debug, Default)]
pub struct ContentsTracker {
    seen: HashSet<String>,
}

impl ContentsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while `line` still belongs to the contents listing. Records
    /// chapter keys as a side effect.
    pub fn is_part_of_contents(&mut self, line: &str) -> bool {
        let line = line.trim();
        if !is_chapter_heading(line) {
            return true;
        }
        self.seen.insert(chapter_key(line))
    }

    pub fn chapter_count(&self) -> usize {
        self.seen.len()
    }
}

/// Chapter order recovered from a `CONTENTS.txt` page.
#[derive(Debug, Clone, Serialize)]
pub struct TableOfContents {
    pub chapter_order: Vec<String>,
    #[serde(skip)]
    pub content: String,
}

impl TableOfContents {
    /// Keys of lines starting with "chapter", in order of first appearance.
    pub fn parse(content: String) -> Self {
        let mut seen = HashSet::new();
        let chapter_order = content
            .split('\n')
            .map(str::trim)
            .filter(|line| is_chapter_heading(line))
            .map(chapter_key)
            .filter(|key| seen.insert(key.clone()))
            .collect();

        Self {
            chapter_order,
            content,
        }
    }
}

// ── Tests ──
