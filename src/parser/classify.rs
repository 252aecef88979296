use std::mem;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::contents::ContentsTracker;
use super::title::{chapter_key, is_chapter_heading, is_end_of_chapters, line_starts};
use crate::layout::Section;

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(title|author):(.*)$").unwrap());

/// Parser position in the book. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Header,
    Contents,
    Chapter,
    Appendix,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookMetadata {
    /// Pick up `Title:` / `Author:` labels. Later lines overwrite earlier ones.
    fn absorb(&mut self, line: &str) {
        let Some(caps) = LABEL_RE.captures(line) else {
            return;
        };
        let value = caps[2].trim().to_string();
        if caps[1].eq_ignore_ascii_case("title") {
            self.title = Some(value);
        } else {
            self.author = Some(value);
        }
    }
}

/// A completed section and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flush {
    pub section: Section,
    pub text: String,
}

/// Line-at-a-time state machine segmenting a book into sections.
///
/// A section is only known to be complete when the next one's heading shows
/// up, so every transition hands back the *previous* section's text.
#[derive(Debug)]
pub struct LineClassifier {
    state: ParseState,
    metadata: BookMetadata,
    tracker: ContentsTracker,
    chapter_key: String,
    buffer: String,
    preserve_line_breaks: bool,
}

impl LineClassifier {
    pub fn new(preserve_line_breaks: bool) -> Self {
        Self {
            state: ParseState::Header,
            metadata: BookMetadata::default(),
            tracker: ContentsTracker::new(),
            chapter_key: String::new(),
            buffer: String::new(),
            preserve_line_breaks,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Classify one line (without its terminator). Returns the section that
    /// this line closed, if any.
    pub fn feed(&mut self, line: &str) -> Option<Flush> {
        if line.is_empty() {
            self.buffer.push('\n');
            return None;
        }

        match self.state {
            ParseState::Header => {
                if line_starts(line, "contents") {
                    return Some(self.transition(Section::Header, ParseState::Contents, line));
                }
                self.metadata.absorb(line);
                self.append(line);
                None
            }
            ParseState::Contents => {
                if self.tracker.is_part_of_contents(line) {
                    self.append(line);
                    return None;
                }
                debug!("Contents listing ends after {} chapters", self.tracker.chapter_count());
                let flush = self.transition(Section::Contents, ParseState::Chapter, line);
                self.chapter_key = chapter_key(line);
                Some(flush)
            }
            ParseState::Chapter => {
                if is_chapter_heading(line) {
                    let previous = self.current_chapter();
                    let flush = self.transition(previous, ParseState::Chapter, line);
                    self.chapter_key = chapter_key(line);
                    Some(flush)
                } else if is_end_of_chapters(line) {
                    let previous = self.current_chapter();
                    Some(self.transition(previous, ParseState::Appendix, line))
                } else {
                    self.append(line);
                    None
                }
            }
            ParseState::Appendix => {
                self.append(line);
                None
            }
        }
    }

    /// Flush whatever is left at end of input. Anything not inside a chapter
    /// run lands in the appendix.
    pub fn finish(mut self) -> (Flush, BookMetadata) {
        let section = match self.state {
            ParseState::Chapter => self.current_chapter(),
            _ => Section::Appendix,
        };
        let flush = Flush {
            section,
            text: mem::take(&mut self.buffer),
        };
        (flush, self.metadata)
    }

    fn current_chapter(&self) -> Section {
        Section::Chapter(self.chapter_key.clone())
    }

    fn transition(&mut self, closed: Section, next: ParseState, line: &str) -> Flush {
        let flush = Flush {
            section: closed,
            text: mem::take(&mut self.buffer),
        };
        self.state = next;
        self.append(line);
        flush
    }

    // Contents entries always keep their line breaks; the assembler reads the
    // chapter order back line by line.
    fn append(&mut self, line: &str) {
        self.buffer.push_str(line);
        if self.preserve_line_breaks || self.state == ParseState::Contents {
            self.buffer.push('\n');
        }
    }
}

// ── Tests ──
