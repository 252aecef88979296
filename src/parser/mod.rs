pub mod classify;
pub mod contents;
pub mod lines;
pub mod title;

use crate::config::LineEnding;
use classify::{BookMetadata, Flush, LineClassifier};
use lines::LineSplitter;

/// In-memory pipeline: bytes → lines → sections. The streaming splitter runs
/// the same stages chunk by chunk.
pub fn split_sections(
    text: &[u8],
    ending: LineEnding,
    preserve_line_breaks: bool,
) -> (Vec<Flush>, BookMetadata) {
    let mut splitter = LineSplitter::new(ending);
    let mut classifier = LineClassifier::new(preserve_line_breaks);

    let mut lines = splitter.push(text);
    lines.extend(splitter.finish());

    let mut flushes: Vec<Flush> = lines.iter().filter_map(|l| classifier.feed(l)).collect();
    let (last, metadata) = classifier.finish();
    flushes.push(last);
    (flushes, metadata)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Section;

    fn fixture() -> Vec<u8> {
        std::fs::read("tests/fixtures/tale.txt").unwrap()
    }

    #[test]
    fn fixture_sections() {
        let (flushes, metadata) = split_sections(&fixture(), LineEnding::Crlf, false);
        let names: Vec<String> = flushes.iter().map(|f| f.section.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "HEADER",
                "CONTENTS",
                "chapter \"Chapter 1\"",
                "chapter \"Chapter 2\"",
                "chapter \"Chapter 3\"",
                "APPENDIX",
            ]
        );
        assert_eq!(metadata.title.as_deref(), Some("A Tale of Two Cities"));
        assert_eq!(metadata.author.as_deref(), Some("Charles Dickens"));
    }

    #[test]
    fn fixture_chapter_text() {
        let (flushes, _) = split_sections(&fixture(), LineEnding::Crlf, false);
        let first = flushes
            .iter()
            .find(|f| f.section == Section::Chapter("Chapter 1".into()))
            .unwrap();
        assert!(first.text.starts_with("Chapter 1. The Period"));
        assert!(first.text.contains("It was the best of times,"));
        assert!(!first.text.contains("Chapter 2"));
    }

    #[test]
    fn lf_book_needs_lf_mode() {
        let text = fixture();
        let lf: Vec<u8> = String::from_utf8(text).unwrap().replace("\r\n", "\n").into_bytes();

        let (crlf_view, _) = split_sections(&lf, LineEnding::Crlf, false);
        assert_eq!(crlf_view.len(), 1);

        let (lf_view, _) = split_sections(&lf, LineEnding::Lf, false);
        assert_eq!(lf_view.len(), 6);
    }
}
