/// Reduce a chapter heading to its short key, e.g.
/// `"Chapter 1. It was the best of times"` → `"Chapter 1"`.
///
/// Keeps the text up to the second space, then drops periods and path
/// separators so the key is usable as a single file name. Headings with
/// fewer than two spaces keep their full text.
pub fn chapter_key(heading: &str) -> String {
    let heading = heading.trim();
    let end = heading
        .match_indices(' ')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(heading.len());

    heading[..end]
        .chars()
        .filter(|c| !matches!(c, '.' | '/' | '\\'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Case-insensitive prefix test on the trimmed line.
pub fn line_starts(line: &str, prefix: &str) -> bool {
    line.trim()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

pub fn is_chapter_heading(line: &str) -> bool {
    line_starts(line, "chapter")
}

/// "Footnotes" or "Appendix" close the chapter run.
pub fn is_end_of_chapters(line: &str) -> bool {
    line_starts(line, "footnotes") || line_starts(line, "appendix")
}

// ── Tests ──
