use indicatif::ProgressBar;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::AssembleParams;
use crate::error::Result;
use crate::layout::TreeLayout;
use crate::parser::contents::TableOfContents;
use crate::storage::{ensure_dir, read_text, write_text};

#[derive(Debug, Serialize)]
pub struct AssembleReport {
    /// Chapter keys in the order they were written.
    pub chapters: Vec<String>,
    pub bytes: usize,
}

/// Read `CONTENTS.txt` and recover the chapter order it declares.
pub async fn read_toc(layout: &TreeLayout) -> Result<TableOfContents> {
    let content = read_text(&layout.contents()).await?;
    Ok(TableOfContents::parse(content))
}

/// Rebuild a single book file from a split tree.
///
/// The contents page decides chapter order; whatever order the files have
/// on disk is ignored. Any missing piece fails the whole run before the
/// destination is written.
pub async fn assemble_book(
    params: &AssembleParams,
    progress: &ProgressBar,
) -> Result<AssembleReport> {
    params.validate()?;

    let layout = TreeLayout::new(&params.book_path);
    info!(
        "Assembling {} into {}",
        layout.root().display(),
        params.save_to_file.display()
    );

    let header = read_text(&layout.header()).await?;

    let toc = read_toc(&layout).await?;
    debug!("Contents lists {} chapters", toc.chapter_order.len());

    progress.set_length(toc.chapter_order.len() as u64);
    let chapters = read_chapters(&layout, &toc.chapter_order, progress).await?;

    let appendix = read_text(&layout.appendix()).await?;

    let mut book = header;
    book.push_str(&toc.content);
    for chapter in &chapters {
        book.push_str(chapter);
    }
    book.push_str(&appendix);

    if let Some(parent) = params
        .save_to_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        ensure_dir(parent).await?;
    }
    write_text(&params.save_to_file, &book).await?;

    info!(
        "Wrote {} bytes ({} chapters)",
        book.len(),
        toc.chapter_order.len()
    );
    Ok(AssembleReport {
        chapters: toc.chapter_order,
        bytes: book.len(),
    })
}

/// Read every chapter concurrently; results come back in `keys` order.
async fn read_chapters(
    layout: &TreeLayout,
    keys: &[String],
    progress: &ProgressBar,
) -> Result<Vec<String>> {
    let mut tasks = JoinSet::new();
    for (index, key) in keys.iter().enumerate() {
        let path = layout.chapter(key);
        tasks.spawn(async move { read_text(&path).await.map(|text| (index, text)) });
    }

    let mut texts = vec![String::new(); keys.len()];
    while let Some(joined) = tasks.join_next().await {
        // Returning early drops the set, which aborts the remaining reads.
        let (index, text) = joined??;
        texts[index] = text;
        progress.inc(1);
    }
    Ok(texts)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::SplitParams;
    use crate::error::BookError;
    use crate::split::split_book;

    const FIXTURE: &str = "tests/fixtures/tale.txt";

    fn write_tree(root: &Path, contents: &str, chapters: &[(&str, &str)]) {
        let layout = TreeLayout::new(root);
        std::fs::create_dir_all(layout.chapters_dir()).unwrap();
        std::fs::write(layout.header(), "HEAD|").unwrap();
        std::fs::write(layout.contents(), contents).unwrap();
        for (key, text) in chapters {
            std::fs::write(layout.chapter(key), text).unwrap();
        }
        std::fs::write(layout.appendix(), "|END").unwrap();
    }

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[tokio::test]
    async fn chapters_follow_contents_order() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        // Created in an order unrelated to the listing.
        write_tree(
            &tree,
            "Contents\nChapter 3. C\nChapter 1. A\nChapter 2. B\n",
            &[("Chapter 1", "[one]"), ("Chapter 2", "[two]"), ("Chapter 3", "[three]")],
        );

        let out = dir.path().join("book.txt");
        let report = assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(report.chapters, vec!["Chapter 3", "Chapter 1", "Chapter 2"]);
        let book = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            book,
            "HEAD|Contents\nChapter 3. C\nChapter 1. A\nChapter 2. B\n[three][one][two]|END"
        );
        assert_eq!(report.bytes, book.len());
    }

    #[tokio::test]
    async fn missing_appendix_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        write_tree(&tree, "Contents\nChapter 1\n", &[("Chapter 1", "one")]);
        std::fs::remove_file(TreeLayout::new(&tree).appendix()).unwrap();

        let out = dir.path().join("book.txt");
        let err = assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::Read { ref path, .. } if path.ends_with("APPENDIX.txt")));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn missing_chapter_fails_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        write_tree(&tree, "Contents\nChapter 1\nChapter 2\n", &[("Chapter 1", "one")]);

        let out = dir.path().join("book.txt");
        let err = assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::Read { ref path, .. } if path.ends_with("Chapter 2.txt")));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn empty_params_fail_before_io() {
        let err = assemble_book(&AssembleParams::new("tree", ""), &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::MissingParam("save_to_file")));
    }

    #[tokio::test]
    async fn output_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        write_tree(&tree, "Contents\n", &[]);

        let out = dir.path().join("nested/deeper/book.txt");
        assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "HEAD|Contents\n|END");
    }

    #[tokio::test]
    async fn toc_reads_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), "Contents\n\nChapter 2. B\nChapter 1. A\n", &[]);
        let toc = read_toc(&TreeLayout::new(dir.path())).await.unwrap();
        assert_eq!(toc.chapter_order, vec!["Chapter 2", "Chapter 1"]);
    }

    #[tokio::test]
    async fn round_trip_is_exact_with_preserved_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        let mut split = SplitParams::new(FIXTURE, &tree);
        split.preserve_line_breaks = true;
        split_book(&split, &ProgressBar::hidden()).await.unwrap();

        let out = dir.path().join("book.txt");
        assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap();

        let original = std::fs::read_to_string(FIXTURE).unwrap().replace("\r\n", "\n");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), original);
    }

    #[tokio::test]
    async fn round_trip_keeps_text_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        split_book(&SplitParams::new(FIXTURE, &tree), &ProgressBar::hidden())
            .await
            .unwrap();

        let out = dir.path().join("book.txt");
        let report = assemble_book(&AssembleParams::new(&tree, &out), &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(report.chapters, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);

        let original = std::fs::read_to_string(FIXTURE).unwrap();
        let rebuilt = std::fs::read_to_string(&out).unwrap();
        assert_eq!(strip_whitespace(&rebuilt), strip_whitespace(&original));
    }
}
