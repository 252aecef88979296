use std::collections::HashSet;
use std::path::PathBuf;

use indicatif::ProgressBar;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{DuplicateKeys, SplitParams};
use crate::error::{BookError, Result};
use crate::layout::{Section, TreeLayout};
use crate::parser::classify::{BookMetadata, Flush, LineClassifier, ParseState};
use crate::parser::lines::LineSplitter;
use crate::parser::split_sections;
use crate::storage::{ensure_dir, read_text, write_text, ChunkReader};

/// Summary of a finished split.
#[derive(Debug, Serialize)]
pub struct SplitReport {
    #[serde(flatten)]
    pub metadata: BookMetadata,
    /// Chapter keys in the order they were found.
    pub chapters: Vec<String>,
    pub files_written: usize,
}

/// Files a split would produce, without touching the target directory.
#[derive(Debug, Serialize)]
pub struct SplitPlan {
    #[serde(flatten)]
    pub metadata: BookMetadata,
    pub files: Vec<PlannedFile>,
}

#[derive(Debug, Serialize)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Stream a book from disk and write one file per section under
/// `save_to_path`.
pub async fn split_book(params: &SplitParams, progress: &ProgressBar) -> Result<SplitReport> {
    params.validate()?;

    let layout = TreeLayout::new(&params.save_to_path);
    info!(
        "Splitting {} into {}",
        params.book_name.display(),
        layout.root().display()
    );
    ensure_dir(&layout.chapters_dir()).await?;

    let mut reader = ChunkReader::open(&params.book_name).await?;
    progress.set_length(reader.byte_len());

    let mut splitter = LineSplitter::new(params.line_ending);
    let mut classifier = LineClassifier::new(params.preserve_line_breaks);
    let mut writer = SectionWriter::new(layout, params.duplicate_keys);

    while let Some(chunk) = reader.next_chunk().await? {
        progress.inc(chunk.len() as u64);
        for line in splitter.push(chunk) {
            if let Some(flush) = classifier.feed(&line) {
                writer.schedule(flush).await?;
            }
        }
    }

    if let Some(line) = splitter.finish() {
        if let Some(flush) = classifier.feed(&line) {
            writer.schedule(flush).await?;
        }
    }
    match classifier.state() {
        ParseState::Header => warn!("No contents marker found; the whole book goes to the appendix"),
        ParseState::Contents => warn!("No chapter headings found after the contents listing"),
        _ => {}
    }
    let (last, metadata) = classifier.finish();
    writer.schedule(last).await?;
    writer.drain().await?;

    info!(
        "Wrote {} files ({} chapters)",
        writer.scheduled,
        writer.chapters.len()
    );
    Ok(SplitReport {
        metadata,
        chapters: writer.chapters,
        files_written: writer.scheduled,
    })
}

/// Run the classifier over the whole book in memory and list the files a
/// split would write.
pub async fn plan_split(params: &SplitParams) -> Result<SplitPlan> {
    params.validate()?;

    let layout = TreeLayout::new(&params.save_to_path);
    let text = read_text(&params.book_name).await?;
    let (flushes, metadata) = split_sections(
        text.as_bytes(),
        params.line_ending,
        params.preserve_line_breaks,
    );

    let files = flushes
        .iter()
        .map(|f| PlannedFile {
            path: layout.path_for(&f.section),
            bytes: f.text.len(),
        })
        .collect();
    Ok(SplitPlan { metadata, files })
}

/// Schedules section writes without waiting on them. Writes to distinct
/// paths run concurrently; `drain` collects every outcome.
struct SectionWriter {
    layout: TreeLayout,
    duplicates: DuplicateKeys,
    seen: HashSet<String>,
    chapters: Vec<String>,
    tasks: JoinSet<Result<()>>,
    scheduled: usize,
}

impl SectionWriter {
    fn new(layout: TreeLayout, duplicates: DuplicateKeys) -> Self {
        Self {
            layout,
            duplicates,
            seen: HashSet::new(),
            chapters: Vec::new(),
            tasks: JoinSet::new(),
            scheduled: 0,
        }
    }

    async fn schedule(&mut self, flush: Flush) -> Result<()> {
        if let Section::Chapter(key) = &flush.section {
            if self.seen.insert(key.clone()) {
                self.chapters.push(key.clone());
            } else {
                match self.duplicates {
                    DuplicateKeys::Reject => return Err(BookError::DuplicateChapter(key.clone())),
                    DuplicateKeys::Overwrite => {
                        warn!("Chapter key {:?} repeats, overwriting earlier chapter", key);
                        // Earlier write to the same path must land first.
                        self.drain().await?;
                    }
                }
            }
        }

        let path = self.layout.path_for(&flush.section);
        debug!(
            "Flushing {} ({} bytes) to {}",
            flush.section,
            flush.text.len(),
            path.display()
        );
        self.tasks
            .spawn(async move { write_text(&path, &flush.text).await });
        self.scheduled += 1;
        Ok(())
    }

    /// Wait for every scheduled write; the first failure wins.
    async fn drain(&mut self) -> Result<()> {
        while let Some(joined) = self.tasks.join_next().await {
            joined??;
        }
        Ok(())
    }
}

// ── Tests ──
