mod assemble;
mod config;
mod error;
mod layout;
mod parser;
mod split;
mod storage;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use config::{AssembleParams, DuplicateKeys, LineEnding, SplitParams};
use layout::TreeLayout;

#[derive(Parser)]
#[command(name = "booktree", about = "Split a plain-text book into a tree of section files and back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a book into HEADER, CONTENTS, chapters/ and APPENDIX files
    Split {
        /// Source book file
        book: PathBuf,
        /// Directory to write the tree into
        target: PathBuf,
        /// Line terminator of the source file
        #[arg(long, value_enum, default_value_t = LineEnding::Crlf)]
        line_ending: LineEnding,
        /// Keep a newline after every line instead of joining them
        #[arg(long)]
        preserve_line_breaks: bool,
        /// Fail when two chapters normalize to the same file name
        #[arg(long)]
        strict_keys: bool,
        /// List the files that would be written, without writing them
        #[arg(long)]
        dry_run: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rebuild one book file from a split tree
    Assemble {
        /// Tree directory produced by `split`
        tree: PathBuf,
        /// Book file to write
        output: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the chapter order declared by a tree's contents page
    Toc {
        /// Tree directory produced by `split`
        tree: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Split {
            book,
            target,
            line_ending,
            preserve_line_breaks,
            strict_keys,
            dry_run,
            json,
        } => {
            let mut params = SplitParams::new(book, target);
            params.line_ending = line_ending;
            params.preserve_line_breaks = preserve_line_breaks;
            if strict_keys {
                params.duplicate_keys = DuplicateKeys::Reject;
            }

            if dry_run {
                print_plan(&params, json).await
            } else {
                run_split(&params, json).await
            }
        }
        Commands::Assemble { tree, output, json } => {
            let params = AssembleParams::new(tree, output);
            let pb = progress_bar("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters")?;
            let report = assemble::assemble_book(&params, &pb).await?;
            pb.finish_and_clear();

            if json {
                print_json(&report)
            } else {
                println!(
                    "Assembled {} chapters ({} bytes) into {}",
                    report.chapters.len(),
                    report.bytes,
                    params.save_to_file.display()
                );
                Ok(())
            }
        }
        Commands::Toc { tree, json } => {
            let toc = assemble::read_toc(&TreeLayout::new(tree)).await?;
            if json {
                print_json(&toc)
            } else {
                for (i, key) in toc.chapter_order.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, key);
                }
                Ok(())
            }
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn print_plan(params: &SplitParams, json: bool) -> anyhow::Result<()> {
    let plan = split::plan_split(params).await?;
    if json {
        return print_json(&plan);
    }
    for file in &plan.files {
        println!("{:>8}  {}", file.bytes, file.path.display());
    }
    println!("\n{} files would be written", plan.files.len());
    Ok(())
}

async fn run_split(params: &SplitParams, json: bool) -> anyhow::Result<()> {
    let pb = progress_bar("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")?;
    let report = split::split_book(params, &pb).await?;
    pb.finish_and_clear();

    if json {
        return print_json(&report);
    }
    if let Some(title) = &report.metadata.title {
        println!("Title:  {}", title);
    }
    if let Some(author) = &report.metadata.author {
        println!("Author: {}", author);
    }
    println!(
        "Wrote {} files ({} chapters) to {}",
        report.files_written,
        report.chapters.len(),
        params.save_to_path.display()
    );
    Ok(())
}

fn progress_bar(template: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
