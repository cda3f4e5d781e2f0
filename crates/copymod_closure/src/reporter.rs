use std::{
    collections::BTreeSet,
    fs,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, trace, warn};
use serde::Serialize;

use crate::{
    sink::Delivered,
    types::{CopyResult, FileBlock, Format, Rendered, SkippedFile},
};

#[derive(Serialize)]
struct JsonReport<'a> {
    root: String,
    files: &'a [FileBlock],
}

/// Path of `path` relative to `root`, always with forward slashes
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Reads every collected file, ordered by its path relative to `root`.
///
/// Files that cannot be read any more are skipped with a warning.
pub fn collect_blocks(
    files: &BTreeSet<PathBuf>,
    root: &Path,
) -> (Vec<FileBlock>, Vec<SkippedFile>) {
    let mut ordered: Vec<(String, &PathBuf)> =
        files.iter().map(|p| (relative_display(p, root), p)).collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let mut blocks = Vec::with_capacity(ordered.len());
    let mut skipped = Vec::new();

    for (rel, path) in ordered {
        match fs::read_to_string(path) {
            Ok(content) => {
                trace!("Formatted file: {}", rel);
                blocks.push(FileBlock { path: rel, content });
            }
            Err(e) => {
                warn!("⚠️ Skipping {}: {}", path.display(), e);
                skipped.push(SkippedFile { path: path.clone(), reason: e.to_string() });
            }
        }
    }

    (blocks, skipped)
}

/// `# <path>` header, the content, and a blank separator per file
pub fn render_text(blocks: &[FileBlock]) -> String {
    blocks
        .iter()
        .map(|b| format!("# {}\n{}\n", b.path, b.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(blocks: &[FileBlock], root: &Path) -> Result<String> {
    let report = JsonReport { root: root.to_string_lossy().to_string(), files: blocks };
    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

pub fn render(files: &BTreeSet<PathBuf>, root: &Path, format: Format) -> Result<Rendered> {
    debug!("Formatting {} collected files as {:?}", files.len(), format);
    let (blocks, skipped) = collect_blocks(files, root);

    let output = match format {
        Format::Text => render_text(&blocks),
        Format::Json => render_json(&blocks, root)?,
    };
    debug!("Total lines to copy: {}", output.lines().count());

    Ok(Rendered { output, files: blocks.into_iter().map(|b| b.path).collect(), skipped })
}

pub fn print_summary<W: Write>(
    writer: &mut W,
    result: &CopyResult,
    delivered: Delivered,
) -> io::Result<()> {
    let rendered = &result.rendered;
    let total_lines = rendered.output.lines().count();

    match delivered {
        Delivered::Clipboard => {
            writeln!(
                writer,
                "{} Copied {} files:",
                "✓".green().bold(),
                rendered.files.len().to_string().cyan()
            )?;
        }
        Delivered::Stdout => {
            writeln!(
                writer,
                "{} Wrote {} files to stdout:",
                "●".bright_blue(),
                rendered.files.len().to_string().cyan()
            )?;
        }
    }

    for file in &rendered.files {
        writeln!(writer, "  {} {}", "→".dimmed(), file.blue())?;
    }

    for skipped in &rendered.skipped {
        writeln!(
            writer,
            "  {} {} ({})",
            "⚠".yellow().bold(),
            relative_display(&skipped.path, &result.root).yellow(),
            skipped.reason
        )?;
    }

    let destination = match delivered {
        Delivered::Clipboard => "copied to clipboard",
        Delivered::Stdout => "written to stdout",
    };
    writeln!(writer, "Total: {} lines {}", total_lines.to_string().cyan(), destination)?;

    writer.flush()?;
    Ok(())
}
