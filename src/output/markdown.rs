//! Markdown rendering of research notes

use crate::output::{OutputError, OutputResult, ReportWriter, ResearchNotes};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes research notes to a Markdown file
#[derive(Debug, Clone)]
pub struct MarkdownReport {
    path: PathBuf,
}

impl MarkdownReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportWriter for MarkdownReport {
    fn write_report(&self, notes: &ResearchNotes) -> OutputResult<()> {
        if notes.is_empty() {
            return Err(OutputError::Empty);
        }

        let mut file = File::create(&self.path)?;
        file.write_all(notes.to_markdown().as_bytes())?;
        tracing::info!("Research notes written to {}", self.path.display());

        Ok(())
    }
}

/// Formats research notes as Markdown
///
/// # Arguments
///
/// * `notes` - The notes to render
/// * `generated_at` - Timestamp shown in the header
pub fn format_markdown(notes: &ResearchNotes, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# Research Notes\n\n");
    md.push_str(&format!("- **Question**: {}\n", notes.question()));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Steps**: {}\n\n", notes.entries().len()));

    for (i, entry) in notes.entries().iter().enumerate() {
        md.push_str(&format!("## Step {}: {}\n\n", i + 1, entry.step));
        if entry.corpus.trim().is_empty() {
            md.push_str("_No results._\n\n");
        } else {
            md.push_str(entry.corpus.trim_end());
            md.push_str("\n\n");
        }
    }

    md
}
