//! Research notes and report writing
//!
//! [`ResearchNotes`] accumulates the corpus of every executed step. A
//! [`ReportWriter`] turns the finished notes into a document; the bundled
//! [`MarkdownReport`] writes them as a Markdown file.

mod markdown;

pub use markdown::{format_markdown, MarkdownReport};

use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to report: no steps were recorded")]
    Empty,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumer of finished research notes
pub trait ReportWriter {
    fn write_report(&self, notes: &ResearchNotes) -> OutputResult<()>;
}

/// One executed step and the corpus it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub step: String,
    pub corpus: String,
}

/// Step results of one research run, in execution order
#[derive(Debug, Clone, Default)]
pub struct ResearchNotes {
    question: String,
    entries: Vec<NoteEntry>,
}

impl ResearchNotes {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            entries: Vec::new(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn record(&mut self, step: impl Into<String>, corpus: impl Into<String>) {
        self.entries.push(NoteEntry {
            step: step.into(),
            corpus: corpus.into(),
        });
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Free-text context of everything gathered so far
    ///
    /// Each step renders as `"\nStep: <step>\nResult: <corpus>\n"`, which is
    /// the shape downstream report writers and planners consume.
    pub fn context(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("\nStep: {}\nResult: {}\n", entry.step, entry.corpus))
            .collect()
    }

    /// Renders the notes as a Markdown document stamped with the current time
    pub fn to_markdown(&self) -> String {
        format_markdown(self, chrono::Utc::now())
    }
}
