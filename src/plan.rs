//! Research step planning
//!
//! A planner turns a research question into the ordered list of queries the
//! aggregator runs. [`NumberedPlan`] reads a plan someone (or some model)
//! already wrote as a numbered list; [`SingleStep`] runs the question as is.

use crate::Result;
use std::path::Path;

/// Upper bound on the steps a single research run executes
pub const MAX_TOTAL_STEPS: usize = 20;

/// Turns a research question into ordered steps
pub trait StepPlanner {
    fn plan(&self, question: &str) -> Result<Vec<String>>;
}

/// Runs the question itself as the only step
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleStep;

impl StepPlanner for SingleStep {
    fn plan(&self, question: &str) -> Result<Vec<String>> {
        Ok(vec![question.trim().to_string()])
    }
}

/// A plan written as a numbered list
///
/// Only lines starting with an ASCII digit are steps; their leading number
/// and its `.` or `)` marker are removed.
///
/// ```
/// use tributary::plan::NumberedPlan;
///
/// let plan = NumberedPlan::parse("Plan:\n1. Find filings\n2) Read news\n");
/// assert_eq!(plan.steps(), &["Find filings", "Read news"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedPlan {
    steps: Vec<String>,
}

impl NumberedPlan {
    pub fn parse(text: &str) -> Self {
        let steps = text
            .lines()
            .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
            .map(strip_marker)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();
        Self { steps }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl StepPlanner for NumberedPlan {
    fn plan(&self, _question: &str) -> Result<Vec<String>> {
        Ok(self.steps.clone())
    }
}

fn strip_marker(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .unwrap_or(rest);
    rest.trim()
}
