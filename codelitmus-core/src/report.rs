//! Report formatting utilities for CodeLitmus outputs.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ScoreResult, Verdict};

/// Outcome of analyzing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// The file was scored.
    Analyzed,
    /// The file could not be read, decoded or uploaded.
    Failed(String),
}

/// Analysis report for a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Path of the analyzed file.
    pub path: PathBuf,
    /// Analysis status.
    pub status: AnalysisStatus,
    /// Score, present when the file was analyzed.
    pub result: Option<ScoreResult>,
}

impl FileReport {
    /// Create a report for a scored file.
    pub fn analyzed(path: PathBuf, result: ScoreResult) -> Self {
        Self {
            path,
            status: AnalysisStatus::Analyzed,
            result: Some(result),
        }
    }

    /// Create a report for a file that could not be scored.
    pub fn failed(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            status: AnalysisStatus::Failed(error.into()),
            result: None,
        }
    }
}

/// Verdict tally across a set of reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Files with a `Basic` verdict.
    pub basic: usize,
    /// Files with a `Neutral` verdict.
    pub neutral: usize,
    /// Files with an `Acidic` verdict.
    pub acidic: usize,
    /// Files that could not be analyzed.
    pub failed: usize,
}

impl Summary {
    /// Tally the verdicts of `reports`.
    pub fn of(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.result.as_ref().map(|result| result.verdict) {
                Some(Verdict::Basic) => summary.basic += 1,
                Some(Verdict::Neutral) => summary.neutral += 1,
                Some(Verdict::Acidic) => summary.acidic += 1,
                None => summary.failed += 1,
            }
        }
        summary
    }

    /// Number of files counted.
    pub fn total(&self) -> usize {
        self.basic + self.neutral + self.acidic + self.failed
    }
}

/// Render a list of file reports as Markdown.
pub fn render_markdown(reports: &[FileReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# CodeLitmus Report\n");
    let summary = Summary::of(reports);
    let _ = writeln!(
        output,
        "Files: {} (Basic: {}, Neutral: {}, Acidic: {}, failed: {})\n",
        summary.total(),
        summary.basic,
        summary.neutral,
        summary.acidic,
        summary.failed
    );
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.path.display());
        append_status(&mut output, &report.status, &report.path);
        if let Some(result) = &report.result {
            append_result(&mut output, result);
        }
        let _ = writeln!(output);
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_status(output: &mut String, status: &AnalysisStatus, path: &Path) {
    let _ = writeln!(output, "- Path: `{}`", path.display());
    match status {
        AnalysisStatus::Analyzed => {
            let _ = writeln!(output, "- Status: analyzed");
        }
        AnalysisStatus::Failed(error) => {
            let _ = writeln!(output, "- Status: failed ({error})");
        }
    }
    let _ = writeln!(output);
}

fn append_result(output: &mut String, result: &ScoreResult) {
    let _ = writeln!(
        output,
        "**{}** ({}/3): {}\n",
        result.verdict, result.score, result.verdict_explanation
    );
    let detailed = &result.detailed_feedback;
    append_list(output, "Feedback", &result.feedback);
    append_list(output, "Good points", &detailed.good_points);
    append_list(output, "Areas for improvement", &detailed.areas_for_improvement);

    let explanation = &detailed.metrics_explanation;
    let _ = writeln!(output, "### Metrics");
    let _ = writeln!(output, "- Complexity: {}", explanation.complexity);
    let _ = writeln!(output, "- Maintainability: {}", explanation.maintainability);
    let _ = writeln!(output, "- Comments: {}", explanation.comments);
    let _ = writeln!(output);
}

fn append_list(output: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(output, "### {title}\nNone.\n");
        return;
    }
    let _ = writeln!(output, "### {title}");
    for item in items {
        let _ = writeln!(output, "- {item}");
    }
    let _ = writeln!(output);
}
