#![deny(missing_docs)]
//! CodeLitmus core library.
//!
//! This crate contains the domain types, the Python static analyzer and the
//! scoring heuristic behind the CodeLitmus server and CLI.

pub mod analyzer;
pub mod complexity;
pub mod domain;
pub mod error;
pub mod fs;
pub mod halstead;
pub mod raw;
pub mod report;
pub mod scorer;

pub use analyzer::{ModuleMetrics, PythonAnalyzer, StaticAnalyzer, maintainability_index};
pub use complexity::{BlockKind, ComplexityBlock};
pub use domain::{DetailedFeedback, Metric, MetricsExplanation, ScoreResult, SubScore, Verdict};
pub use error::{LitmusError, Result};
pub use fs::{FileSystem, StdFileSystem, collect_python_sources, decode_source, is_python_file};
pub use halstead::HalsteadMetrics;
pub use raw::RawMetrics;
pub use report::{AnalysisStatus, FileReport, Summary, render_json, render_markdown};
pub use scorer::{
    Assessment, CommentStats, DEFAULT_COMMENT_MARKER, DEFAULT_EMPTY_SCORE, Scorer, ScorerConfig,
    comment_stats,
};
