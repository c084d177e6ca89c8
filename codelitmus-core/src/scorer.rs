//! Scoring heuristic combining complexity, maintainability and comment density.
//!
//! Each metric contributes -1, 0 or +1. Analyzer failures are recorded as
//! [`SubScore::Failed`] and contribute nothing, so scoring never fails.

use serde::{Deserialize, Serialize};

use crate::analyzer::StaticAnalyzer;
use crate::domain::{DetailedFeedback, Metric, MetricsExplanation, ScoreResult, SubScore, Verdict};

/// Score reported for empty or whitespace-only input.
pub const DEFAULT_EMPTY_SCORE: i32 = -3;
/// Single-line comment marker for Python.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

const EMPTY_EXPLANATION: &str = "Code file is empty or contains only whitespace.";
const EMPTY_FEEDBACK: &str = "Empty or whitespace-only code provided.";
const NO_IMPROVEMENTS: &str = "Your code quality is excellent! Consider code reviews and continuous learning to maintain high standards.";
const NO_GOOD_POINTS: &str =
    "Every codebase has potential - focus on the improvement areas to enhance quality.";

/// Tunables for the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Score reported for empty or whitespace-only input.
    pub empty_score: i32,
    /// Marker counted when measuring comment density.
    pub comment_marker: String,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            empty_score: DEFAULT_EMPTY_SCORE,
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
        }
    }
}

/// Band for average cyclomatic complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityBand {
    /// Average above 10.
    High,
    /// Average above 5, up to 10.
    Moderate,
    /// Average of 5 or less.
    Excellent,
}

impl ComplexityBand {
    /// Classify an average complexity.
    pub fn classify(average: f64) -> Self {
        if average > 10.0 {
            Self::High
        } else if average > 5.0 {
            Self::Moderate
        } else {
            Self::Excellent
        }
    }

    /// Contribution to the score.
    pub fn delta(self) -> i32 {
        match self {
            Self::High => -1,
            Self::Moderate => 0,
            Self::Excellent => 1,
        }
    }
}

/// Band for the maintainability index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintainabilityBand {
    /// Below 50.
    Poor,
    /// From 50 up to 70.
    Average,
    /// 70 or more.
    Excellent,
}

impl MaintainabilityBand {
    /// Classify a maintainability index.
    pub fn classify(index: f64) -> Self {
        if index < 50.0 {
            Self::Poor
        } else if index < 70.0 {
            Self::Average
        } else {
            Self::Excellent
        }
    }

    /// Contribution to the score.
    pub fn delta(self) -> i32 {
        match self {
            Self::Poor => -1,
            Self::Average => 0,
            Self::Excellent => 1,
        }
    }
}

/// Band for comment density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentBand {
    /// Below 10%.
    NeedsMore,
    /// From 10% up to 20%.
    Decent,
    /// 20% or more.
    Excellent,
}

impl CommentBand {
    /// Classify a comment ratio.
    pub fn classify(ratio: f64) -> Self {
        if ratio < 0.10 {
            Self::NeedsMore
        } else if ratio < 0.20 {
            Self::Decent
        } else {
            Self::Excellent
        }
    }

    /// Contribution to the score.
    pub fn delta(self) -> i32 {
        match self {
            Self::NeedsMore => -1,
            Self::Decent | Self::Excellent => 1,
        }
    }
}

/// Comment marker counts for a source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentStats {
    /// Occurrences of the comment marker anywhere in the text.
    pub comments: usize,
    /// Lines with non-whitespace content.
    pub non_empty_lines: usize,
    /// `comments / non_empty_lines`, or 0 without content.
    pub ratio: f64,
}

/// Count comment markers against non-blank lines.
pub fn comment_stats(code: &str, marker: &str) -> CommentStats {
    let comments = if marker.is_empty() {
        0
    } else {
        code.matches(marker).count()
    };
    let non_empty_lines = code.lines().filter(|line| !line.trim().is_empty()).count();
    let ratio = if non_empty_lines > 0 {
        comments as f64 / non_empty_lines as f64
    } else {
        0.0
    };
    CommentStats {
        comments,
        non_empty_lines,
        ratio,
    }
}

/// Outcome of evaluating one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Metric evaluated.
    pub metric: Metric,
    /// Contribution to the score.
    pub sub_score: SubScore,
    /// Terse feedback line.
    pub feedback: String,
    /// Strength to report, if the metric scored positively.
    pub good_point: Option<String>,
    /// Improvement to suggest, if the metric fell short of its target.
    pub improvement: Option<String>,
    /// Long-form explanation of the measurement.
    pub explanation: String,
}

/// Scores source code using a static analyzer.
pub struct Scorer<A: StaticAnalyzer> {
    analyzer: A,
    config: ScorerConfig,
}

impl<A: StaticAnalyzer> Scorer<A> {
    /// Create a scorer with the default configuration.
    pub fn new(analyzer: A) -> Self {
        Self::with_config(analyzer, ScorerConfig::default())
    }

    /// Create a scorer with a custom configuration.
    pub fn with_config(analyzer: A, config: ScorerConfig) -> Self {
        Self { analyzer, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score a source file.
    pub fn score(&self, code: &str) -> ScoreResult {
        if code.trim().is_empty() {
            return empty_result(self.config.empty_score);
        }
        aggregate(self.assess(code))
    }

    /// Evaluate each metric in order: complexity, maintainability, comments.
    pub fn assess(&self, code: &str) -> Vec<Assessment> {
        vec![
            self.assess_complexity(code),
            self.assess_maintainability(code),
            self.assess_comments(code),
        ]
    }

    fn assess_complexity(&self, code: &str) -> Assessment {
        let values = match self.analyzer.complexity_of(code) {
            Ok(values) => values,
            Err(err) => {
                return Assessment {
                    metric: Metric::Complexity,
                    sub_score: SubScore::Failed {
                        reason: err.to_string(),
                    },
                    feedback: "Could not analyze cyclomatic complexity.".to_string(),
                    good_point: None,
                    improvement: None,
                    explanation: format!(
                        "Analysis failed: {err}. This might indicate syntax errors or unsupported language features."
                    ),
                };
            }
        };

        let blocks = values.len();
        let average = if blocks == 0 {
            0.0
        } else {
            values.iter().sum::<f64>() / blocks as f64
        };
        let band = ComplexityBand::classify(average);
        let scale = "Scale: 1-5 simple, 6-10 moderate, 11+ complex.";

        let (feedback, good_point, improvement, explanation) = match band {
            ComplexityBand::High => (
                "High cyclomatic complexity detected.",
                None,
                Some(format!(
                    "Reduce function complexity (average: {average:.1}, ideal: <5)"
                )),
                format!(
                    "HIGH RISK - average complexity {average:.1} across {blocks} blocks. Target: <5. {scale} Functions above 10 are hard to test and maintain; split them into smaller, single-purpose functions."
                ),
            ),
            ComplexityBand::Moderate => (
                "Moderate complexity detected.",
                None,
                Some(format!(
                    "Consider simplifying some functions (average complexity: {average:.1})"
                )),
                format!(
                    "MODERATE - average complexity {average:.1} across {blocks} blocks. Target: <5. {scale} Acceptable, but simpler functions read and test more easily."
                ),
            ),
            ComplexityBand::Excellent => (
                "Functions are clean and simple.",
                Some(format!(
                    "Excellent function complexity! Average: {average:.1} (target: <5)"
                )),
                None,
                format!(
                    "EXCELLENT - average complexity {average:.1} across {blocks} blocks. Target: <5 (met). {scale} Easy to understand, test and maintain."
                ),
            ),
        };

        Assessment {
            metric: Metric::Complexity,
            sub_score: SubScore::Measured {
                value: average,
                delta: band.delta(),
            },
            feedback: feedback.to_string(),
            good_point,
            improvement,
            explanation,
        }
    }

    fn assess_maintainability(&self, code: &str) -> Assessment {
        let index = match self.analyzer.maintainability_of(code) {
            Ok(index) => index,
            Err(err) => {
                return Assessment {
                    metric: Metric::Maintainability,
                    sub_score: SubScore::Failed {
                        reason: err.to_string(),
                    },
                    feedback: "Could not analyze maintainability index.".to_string(),
                    good_point: None,
                    improvement: None,
                    explanation: format!(
                        "Analysis failed: {err}. This might indicate syntax errors."
                    ),
                };
            }
        };

        let band = MaintainabilityBand::classify(index);
        let scale = "Scale: 0-49 poor, 50-69 average, 70-100 excellent.";

        let (feedback, good_point, improvement, explanation) = match band {
            MaintainabilityBand::Poor => (
                "Low maintainability index.",
                None,
                Some(format!(
                    "Improve code maintainability (current: {index:.1}, target: >70)"
                )),
                format!(
                    "POOR - maintainability index {index:.1}/100. Target: >70. {scale} Reduce complexity, shorten long functions and document intent."
                ),
            ),
            MaintainabilityBand::Average => (
                "Average maintainability.",
                None,
                Some(format!(
                    "Good maintainability, but room for improvement (current: {index:.1}, target: >70)"
                )),
                format!(
                    "AVERAGE - maintainability index {index:.1}/100. Target: >70. {scale} Clearer names, tighter structure or more comments would help."
                ),
            ),
            MaintainabilityBand::Excellent => (
                "Excellent maintainability.",
                Some(format!("High maintainability score: {index:.1}/100")),
                None,
                format!(
                    "EXCELLENT - maintainability index {index:.1}/100. Target: >70 (met). {scale} Well structured and easy to change."
                ),
            ),
        };

        Assessment {
            metric: Metric::Maintainability,
            sub_score: SubScore::Measured {
                value: index,
                delta: band.delta(),
            },
            feedback: feedback.to_string(),
            good_point,
            improvement,
            explanation,
        }
    }

    fn assess_comments(&self, code: &str) -> Assessment {
        let CommentStats {
            comments,
            non_empty_lines,
            ratio,
        } = comment_stats(code, &self.config.comment_marker);
        let band = CommentBand::classify(ratio);
        let percent = format!("{:.1}%", ratio * 100.0);
        let counts = format!("{comments} comments out of {non_empty_lines} code lines");
        let scale = "Scale: <10% poor, 10-20% good, >20% excellent.";

        let (feedback, good_point, improvement, explanation) = match band {
            CommentBand::NeedsMore => (
                "Insufficient comments.",
                None,
                Some(format!(
                    "Add more comments ({comments} comments for {non_empty_lines} lines = {percent}, target: >10%)"
                )),
                format!(
                    "NEEDS MORE - comment coverage {percent} ({counts}). Target: >10%. {scale} Explain complex logic, function purposes and important decisions."
                ),
            ),
            CommentBand::Decent => (
                "Good comment coverage.",
                Some(format!(
                    "Well-commented code: {percent} coverage ({comments} comments)"
                )),
                None,
                format!(
                    "DECENT - comment coverage {percent} ({counts}). Target: >10% (met). {scale} Other developers can follow the logic."
                ),
            ),
            CommentBand::Excellent => (
                "Excellent comment coverage.",
                Some(format!(
                    "Exceptionally well-commented code: {percent} coverage ({comments} comments)"
                )),
                None,
                format!(
                    "EXCELLENT - comment coverage {percent} ({counts}). Target: >20% (met). {scale} Thorough documentation for maintainers."
                ),
            ),
        };

        Assessment {
            metric: Metric::Comments,
            sub_score: SubScore::Measured {
                value: ratio,
                delta: band.delta(),
            },
            feedback: feedback.to_string(),
            good_point,
            improvement,
            explanation,
        }
    }
}

fn aggregate(assessments: Vec<Assessment>) -> ScoreResult {
    let score: i32 = assessments
        .iter()
        .map(|assessment| assessment.sub_score.delta())
        .sum();

    let mut feedback = Vec::with_capacity(assessments.len());
    let mut good_points = Vec::new();
    let mut areas_for_improvement = Vec::new();
    let mut metrics_explanation = MetricsExplanation::default();

    for assessment in assessments {
        feedback.push(assessment.feedback);
        good_points.extend(assessment.good_point);
        areas_for_improvement.extend(assessment.improvement);
        match assessment.metric {
            Metric::Complexity => metrics_explanation.complexity = assessment.explanation,
            Metric::Maintainability => metrics_explanation.maintainability = assessment.explanation,
            Metric::Comments => metrics_explanation.comments = assessment.explanation,
        }
    }

    if areas_for_improvement.is_empty() {
        areas_for_improvement.push(NO_IMPROVEMENTS.to_string());
    }
    if good_points.is_empty() {
        good_points.push(NO_GOOD_POINTS.to_string());
    }

    let (verdict, verdict_explanation) = Verdict::from_score(score);
    ScoreResult {
        verdict,
        verdict_explanation: verdict_explanation.to_string(),
        score,
        feedback,
        detailed_feedback: DetailedFeedback {
            good_points,
            areas_for_improvement,
            metrics_explanation,
        },
    }
}

fn empty_result(score: i32) -> ScoreResult {
    ScoreResult {
        verdict: Verdict::Acidic,
        verdict_explanation: EMPTY_EXPLANATION.to_string(),
        score,
        feedback: vec![EMPTY_FEEDBACK.to_string()],
        detailed_feedback: DetailedFeedback {
            good_points: Vec::new(),
            areas_for_improvement: vec![EMPTY_EXPLANATION.to_string()],
            metrics_explanation: MetricsExplanation {
                complexity: "Cannot analyze empty code.".to_string(),
                maintainability: "Cannot analyze empty code.".to_string(),
                comments: "No code or comments found.".to_string(),
            },
        },
    }
}
