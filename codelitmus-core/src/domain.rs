//! Domain entities for CodeLitmus.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Qualitative bucket summarizing a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    /// Good or better code quality.
    Basic,
    /// Average code quality.
    Neutral,
    /// Below average code quality.
    Acidic,
}

impl Verdict {
    /// Map an aggregate score to its verdict and explanation.
    pub fn from_score(score: i32) -> (Self, &'static str) {
        match score {
            i32::MIN..=-2 => (Self::Acidic, "Significant improvements needed"),
            -1 => (Self::Acidic, "Below average quality"),
            0 => (Self::Neutral, "Average code quality"),
            1 => (Self::Basic, "Good code quality"),
            2 => (Self::Basic, "High code quality"),
            _ => (Self::Basic, "Excellent code quality"),
        }
    }

    /// Stable name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Neutral => "Neutral",
            Self::Acidic => "Acidic",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-metric explanation strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetricsExplanation {
    /// Explanation of the cyclomatic complexity measurement.
    pub complexity: String,
    /// Explanation of the maintainability index measurement.
    pub maintainability: String,
    /// Explanation of the comment coverage measurement.
    pub comments: String,
}

/// Strengths, weaknesses and metric explanations for an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailedFeedback {
    /// Messages for metrics that scored positively.
    pub good_points: Vec<String>,
    /// Messages for metrics that fell short of their target.
    pub areas_for_improvement: Vec<String>,
    /// Explanation of each measured metric.
    pub metrics_explanation: MetricsExplanation,
}

/// Outcome of scoring a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreResult {
    /// Qualitative verdict.
    pub verdict: Verdict,
    /// One-line explanation of the verdict.
    pub verdict_explanation: String,
    /// Aggregate score, the sum of the metric sub-scores.
    pub score: i32,
    /// Terse feedback, one message per metric in evaluation order.
    pub feedback: Vec<String>,
    /// Extended feedback.
    pub detailed_feedback: DetailedFeedback,
}

/// The metrics contributing to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Average cyclomatic complexity per block.
    Complexity,
    /// Maintainability index.
    Maintainability,
    /// Comment markers per non-blank line.
    Comments,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Complexity => "complexity",
            Self::Maintainability => "maintainability",
            Self::Comments => "comments",
        };
        f.write_str(name)
    }
}

/// Contribution of one metric to the aggregate score.
#[derive(Debug, Clone, PartialEq)]
pub enum SubScore {
    /// The metric was measured.
    Measured {
        /// Raw measured value.
        value: f64,
        /// Contribution to the score, one of -1, 0 or +1.
        delta: i32,
    },
    /// The metric could not be measured.
    Failed {
        /// Why measurement failed.
        reason: String,
    },
}

impl SubScore {
    /// Contribution to the aggregate score; failures count as zero.
    pub fn delta(&self) -> i32 {
        match self {
            Self::Measured { delta, .. } => *delta,
            Self::Failed { .. } => 0,
        }
    }

    /// Measured value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Measured { value, .. } => Some(*value),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_table_matches_thresholds() {
        assert_eq!(
            Verdict::from_score(-3),
            (Verdict::Acidic, "Significant improvements needed")
        );
        assert_eq!(
            Verdict::from_score(-2),
            (Verdict::Acidic, "Significant improvements needed")
        );
        assert_eq!(
            Verdict::from_score(-1),
            (Verdict::Acidic, "Below average quality")
        );
        assert_eq!(
            Verdict::from_score(0),
            (Verdict::Neutral, "Average code quality")
        );
        assert_eq!(Verdict::from_score(1), (Verdict::Basic, "Good code quality"));
        assert_eq!(Verdict::from_score(2), (Verdict::Basic, "High code quality"));
        assert_eq!(
            Verdict::from_score(3),
            (Verdict::Basic, "Excellent code quality")
        );
        assert_eq!(
            Verdict::from_score(42),
            (Verdict::Basic, "Excellent code quality")
        );
    }

    #[test]
    fn verdict_is_monotonic_in_score() {
        fn rank(verdict: Verdict) -> u8 {
            match verdict {
                Verdict::Acidic => 0,
                Verdict::Neutral => 1,
                Verdict::Basic => 2,
            }
        }

        let ranks: Vec<u8> = (-10..=10)
            .map(|score| rank(Verdict::from_score(score).0))
            .collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!((-10..=-2).all(|score| Verdict::from_score(score).0 == Verdict::Acidic));
        assert!((1..=10).all(|score| Verdict::from_score(score).0 == Verdict::Basic));
    }

    #[test]
    fn verdict_serializes_as_variant_name() {
        let json = serde_json::to_string(&Verdict::Neutral).expect("json");
        assert_eq!(json, "\"Neutral\"");
        assert_eq!(Verdict::Acidic.to_string(), "Acidic");
    }

    #[test]
    fn sub_score_failure_contributes_zero() {
        let failed = SubScore::Failed {
            reason: "boom".to_string(),
        };
        assert_eq!(failed.delta(), 0);
        assert_eq!(failed.value(), None);

        let measured = SubScore::Measured {
            value: 4.5,
            delta: 1,
        };
        assert_eq!(measured.delta(), 1);
        assert_eq!(measured.value(), Some(4.5));
    }

    #[test]
    fn score_result_uses_snake_case_fields() {
        let result = ScoreResult {
            verdict: Verdict::Basic,
            verdict_explanation: "Good code quality".to_string(),
            score: 1,
            feedback: vec!["Functions are clean and simple.".to_string()],
            detailed_feedback: DetailedFeedback::default(),
        };
        let value = serde_json::to_value(&result).expect("json");
        assert_eq!(value["verdict"], "Basic");
        assert_eq!(value["verdict_explanation"], "Good code quality");
        assert!(value["detailed_feedback"]["good_points"].is_array());
        assert!(value["detailed_feedback"]["metrics_explanation"]["complexity"].is_string());
    }
}
