//! Execution outcome models

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the test engine hands back for a run that completed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineReport {
    pub output: String,
    pub failures: u32,
}

impl EngineReport {
    pub fn new(output: impl Into<String>, failures: u32) -> Self {
        Self {
            output: output.into(),
            failures,
        }
    }

    #[cfg(test)]
    pub fn passed(output: impl Into<String>) -> Self {
        Self::new(output, 0)
    }
}

/// Terminal classification of one work item's execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Successful { output: String },
    Failed { output: String, failures: u32 },
    Errored { error: String },
}

impl Outcome {
    /// Classify a completed engine report
    pub fn from_report(report: EngineReport) -> Self {
        if report.failures == 0 {
            Outcome::Successful {
                output: report.output,
            }
        } else {
            Outcome::Failed {
                output: report.output,
                failures: report.failures,
            }
        }
    }

    pub fn errored(error: impl Into<String>) -> Self {
        Outcome::Errored {
            error: error.into(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Successful { .. } => OutcomeKind::Successful,
            Outcome::Failed { .. } => OutcomeKind::Failed,
            Outcome::Errored { .. } => OutcomeKind::Errored,
        }
    }

    /// Captured engine output or the error text
    pub fn text(&self) -> &str {
        match self {
            Outcome::Successful { output } | Outcome::Failed { output, .. } => output,
            Outcome::Errored { error } => error,
        }
    }
}

/// Bucket tag of an outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Successful,
    Failed,
    Errored,
}

impl OutcomeKind {
    pub fn symbol(&self) -> char {
        match self {
            OutcomeKind::Successful => '.',
            OutcomeKind::Failed | OutcomeKind::Errored => 'F',
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Successful => write!(f, "PASS"),
            OutcomeKind::Failed => write!(f, "FAIL"),
            OutcomeKind::Errored => write!(f, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_failures_is_successful() {
        let outcome = Outcome::from_report(EngineReport::passed("ok"));
        assert_eq!(outcome.kind(), OutcomeKind::Successful);
        assert_eq!(outcome.kind(), OutcomeKind::Successful);
        assert_eq!(outcome.text(), "ok");
    }

    #[test]
    fn test_positive_failures_is_failed() {
        let outcome = Outcome::from_report(EngineReport::new("assertion failed", 2));
        assert_eq!(
            outcome,
            Outcome::Failed {
                output: "assertion failed".to_string(),
                failures: 2
            }
        );
        assert_eq!(outcome.kind().symbol(), 'F');
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let json = serde_json::to_value(Outcome::errored("boom")).unwrap();
        assert_eq!(json["status"], "errored");
        assert_eq!(json["error"], "boom");
    }
}
