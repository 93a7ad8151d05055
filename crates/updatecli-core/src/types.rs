//! Pipeline step result types

use serde::{Deserialize, Serialize};

/// Outcome of a single Source, Condition or Target step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step completed and nothing needs attention
    Success,
    /// Step failed
    Failure,
    /// Step completed and changed (or would change) something
    Attention,
    /// Step was not run
    Skipped,
    /// No candidate matched the version filter
    Unmatched,
}

impl StepStatus {
    /// Returns the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Attention => "attention",
            Self::Skipped => "skipped",
            Self::Unmatched => "unmatched",
        }
    }

    /// Whether the step should be treated as a failed run
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a Source step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    /// Step status
    pub status: StepStatus,
    /// Discovered value, when one matched
    pub value: Option<String>,
    /// Raw upstream string the value was derived from
    pub original: Option<String>,
    /// Human readable description
    pub description: String,
}

impl SourceResult {
    /// A source that found `value`
    pub fn found(
        value: impl Into<String>,
        original: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            status: StepStatus::Success,
            value: Some(value.into()),
            original: Some(original.into()),
            description: description.into(),
        }
    }

    /// A source whose filter matched nothing
    pub fn unmatched(description: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Unmatched,
            value: None,
            original: None,
            description: description.into(),
        }
    }
}

/// Result of a Condition step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// Step status
    pub status: StepStatus,
    /// Whether the condition holds
    pub pass: bool,
    /// Human readable description
    pub description: String,
}

impl ConditionResult {
    /// Condition outcome from a boolean
    pub fn from_pass(pass: bool, description: impl Into<String>) -> Self {
        Self {
            status: if pass {
                StepStatus::Success
            } else {
                StepStatus::Failure
            },
            pass,
            description: description.into(),
        }
    }

    /// Condition whose filter matched nothing
    pub fn unmatched(description: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Unmatched,
            pass: false,
            description: description.into(),
        }
    }
}

/// Result of a Target step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    /// Step status
    pub status: StepStatus,
    /// Whether the target changed (or would change) anything
    pub changed: bool,
    /// Whether the change was published through the scm
    pub published: bool,
    /// Human readable description
    pub description: String,
}

impl TargetResult {
    /// Target already in the desired state
    pub fn unchanged(description: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Success,
            changed: false,
            published: false,
            description: description.into(),
        }
    }

    /// Target changed, optionally published
    pub fn changed(published: bool, description: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Attention,
            changed: true,
            published,
            description: description.into(),
        }
    }
}
