use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FALLBACK_GOVERNOR_VERSION: &str = "Fallback-Regex-v1";
pub const SANITIZER_GOVERNOR_VERSION: &str = "Sanitizer";
pub const SYSTEM_GOVERNOR_VERSION: &str = "System";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ViolationType {
    #[serde(rename = "PII")]
    #[strum(serialize = "PII")]
    Pii,
    PromptInjection,
    #[serde(rename = "SQLi")]
    #[strum(serialize = "SQLi")]
    Sqli,
    None,
}

impl ViolationType {
    /// Exact-match lookup of a judge-supplied label. No case folding.
    pub fn from_canonical(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

/// Canonical safety judgment on one audited exchange.
///
/// Built once per audit and never mutated afterwards; fields are read
/// through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceVerdict {
    is_safe: bool,
    violation_type: ViolationType,
    reasoning: String,
    confidence_score: f64,
    flagged_content: Option<String>,
    timestamp: DateTime<Utc>,
    governor_version: String,
}

impl GovernanceVerdict {
    pub fn new(
        is_safe: bool,
        violation_type: ViolationType,
        reasoning: impl Into<String>,
        confidence_score: f64,
        flagged_content: Option<String>,
        governor_version: impl Into<String>,
    ) -> Self {
        Self {
            is_safe,
            violation_type,
            reasoning: reasoning.into(),
            confidence_score,
            flagged_content,
            timestamp: Utc::now(),
            governor_version: governor_version.into(),
        }
    }

    /// Block verdict for outcomes that never reached an auditor.
    pub fn synthesized_block(reasoning: impl Into<String>, governor_version: &str) -> Self {
        Self::new(
            false,
            ViolationType::None,
            reasoning,
            1.0,
            None,
            governor_version,
        )
    }

    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    pub fn violation_type(&self) -> ViolationType {
        self.violation_type
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn flagged_content(&self) -> Option<&str> {
        self.flagged_content.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn governor_version(&self) -> &str {
        &self.governor_version
    }
}
