use crate::governance::GovernanceVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One line of the audit log. Written once, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub caller_id: String,
    pub prompt_excerpt: String,
    /// Lowercase hex SHA-256 of the full prompt.
    pub prompt_integrity_hash: String,
    pub verdict: GovernanceVerdict,
    pub latency_ms: f64,
}

impl AuditRecord {
    pub fn new(
        caller_id: &str,
        prompt: &str,
        verdict: &GovernanceVerdict,
        latency_ms: f64,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            caller_id: caller_id.to_string(),
            prompt_excerpt: prompt.chars().take(excerpt_chars).collect(),
            prompt_integrity_hash: integrity_hash(prompt),
            verdict: verdict.clone(),
            latency_ms,
        }
    }
}

pub fn integrity_hash(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}
