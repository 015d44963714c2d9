use thiserror::Error;

// ─── Pipeline error taxonomy ─────────────────────────────────────────────────

/// Every way a governed request can fail.
///
/// Only [`PipelineError::GovernorFailure`] is recovered locally (by the
/// fallback auditor). Every other variant reaches the orchestrator's
/// top-level handler, which turns it into a block decision.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input ───────────────────────────────────────────────────────────
    #[error("input rejected: {0}")]
    SanitizerRejection(#[from] SanitizerRejection),

    // ── Admission ───────────────────────────────────────────────────────
    #[error("rate limit exceeded for caller {caller_id}")]
    RateLimitExceeded { caller_id: String },

    // ── Draft generation ────────────────────────────────────────────────
    #[error("worker failed to generate a draft: {0}")]
    WorkerFailure(String),

    // ── Primary audit ───────────────────────────────────────────────────
    #[error("governor: {0}")]
    GovernorFailure(#[from] GovernorFailure),

    // ── Caller went away ────────────────────────────────────────────────
    #[error("request cancelled before the audit completed")]
    Cancelled,

    // ── Generic fallthrough ─────────────────────────────────────────────
    #[error("system error: {0}")]
    SystemError(String),
}

impl PipelineError {
    /// Stable label used in logs and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SanitizerRejection(_) => "sanitizer_rejection",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::WorkerFailure(_) => "worker_failure",
            Self::GovernorFailure(_) => "governor_failure",
            Self::Cancelled => "cancelled",
            Self::SystemError(_) => "system_error",
        }
    }
}

// ─── Sanitizer rejections ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizerRejection {
    #[error("input cannot be empty")]
    Empty,

    #[error("input exceeds maximum length ({len} > {max} characters)")]
    TooLong { len: usize, max: usize },

    #[error("potential encoded injection detected ({encoding})")]
    EncodedInjection { encoding: &'static str },
}

// ─── Primary auditor failures ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernorFailure {
    #[error("judge returned invalid JSON after {attempts} attempt(s): {detail}")]
    ParseExhausted { attempts: u32, detail: String },

    #[error("judge produced a schema-invalid verdict: {0}")]
    SchemaInvalid(String),

    #[error("judge call failed after {attempts} attempt(s): {detail}")]
    TransportExhausted { attempts: u32, detail: String },
}
