use super::verdict::GovernanceVerdict;

/// Caller-facing text for failures that must not leak internals.
pub const SYSTEM_FAILURE_MESSAGE: &str =
    "Request blocked due to a system error. Please try again later.";

/// Outcome of one governed request. Only `Released` carries model text.
#[derive(Debug, Clone, PartialEq)]
pub enum GovernanceDecision {
    Released {
        response: String,
        verdict: GovernanceVerdict,
    },
    Blocked {
        verdict: GovernanceVerdict,
    },
    Rejected {
        reason: String,
    },
    Throttled,
    Failed {
        message: String,
    },
}

impl GovernanceDecision {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released { .. })
    }

    pub fn verdict(&self) -> Option<&GovernanceVerdict> {
        match self {
            Self::Released { verdict, .. } | Self::Blocked { verdict } => Some(verdict),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Released { .. } => "released",
            Self::Blocked { .. } => "blocked",
            Self::Rejected { .. } => "rejected",
            Self::Throttled => "throttled",
            Self::Failed { .. } => "failed",
        }
    }

    pub(crate) fn system_failure() -> Self {
        Self::Failed {
            message: SYSTEM_FAILURE_MESSAGE.to_string(),
        }
    }
}
