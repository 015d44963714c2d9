pub mod context;
pub mod decision;
pub mod fallback;
pub mod normalizer;
pub mod orchestrator;
pub mod primary;
pub mod retry;
pub mod verdict;
pub mod worker;

pub use context::{ConversationContext, Session};
pub use decision::{GovernanceDecision, SYSTEM_FAILURE_MESSAGE};
pub use fallback::FallbackAuditor;
pub use normalizer::{Ambiguity, NormalizedVerdict, normalize};
pub use orchestrator::Orchestrator;
pub use primary::PrimaryAuditor;
pub use retry::{AttemptOutcome, RetryExit, RetryPolicy, RetryState};
pub use verdict::{
    FALLBACK_GOVERNOR_VERSION, GovernanceVerdict, SANITIZER_GOVERNOR_VERSION,
    SYSTEM_GOVERNOR_VERSION, ViolationType,
};
pub use worker::DraftGenerator;
