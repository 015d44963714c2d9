// ── Infrastructure ──────────────────────────────────────────────────────────
pub mod scrub;
pub mod traits;
pub mod types;

// ── Client implementations ──────────────────────────────────────────────────
pub mod compatible;

pub use compatible::OpenAiCompatibleClient;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::CompletionClient;
pub use types::{AuthStyle, ChatMessage, CompletionRequest, MessageRole};
