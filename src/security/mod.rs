pub mod clock;
pub mod rate_limiter;
pub mod sanitizer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limiter::{RateLimitDenial, RateLimiter};
pub use sanitizer::{MAX_INPUT_CHARS, Sanitizer};
