use crate::error::SanitizerRejection;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use regex::Regex;
use std::sync::LazyLock;

/// Hard cap on raw input length, in characters.
pub const MAX_INPUT_CHARS: usize = 10_000;

/// Encoded payloads must be longer than this before decoding is attempted.
const MIN_ENCODED_CHARS: usize = 20;

/// Substrings that mark a decoded payload as an injection attempt.
const ENCODED_TRIGGERS: &[&str] = &["system", "ignore", "disregard", "instructions"];

static BASE64_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 shape pattern is valid")
});

/// Rejects or normalizes raw input before it reaches any model.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_chars: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            max_chars: MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Validate `text` and return it trimmed.
    pub fn sanitize(&self, text: &str) -> Result<String, SanitizerRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SanitizerRejection::Empty);
        }

        let len = text.chars().count();
        if len > self.max_chars {
            return Err(SanitizerRejection::TooLong {
                len,
                max: self.max_chars,
            });
        }

        if let Some(encoding) = detect_encoded_injection(trimmed) {
            tracing::warn!(encoding, "Encoded injection attempt rejected");
            return Err(SanitizerRejection::EncodedInjection { encoding });
        }

        Ok(trimmed.to_string())
    }
}

fn contains_trigger(decoded: &str) -> bool {
    let lowered = decoded.to_lowercase();
    ENCODED_TRIGGERS.iter().any(|t| lowered.contains(t))
}

/// Returns the encoding name when `text` is an encoded payload whose decoded
/// form carries a trigger. Anything that fails to decode is plain text.
fn detect_encoded_injection(text: &str) -> Option<&'static str> {
    if text.chars().count() <= MIN_ENCODED_CHARS {
        return None;
    }

    if BASE64_SHAPE.is_match(text)
        && let Ok(bytes) = BASE64_STANDARD.decode(text)
        && contains_trigger(&String::from_utf8_lossy(&bytes))
    {
        return Some("base64");
    }

    if text.len() % 2 == 0
        && text.chars().all(|c| c.is_ascii_hexdigit())
        && let Ok(bytes) = hex::decode(text)
        && contains_trigger(&String::from_utf8_lossy(&bytes))
    {
        return Some("hex");
    }

    None
}
