//! Maps whatever JSON the judge returned onto the canonical verdict fields.
//!
//! The judge is free-form, so every recognized input shape is listed here
//! explicitly. Anything outside the grammar lands in the unsafe default.

use super::verdict::{GovernanceVerdict, ViolationType};
use serde_json::{Map, Value};

const FLAG_KEYS: &[&str] = &["is_safe", "isSafe", "safe"];
const LABEL_KEYS: &[&str] = &[
    "security_verdict",
    "securityVerdict",
    "verdict",
    "status",
    "result",
];
const VIOLATION_KEYS: &[&str] = &["violation_type", "violationType", "violation", "category"];
const REASONING_KEYS: &[&str] = &["reasoning", "explanation", "reason", "details"];
const CONFIDENCE_KEYS: &[&str] = &["confidence_score", "confidenceScore", "confidence", "certainty"];
const FLAGGED_KEYS: &[&str] = &["flagged_content", "flaggedContent"];

// Matched as whole words after splitting on anything that is not a letter
// or digit. The last word of an unsafe phrase also matches as a prefix, so
// "risk" covers "risky" and "reject" covers "rejected".
const UNSAFE_KEYWORDS: &[&str] = &[
    "unsafe",
    "not safe",
    "inappropriate",
    "not appropriate",
    "unacceptable",
    "not acceptable",
    "invalid",
    "not valid",
    "insecure",
    "not secure",
    "impermissible",
    "not permissible",
    "sensitive",
    "disclosure",
    "violation",
    "breach",
    "risk",
    "harmful",
    "leak",
    "malicious",
    "block",
    "reject",
    "fail",
];
// Exact whole words only.
const SAFE_KEYWORDS: &[&str] = &[
    "safe",
    "appropriate",
    "valid",
    "acceptable",
    "permissible",
    "secure",
    "pass",
];

// Checked in order. Prompt injection precedes SQLi so that "prompt injection"
// is not swallowed by the bare "injection" keyword.
const PII_HINTS: &[&str] = &["password", "ssn", "social security", "personal", "pii"];
const PROMPT_INJECTION_HINTS: &[&str] = &[
    "prompt injection",
    "promptinjection",
    "jailbreak",
    "ignore previous",
];
const SQLI_HINTS: &[&str] = &["sql", "injection"];

const DEFAULT_CONFIDENCE_WITH_FLAG: f64 = 0.8;
const DEFAULT_CONFIDENCE_WITHOUT_FLAG: f64 = 0.6;

// ── Input grammar ─────────────────────────────────────────────────

/// Where the judge's safety claim came from.
#[derive(Debug, Clone, PartialEq)]
enum SafetySignal {
    /// A boolean field, or a string spelling one.
    Flag(bool),
    /// A free-text verdict label to classify by keyword.
    Label(String),
    /// No recognized field at all.
    Missing,
}

/// Why `is_safe` was forced to false without a clear unsafe claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ambiguity {
    /// Judge output was not a JSON object.
    UnrecognizedShape,
    /// No flag or label field was found.
    NoSafetySignal,
    /// Label carried both safe and unsafe keywords.
    ConflictingKeywords,
    /// Label carried neither safe nor unsafe keywords.
    NoKeywords,
    /// Flag said safe but a concrete violation type was named.
    SafeWithViolation,
}

impl Ambiguity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizedShape => "unrecognized_shape",
            Self::NoSafetySignal => "no_safety_signal",
            Self::ConflictingKeywords => "conflicting_keywords",
            Self::NoKeywords => "no_keywords",
            Self::SafeWithViolation => "safe_with_violation",
        }
    }
}

/// Best-effort canonical fields, prior to schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVerdict {
    pub is_safe: bool,
    pub violation_type: ViolationType,
    pub reasoning: String,
    /// `None` when a confidence field was present but unreadable.
    pub confidence_score: Option<f64>,
    pub flagged_content: Option<String>,
    pub ambiguity: Option<Ambiguity>,
}

impl NormalizedVerdict {
    /// Schema check. Failure here is not retried by the caller.
    pub fn validate(self, governor_version: &str) -> Result<GovernanceVerdict, String> {
        let confidence = self
            .confidence_score
            .ok_or_else(|| "confidence_score is not numeric".to_string())?;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(format!("confidence_score {confidence} outside [0.0, 1.0]"));
        }
        if self.reasoning.trim().is_empty() {
            return Err("reasoning is empty".into());
        }

        Ok(GovernanceVerdict::new(
            self.is_safe,
            self.violation_type,
            self.reasoning,
            confidence,
            self.flagged_content,
            governor_version,
        ))
    }
}

// ── Normalization ─────────────────────────────────────────────────

/// Never fails. Unclear intent resolves to `is_safe = false`.
pub fn normalize(raw: &Value) -> NormalizedVerdict {
    let Some(fields) = raw.as_object() else {
        return unrecognized_shape(raw);
    };

    let signal = safety_signal(fields);
    let (mut is_safe, mut ambiguity) = resolve_safety(&signal);

    let claimed = claimed_violation(fields);
    if is_safe && let Some(violation) = claimed.filter(|v| *v != ViolationType::None) {
        is_safe = false;
        ambiguity = Some(Ambiguity::SafeWithViolation);
        tracing::warn!(
            violation_type = %violation,
            "Judge marked content safe while naming a violation; treating as unsafe"
        );
    }

    let violation_type = if is_safe {
        ViolationType::None
    } else {
        match claimed {
            Some(v) if v != ViolationType::None => v,
            _ => infer_violation(raw),
        }
    };

    let label = match &signal {
        SafetySignal::Label(label) => Some(label.as_str()),
        _ => None,
    };
    let reasoning = first_text(fields, REASONING_KEYS)
        .or_else(|| label.filter(|l| !l.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| templated_reasoning(is_safe, violation_type));

    let has_flag = FLAG_KEYS.iter().any(|key| fields.contains_key(*key));

    NormalizedVerdict {
        is_safe,
        violation_type,
        reasoning,
        confidence_score: confidence(fields, has_flag),
        flagged_content: flagged_content(fields),
        ambiguity,
    }
}

fn unrecognized_shape(raw: &Value) -> NormalizedVerdict {
    tracing::warn!(
        ambiguity = Ambiguity::UnrecognizedShape.as_str(),
        "Judge output is not a JSON object; defaulting to unsafe"
    );
    let violation_type = infer_violation(raw);
    NormalizedVerdict {
        is_safe: false,
        violation_type,
        reasoning: templated_reasoning(false, violation_type),
        confidence_score: Some(DEFAULT_CONFIDENCE_WITHOUT_FLAG),
        flagged_content: None,
        ambiguity: Some(Ambiguity::UnrecognizedShape),
    }
}

fn safety_signal(fields: &Map<String, Value>) -> SafetySignal {
    for key in FLAG_KEYS {
        match fields.get(*key) {
            Some(Value::Bool(flag)) => return SafetySignal::Flag(*flag),
            Some(Value::String(s)) => {
                if let Some(flag) = parse_bool(s) {
                    return SafetySignal::Flag(flag);
                }
            }
            _ => {}
        }
    }

    for key in LABEL_KEYS {
        match fields.get(*key) {
            Some(Value::Bool(flag)) => return SafetySignal::Flag(*flag),
            Some(Value::String(label)) => return SafetySignal::Label(label.clone()),
            _ => {}
        }
    }

    SafetySignal::Missing
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn resolve_safety(signal: &SafetySignal) -> (bool, Option<Ambiguity>) {
    match signal {
        SafetySignal::Flag(flag) => (*flag, None),
        SafetySignal::Label(label) => classify_label(label),
        SafetySignal::Missing => {
            tracing::warn!(
                ambiguity = Ambiguity::NoSafetySignal.as_str(),
                "Judge output has no recognizable safety field; defaulting to unsafe"
            );
            (false, Some(Ambiguity::NoSafetySignal))
        }
    }
}

fn classify_label(label: &str) -> (bool, Option<Ambiguity>) {
    let lowered = label.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut claimed = vec![false; words.len()];
    for phrase in UNSAFE_KEYWORDS {
        mark_phrase(&words, phrase, &mut claimed);
    }
    let unsafe_hit = claimed.iter().any(|c| *c);
    let safe_hit = words
        .iter()
        .zip(&claimed)
        .any(|(word, taken)| !taken && SAFE_KEYWORDS.contains(word));

    match (unsafe_hit, safe_hit) {
        (true, false) => (false, None),
        (false, true) => (true, None),
        (true, true) => {
            tracing::warn!(
                ambiguity = Ambiguity::ConflictingKeywords.as_str(),
                label,
                "Verdict label mixes safe and unsafe keywords; defaulting to unsafe"
            );
            (false, Some(Ambiguity::ConflictingKeywords))
        }
        (false, false) => {
            tracing::warn!(
                ambiguity = Ambiguity::NoKeywords.as_str(),
                label,
                "Verdict label has no recognized keywords; defaulting to unsafe"
            );
            (false, Some(Ambiguity::NoKeywords))
        }
    }
}

/// Marks every word covered by an occurrence of `phrase`. Words of a matched
/// phrase are not available to the safe-keyword scan, so "not safe" never
/// also counts as "safe".
fn mark_phrase(words: &[&str], phrase: &str, claimed: &mut [bool]) {
    let parts: Vec<&str> = phrase.split(' ').collect();
    let Some((last, leading)) = parts.split_last() else {
        return;
    };
    if words.len() < parts.len() {
        return;
    }

    for start in 0..=words.len() - parts.len() {
        let window = &words[start..start + parts.len()];
        let leading_match = leading.iter().zip(window).all(|(p, w)| p == w);
        if leading_match && window[leading.len()].starts_with(last) {
            claimed[start..start + parts.len()].fill(true);
        }
    }
}

fn claimed_violation(fields: &Map<String, Value>) -> Option<ViolationType> {
    VIOLATION_KEYS
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find_map(ViolationType::from_canonical)
}

fn infer_violation(raw: &Value) -> ViolationType {
    let haystack = raw.to_string().to_lowercase();
    let hit = |hints: &[&str]| hints.iter().any(|h| haystack.contains(h));

    if hit(PII_HINTS) {
        ViolationType::Pii
    } else if hit(PROMPT_INJECTION_HINTS) {
        ViolationType::PromptInjection
    } else if hit(SQLI_HINTS) {
        ViolationType::Sqli
    } else {
        ViolationType::PromptInjection
    }
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn templated_reasoning(is_safe: bool, violation_type: ViolationType) -> String {
    if is_safe {
        "Content appears safe based on automated analysis. No security violations detected."
            .to_string()
    } else {
        format!("Content blocked due to potential security risk. Violation type: {violation_type}")
    }
}

fn confidence(fields: &Map<String, Value>, has_flag: bool) -> Option<f64> {
    let present = CONFIDENCE_KEYS.iter().find_map(|key| fields.get(*key));
    match present {
        None => Some(if has_flag {
            DEFAULT_CONFIDENCE_WITH_FLAG
        } else {
            DEFAULT_CONFIDENCE_WITHOUT_FLAG
        }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
}

fn flagged_content(fields: &Map<String, Value>) -> Option<String> {
    match FLAGGED_KEYS.iter().find_map(|key| fields.get(*key))? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
