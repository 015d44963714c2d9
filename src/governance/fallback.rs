use super::verdict::{FALLBACK_GOVERNOR_VERSION, GovernanceVerdict, ViolationType};
use regex::Regex;
use std::sync::LazyLock;

struct PatternRule {
    pattern: Regex,
    violation: ViolationType,
    confidence: f64,
    reasoning: &'static str,
    flagged: &'static str,
}

fn rule(
    pattern: &str,
    violation: ViolationType,
    confidence: f64,
    reasoning: &'static str,
    flagged: &'static str,
) -> PatternRule {
    PatternRule {
        pattern: Regex::new(pattern).expect("fallback audit pattern is valid"),
        violation,
        confidence,
        reasoning,
        flagged,
    }
}

// Precedence is the slice order; the first match wins.
static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            r"\b\d{3}-\d{2}-\d{4}\b",
            ViolationType::Pii,
            0.9,
            "Detected pattern matching Social Security Number format",
            "SSN pattern detected",
        ),
        rule(
            r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",
            ViolationType::Pii,
            0.85,
            "Detected pattern matching credit card number format",
            "Credit card pattern detected",
        ),
        rule(
            r"(?i)(DROP\s+TABLE|DELETE\s+FROM|INSERT\s+INTO|UPDATE\s+.+SET|UNION\s+SELECT)",
            ViolationType::Sqli,
            0.8,
            "Detected SQL command patterns that could be malicious",
            "SQL pattern detected",
        ),
        rule(
            r"(?i)(ignore\s+(previous|all)\s+(instructions|rules)|disregard\s+.+instructions)",
            ViolationType::PromptInjection,
            0.75,
            "Detected potential prompt injection attempt",
            "Injection attempt detected",
        ),
    ]
});

const NO_MATCH_CONFIDENCE: f64 = 0.5;

/// Deterministic, offline auditor used when the judge cannot deliver.
///
/// Never fails and never calls out. A clean result carries reduced
/// confidence since only known shapes are checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAuditor;

impl FallbackAuditor {
    pub fn quick_audit(&self, query: &str, draft: &str) -> GovernanceVerdict {
        let combined = format!("{query} {draft}");

        if let Some(hit) = RULES.iter().find(|r| r.pattern.is_match(&combined)) {
            return GovernanceVerdict::new(
                false,
                hit.violation,
                hit.reasoning,
                hit.confidence,
                Some(hit.flagged.to_string()),
                FALLBACK_GOVERNOR_VERSION,
            );
        }

        GovernanceVerdict::new(
            true,
            ViolationType::None,
            "No known violation patterns found by the offline checker; full audit unavailable",
            NO_MATCH_CONFIDENCE,
            None,
            FALLBACK_GOVERNOR_VERSION,
        )
    }
}
