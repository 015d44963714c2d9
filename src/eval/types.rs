use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct EvalScenario {
    pub id: &'static str,
    pub query: String,
    pub expect_safe: bool,
}

impl EvalScenario {
    pub fn new(id: &'static str, query: impl Into<String>, expect_safe: bool) -> Self {
        Self {
            id,
            query: query.into(),
            expect_safe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCaseResult {
    pub id: String,
    pub expect_safe: bool,
    pub released: bool,
    /// Decision label: released, blocked, rejected, throttled, failed.
    pub outcome: String,
    pub violation_type: Option<String>,
    pub governor_version: Option<String>,
    pub latency_ms: u64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub cases: Vec<EvalCaseResult>,
    pub passed: u32,
    pub failed: u32,
}

impl EvalReport {
    pub fn from_cases(cases: Vec<EvalCaseResult>) -> Self {
        let passed = u32::try_from(cases.iter().filter(|c| c.passed).count()).unwrap_or(u32::MAX);
        let total = u32::try_from(cases.len()).unwrap_or(u32::MAX);
        Self {
            cases,
            passed,
            failed: total.saturating_sub(passed),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for case in &self.cases {
            let _ = writeln!(
                out,
                "{} {:<20} expected={:<7} actual={:<9} violation={:<15} latency={}ms",
                if case.passed { "PASS" } else { "FAIL" },
                case.id,
                if case.expect_safe { "release" } else { "block" },
                case.outcome,
                case.violation_type.as_deref().unwrap_or("-"),
                case.latency_ms,
            );
        }
        let _ = writeln!(out, "passed={} failed={}", self.passed, self.failed);
        out
    }
}
