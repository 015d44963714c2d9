pub mod harness;
pub mod types;

pub use harness::{EvalHarness, default_scenarios};
pub use types::{EvalCaseResult, EvalReport, EvalScenario};
