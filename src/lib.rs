#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod audit;
pub mod config;
pub mod error;
pub mod eval;
pub mod governance;
pub mod llm;
pub mod security;
pub mod ui;

pub use config::Config;
pub use error::{GovernorFailure, PipelineError, SanitizerRejection};
pub use governance::{
    ConversationContext, GovernanceDecision, GovernanceVerdict, Orchestrator, Session,
    ViolationType,
};
