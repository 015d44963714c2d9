mod env_overrides;
mod loader;
pub mod schema;

pub use schema::{
    AuditConfig, Config, GovernorConfig, ProviderConfig, RateLimitConfig, WorkerConfig,
};
