pub mod log;
pub mod record;

pub use log::AuditLog;
pub use record::{AuditRecord, integrity_hash};
