use crate::llm::AuthStyle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub governor: GovernorConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

// ── Completion service ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible completion service
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub auth_style: AuthStyle,
    /// Per-call timeout for both drafting and auditing
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "Phi-4-mini-instruct".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_model(),
            auth_style: AuthStyle::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Draft generation ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_max_response_length")]
    pub max_response_length: u32,
    #[serde(default = "default_worker_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

fn default_max_response_length() -> u32 {
    2000
}

fn default_worker_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_response_length: default_max_response_length(),
            temperature: default_worker_temperature(),
            top_p: default_top_p(),
        }
    }
}

// ── Primary auditor ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Free-text label echoed into the audit prompt
    #[serde(default = "default_strictness")]
    pub strictness: String,
    /// Total audit attempts before the primary auditor gives up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts after a transport failure
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_governor_max_tokens")]
    pub max_tokens: u32,
}

fn default_strictness() -> String {
    "high".into()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_governor_max_tokens() -> u32 {
    500
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            strictness: default_strictness(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_tokens: default_governor_max_tokens(),
        }
    }
}

// ── Admission control ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_hourly")]
    pub hourly: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_hourly() -> u32 {
    100
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            hourly: default_hourly(),
            burst: default_burst(),
        }
    }
}

// ── Audit log ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_log_path")]
    pub log_path: String,
    /// Rotate once the live file reaches this size
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_log_path() -> String {
    "audit_log.jsonl".into()
}

fn default_max_size_mb() -> u64 {
    500
}

fn default_excerpt_chars() -> usize {
    100
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            max_size_mb: default_max_size_mb(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl AuditConfig {
    pub fn resolved_log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_path).into_owned())
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}
