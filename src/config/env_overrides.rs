use super::Config;
use std::str::FromStr;

fn env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|value| !value.trim().is_empty())
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_value(&[key])?;
    if let Ok(parsed) = raw.trim().parse::<T>() {
        Some(parsed)
    } else {
        tracing::warn!(env_var = key, value = %raw, "Ignoring unparsable environment override");
        None
    }
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(endpoint) = env_value(&["AEGIS_ENDPOINT", "AZURE_INFERENCE_ENDPOINT"]) {
            self.provider.endpoint = Some(endpoint);
        }

        if let Some(key) = env_value(&["AEGIS_API_KEY", "AZURE_INFERENCE_CREDENTIAL"]) {
            self.provider.api_key = Some(key);
        }

        if let Some(model) = env_value(&["AEGIS_MODEL", "AZURE_MODEL_NAME"]) {
            self.provider.model = model;
        }

        if let Some(length) = env_parsed::<u32>("MAX_RESPONSE_LENGTH") {
            self.worker.max_response_length = length;
        }

        if let Some(strictness) = env_value(&["GOVERNOR_STRICTNESS"]) {
            self.governor.strictness = strictness;
        }

        if let Some(hourly) = env_parsed::<u32>("RATE_LIMIT_HOURLY") {
            self.rate_limit.hourly = hourly;
        }

        if let Some(burst) = env_parsed::<u32>("RATE_LIMIT_BURST") {
            self.rate_limit.burst = burst;
        }

        if let Some(path) = env_value(&["AUDIT_LOG_PATH"]) {
            self.audit.log_path = path;
        }

        if let Some(size) = env_parsed::<u64>("AUDIT_LOG_MAX_SIZE_MB") {
            self.audit.max_size_mb = size;
        }
    }
}
