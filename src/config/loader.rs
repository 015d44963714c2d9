use super::Config;
use anyhow::{Context, Result, bail};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let config_dir = home.join(".aegis-gate");
        let config_path = config_dir.join("config.toml");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .aegis-gate directory")?;
        }

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Structural checks that hold regardless of which command runs.
    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            bail!("provider.model must not be empty");
        }
        if self.governor.max_retries == 0 {
            bail!("governor.max_retries must be at least 1");
        }
        if self.rate_limit.hourly == 0 || self.rate_limit.burst == 0 {
            bail!("rate_limit.hourly and rate_limit.burst must be greater than zero");
        }
        if self.audit.max_size_mb == 0 {
            bail!("audit.max_size_mb must be greater than zero");
        }
        Ok(())
    }

    /// Commands that reach the completion service also need an endpoint.
    pub fn validate_remote(&self) -> Result<()> {
        self.validate()?;
        match self.provider.endpoint.as_deref() {
            Some(endpoint) if !endpoint.trim().is_empty() => Ok(()),
            _ => bail!(
                "No completion endpoint configured. Set AEGIS_ENDPOINT or provider.endpoint in {}",
                self.config_path.display()
            ),
        }
    }

    /// Effective configuration with the credential masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.api_key.is_some() {
            copy.provider.api_key = Some("[REDACTED]".into());
        }
        copy
    }
}
