use super::record::AuditRecord;
use crate::config::AuditConfig;
use crate::governance::GovernanceVerdict;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSONL log of governed interactions.
///
/// Rotation renames the live file to `<path>.<unix-epoch>.bak`; nothing is
/// truncated. Rotate-then-append runs under one lock.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    max_size_bytes: u64,
    excerpt_chars: usize,
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>, max_size_bytes: u64, excerpt_chars: usize) -> Self {
        Self {
            path: path.into(),
            max_size_bytes: max_size_bytes.max(1),
            excerpt_chars,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(
            config.resolved_log_path(),
            config.max_size_bytes(),
            config.excerpt_chars,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails. I/O errors are reported through tracing and dropped.
    pub async fn log_event(
        &self,
        caller_id: &str,
        prompt: &str,
        verdict: &GovernanceVerdict,
        latency_ms: f64,
    ) {
        let record = AuditRecord::new(caller_id, prompt, verdict, latency_ms, self.excerpt_chars);
        if let Err(e) = self.append(&record).await {
            tracing::error!(
                path = %self.path.display(),
                caller_id,
                "Failed to write audit record: {e:#}"
            );
        }
    }

    async fn append(&self, record: &AuditRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize audit record")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create audit log directory")?;
        }

        self.rotate_if_needed().await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("Failed to open audit log")?;
        file.write_all(line.as_bytes())
            .await
            .context("Failed to append audit record")?;
        file.flush().await?;
        Ok(())
    }

    async fn rotate_if_needed(&self) -> anyhow::Result<()> {
        let size = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).context("Failed to stat audit log"),
        };
        if size < self.max_size_bytes {
            return Ok(());
        }

        let target = self.rotation_target().await;
        tokio::fs::rename(&self.path, &target)
            .await
            .context("Failed to rotate audit log")?;
        tracing::info!(
            rotated_to = %target.display(),
            size_bytes = size,
            "Audit log rotated"
        );
        Ok(())
    }

    async fn rotation_target(&self) -> PathBuf {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let base = format!("{}.{epoch}", self.path.display());

        let mut candidate = PathBuf::from(format!("{base}.bak"));
        let mut n = 1;
        while tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = PathBuf::from(format!("{base}-{n}.bak"));
            n += 1;
        }
        candidate
    }
}
