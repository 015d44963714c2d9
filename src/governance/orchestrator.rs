use super::context::Session;
use super::decision::GovernanceDecision;
use super::fallback::FallbackAuditor;
use super::primary::PrimaryAuditor;
use super::verdict::{GovernanceVerdict, SANITIZER_GOVERNOR_VERSION, SYSTEM_GOVERNOR_VERSION};
use super::worker::DraftGenerator;
use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::PipelineError;
use crate::llm::CompletionClient;
use crate::security::{RateLimiter, Sanitizer};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// A draft that made it through an auditor, safe or not.
struct Audited {
    prompt: String,
    draft: String,
    verdict: GovernanceVerdict,
}

/// Sanitizer → RateLimiter → DraftGenerator → PrimaryAuditor (→ Fallback)
/// → AuditLog → enforcement.
///
/// Every failure resolves to a non-release decision; nothing a component
/// returns can produce an unaudited release.
pub struct Orchestrator {
    sanitizer: Sanitizer,
    rate_limiter: RateLimiter,
    worker: DraftGenerator,
    primary: PrimaryAuditor,
    fallback: FallbackAuditor,
    audit_log: AuditLog,
}

impl Orchestrator {
    pub fn new(
        sanitizer: Sanitizer,
        rate_limiter: RateLimiter,
        worker: DraftGenerator,
        primary: PrimaryAuditor,
        audit_log: AuditLog,
    ) -> Self {
        Self {
            sanitizer,
            rate_limiter,
            worker,
            primary,
            fallback: FallbackAuditor,
            audit_log,
        }
    }

    /// Wire every stage from config, sharing one completion client between
    /// drafting and auditing.
    pub fn from_config(config: &Config, client: Arc<dyn CompletionClient>) -> Self {
        let timeout = Duration::from_secs(config.provider.timeout_secs.max(1));
        let model = config.provider.model.as_str();

        Self::new(
            Sanitizer::new(),
            RateLimiter::new(config.rate_limit.hourly, config.rate_limit.burst),
            DraftGenerator::new(Arc::clone(&client), model, &config.worker, timeout),
            PrimaryAuditor::new(client, model, &config.governor, timeout),
            AuditLog::from_config(&config.audit),
        )
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    pub fn governor_version(&self) -> &str {
        self.primary.version()
    }

    pub async fn process(&self, session: &mut Session, input: &str) -> GovernanceDecision {
        self.process_with_cancel(session, input, &CancellationToken::new())
            .await
    }

    /// Run one request. Cancelling `cancel` abandons drafting or auditing
    /// and still leaves a block record behind.
    pub async fn process_with_cancel(
        &self,
        session: &mut Session,
        input: &str,
        cancel: &CancellationToken,
    ) -> GovernanceDecision {
        let span = tracing::info_span!(
            "governed_request",
            request_id = %Uuid::new_v4(),
            caller_id = %session.caller_id,
        );

        async {
            let started = Instant::now();
            let outcome = self.govern(session, input, cancel).await;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(audited) => self.enforce(session, audited, latency_ms).await,
                Err(err) => self.fail_secure(session, input, err, latency_ms).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Primary auditor failures are recovered here by the fallback auditor
    /// and never reach `fail_secure` as `GovernorFailure`.
    async fn govern(
        &self,
        session: &Session,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<Audited, PipelineError> {
        let prompt = self.sanitizer.sanitize(input)?;

        self.rate_limiter
            .check_and_record(&session.caller_id)
            .map_err(|denial| {
                tracing::warn!(limit = denial.as_str(), "Rate limit exceeded");
                PipelineError::RateLimitExceeded {
                    caller_id: session.caller_id.clone(),
                }
            })?;

        let history = session.context.with_user_turn(&prompt);
        let draft = cancellable(cancel, self.worker.generate(&history)).await?;

        let verdict = cancellable(cancel, async {
            match self.primary.audit(&prompt, &draft).await {
                Ok(verdict) => Ok(verdict),
                Err(failure) => {
                    tracing::warn!(
                        error = %failure,
                        "Primary auditor failed; using fallback auditor"
                    );
                    self.fallback_audit(&prompt, &draft)
                }
            }
        })
        .await?;

        Ok(Audited {
            prompt,
            draft,
            verdict,
        })
    }

    /// Only unwinding builds turn a panic into `SystemError`; the release
    /// profile aborts instead.
    fn fallback_audit(&self, prompt: &str, draft: &str) -> Result<GovernanceVerdict, PipelineError> {
        let fallback = self.fallback;
        std::panic::catch_unwind(move || fallback.quick_audit(prompt, draft))
            .map_err(|_| PipelineError::SystemError("fallback auditor panicked".into()))
    }

    async fn enforce(
        &self,
        session: &mut Session,
        audited: Audited,
        latency_ms: f64,
    ) -> GovernanceDecision {
        let Audited {
            prompt,
            draft,
            verdict,
        } = audited;

        self.audit_log
            .log_event(&session.caller_id, &prompt, &verdict, latency_ms)
            .await;

        tracing::info!(
            is_safe = verdict.is_safe(),
            violation_type = %verdict.violation_type(),
            confidence = verdict.confidence_score(),
            governor_version = verdict.governor_version(),
            latency_ms,
            "Governance verdict"
        );

        if verdict.is_safe() {
            session.context.commit_exchange(&prompt, &draft);
            GovernanceDecision::Released {
                response: draft,
                verdict,
            }
        } else {
            session.context.record_block(&verdict);
            GovernanceDecision::Blocked { verdict }
        }
    }

    async fn fail_secure(
        &self,
        session: &Session,
        input: &str,
        err: PipelineError,
        latency_ms: f64,
    ) -> GovernanceDecision {
        let caller_id = session.caller_id.as_str();
        match err {
            PipelineError::RateLimitExceeded { .. } => GovernanceDecision::Throttled,
            PipelineError::SanitizerRejection(rejection) => {
                tracing::warn!(reason = %rejection, "Input rejected by sanitizer");
                let verdict = GovernanceVerdict::synthesized_block(
                    format!("Input rejected: {rejection}"),
                    SANITIZER_GOVERNOR_VERSION,
                );
                self.audit_log
                    .log_event(caller_id, input, &verdict, latency_ms)
                    .await;
                GovernanceDecision::Rejected {
                    reason: rejection.to_string(),
                }
            }
            other @ (PipelineError::WorkerFailure(_)
            | PipelineError::GovernorFailure(_)
            | PipelineError::Cancelled
            | PipelineError::SystemError(_)) => {
                tracing::error!(kind = other.kind(), "Request blocked: {other}");
                let verdict = GovernanceVerdict::synthesized_block(
                    format!("Request blocked due to system error: {}", other.kind()),
                    SYSTEM_GOVERNOR_VERSION,
                );
                self.audit_log
                    .log_event(caller_id, input.trim(), &verdict, latency_ms)
                    .await;
                GovernanceDecision::system_failure()
            }
        }
    }
}

/// Race `work` against cancellation. Cancellation wins ties.
async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T, PipelineError>>,
) -> Result<T, PipelineError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = work => result,
    }
}
