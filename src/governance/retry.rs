//! Bounded retry for the primary auditor, kept free of I/O so the policy can
//! be tested without a judge.

use std::time::Duration;

/// How one audit attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Judge replied but the body was not JSON.
    ParseFailure,
    /// JSON parsed but the normalized verdict broke the schema.
    SchemaInvalid,
    /// Transport, service, or timeout failure.
    TransientError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryExit {
    Succeeded,
    ParseExhausted,
    SchemaInvalid,
    TransportExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Run attempt `n` (1-based).
    Attempt(u32),
    /// Wait `delay`, then run attempt `next`.
    Backoff { next: u32, delay: Duration },
    Terminal(RetryExit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn start(&self) -> RetryState {
        RetryState::Attempt(1)
    }

    /// Next state after attempt `attempt` finished with `outcome`.
    pub fn advance(&self, attempt: u32, outcome: AttemptOutcome) -> RetryState {
        let attempts_left = attempt < self.max_attempts;
        match outcome {
            AttemptOutcome::Success => RetryState::Terminal(RetryExit::Succeeded),
            AttemptOutcome::SchemaInvalid => RetryState::Terminal(RetryExit::SchemaInvalid),
            AttemptOutcome::ParseFailure if attempts_left => RetryState::Attempt(attempt + 1),
            AttemptOutcome::ParseFailure => RetryState::Terminal(RetryExit::ParseExhausted),
            AttemptOutcome::TransientError if attempts_left => RetryState::Backoff {
                next: attempt + 1,
                delay: self.backoff,
            },
            AttemptOutcome::TransientError => {
                RetryState::Terminal(RetryExit::TransportExhausted)
            }
        }
    }
}
