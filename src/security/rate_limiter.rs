use super::clock::{Clock, SystemClock};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const HOUR: Duration = Duration::from_secs(3600);
const BURST_WINDOW: Duration = Duration::from_secs(60);

/// Why a caller was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDenial {
    HourlyExhausted,
    BurstExhausted,
}

impl RateLimitDenial {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HourlyExhausted => "hourly_limit",
            Self::BurstExhausted => "burst_limit",
        }
    }
}

/// Admitted request timestamps for one caller, oldest first.
#[derive(Debug, Default)]
struct RateWindow {
    hits: VecDeque<Instant>,
}

impl RateWindow {
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.hits.front() {
            if now.saturating_duration_since(*oldest) > HOUR {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn recent(&self, now: Instant) -> usize {
        self.hits
            .iter()
            .rev()
            .take_while(|t| now.saturating_duration_since(**t) < BURST_WINDOW)
            .count()
    }
}

/// Sliding-window admission control keyed by caller identity.
///
/// Each caller gets an hourly cap and a 60-second burst cap. The check and
/// the record happen under one lock, so two concurrent requests can never
/// both observe "under limit" for the last free slot.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateWindow>>,
    hourly_limit: usize,
    burst_limit: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(hourly_limit: u32, burst_limit: u32) -> Self {
        Self::with_clock(hourly_limit, burst_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(hourly_limit: u32, burst_limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            hourly_limit: usize::try_from(hourly_limit).unwrap_or(usize::MAX),
            burst_limit: usize::try_from(burst_limit).unwrap_or(usize::MAX),
            clock,
        }
    }

    /// Admit or deny `caller_id`. A slot is consumed only on admission.
    pub fn check_and_record(&self, caller_id: &str) -> Result<(), RateLimitDenial> {
        let now = self.clock.now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = windows.entry(caller_id.to_string()).or_default();

        window.prune(now);
        if window.hits.len() >= self.hourly_limit {
            return Err(RateLimitDenial::HourlyExhausted);
        }
        if window.recent(now) >= self.burst_limit {
            return Err(RateLimitDenial::BurstExhausted);
        }

        window.hits.push_back(now);
        Ok(())
    }

    pub fn is_allowed(&self, caller_id: &str) -> bool {
        self.check_and_record(caller_id).is_ok()
    }

    /// Requests currently counted against `caller_id` within the hour.
    pub fn usage(&self, caller_id: &str) -> usize {
        let now = self.clock.now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        windows.get_mut(caller_id).map_or(0, |window| {
            window.prune(now);
            window.hits.len()
        })
    }
}
