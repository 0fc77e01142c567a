//! CycleScope for automatic begin/complete logging around one poll cycle
//!
//! - Logs `CYCLE_BEGIN` on creation
//! - Logs `CYCLE_COMPLETE` with the elapsed time when completed
//! - Logs `CYCLE_FAILED` on drop if never completed (error return or unwind)

use std::time::{Duration, Instant};

use super::events::Event;
use super::logger::Logger;

/// Logs the lifetime of one poll cycle
///
/// ```ignore
/// let scope = CycleScope::begin(7);
/// // ... fetch, resolve, publish ...
/// scope.complete(&[("published", "true")]);
/// ```
pub struct CycleScope {
    cycle: u64,
    started: Instant,
    finished: bool,
}

impl CycleScope {
    /// Start a scope; logs `CYCLE_BEGIN`
    pub fn begin(cycle: u64) -> Self {
        let cycle_str = cycle.to_string();
        Logger::trace(Event::CycleBegin.as_str(), &[("cycle", cycle_str.as_str())]);

        Self {
            cycle,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Cycle number this scope covers
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Time since the scope began
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log `CYCLE_COMPLETE` with extra fields
    pub fn complete(mut self, extra_fields: &[(&str, &str)]) {
        self.finished = true;
        let cycle = self.cycle.to_string();
        let duration = self.elapsed().as_millis().to_string();

        let mut fields: Vec<(&str, &str)> =
            vec![("cycle", cycle.as_str()), ("duration_ms", duration.as_str())];
        fields.extend(extra_fields.iter().copied());
        Logger::info(Event::CycleComplete.as_str(), &fields);
    }

    /// Log `CYCLE_FAILED` with a reason
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        self.log_failure(reason);
    }

    fn log_failure(&self, reason: &str) {
        let cycle = self.cycle.to_string();
        let duration = self.elapsed().as_millis().to_string();
        Logger::error(
            Event::CycleFailed.as_str(),
            &[
                ("cycle", cycle.as_str()),
                ("duration_ms", duration.as_str()),
                ("reason", reason),
            ],
        );
    }
}

impl Drop for CycleScope {
    fn drop(&mut self) {
        if !self.finished {
            self.log_failure("cycle ended without completing");
        }
    }
}
