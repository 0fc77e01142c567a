//! Re-entrancy guard for poll cycles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Driver state as seen by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// At most one cycle holds a permit at a time
#[derive(Debug, Clone, Default)]
pub struct CycleGate {
    running: Arc<AtomicBool>,
}

impl CycleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the permit, or `None` while a cycle is in flight
    pub fn try_enter(&self) -> Option<CyclePermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CyclePermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn state(&self) -> DriverState {
        if self.running.load(Ordering::Acquire) {
            DriverState::Running
        } else {
            DriverState::Idle
        }
    }
}

/// Returns the gate to `Idle` when dropped
#[derive(Debug)]
pub struct CyclePermit {
    running: Arc<AtomicBool>,
}

impl Drop for CyclePermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
