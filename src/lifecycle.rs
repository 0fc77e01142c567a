//! # Process Lifecycle
//!
//! Shutdown signals, bot uptime, and the process-wide panic hook.

use std::cell::Cell;
use std::fmt;
use std::future::{poll_fn, Future};
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::thread;
use std::time::{Duration, Instant};

use futures_util::FutureExt;

use crate::observability::{log_event_with_fields, Event};

/// Signal that started a graceful shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSignal {
    /// SIGINT, usually Ctrl+C
    Interrupt,
    /// SIGTERM, usually the service manager
    Terminate,
}

impl ShutdownSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wait for SIGINT or SIGTERM
///
/// Where SIGTERM cannot be registered, only SIGINT is awaited.
#[cfg(unix)]
pub async fn wait_for_shutdown() -> ShutdownSignal {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = tokio::signal::ctrl_c() => ShutdownSignal::Interrupt,
            _ = terminate.recv() => ShutdownSignal::Terminate,
        },
        Err(e) => {
            let reason = e.to_string();
            log_event_with_fields(
                Event::TaskFailed,
                &[("task", "sigterm_handler"), ("reason", reason.as_str())],
            );
            let _ = tokio::signal::ctrl_c().await;
            ShutdownSignal::Interrupt
        }
    }
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> ShutdownSignal {
    let _ = tokio::signal::ctrl_c().await;
    ShutdownSignal::Interrupt
}

/// Time since the bot finished booting
#[derive(Debug, Clone, Copy)]
pub struct BotClock {
    started: Instant,
}

impl BotClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for BotClock {
    fn default() -> Self {
        Self::start()
    }
}

thread_local! {
    static CONTAINED: Cell<u32> = const { Cell::new(0) };
}

struct ContainedGuard;

impl ContainedGuard {
    fn enter() -> Self {
        CONTAINED.with(|depth| depth.set(depth.get() + 1));
        ContainedGuard
    }
}

impl Drop for ContainedGuard {
    fn drop(&mut self) {
        CONTAINED.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// True while this thread is polling a future under [`contain_panics`]
pub fn panic_is_contained() -> bool {
    CONTAINED.with(|depth| depth.get() > 0)
}

/// Poll `future` to completion, catching a panic it raises
///
/// The panic hook logs such panics as `PANIC_RECOVERED` at WARN; the caller
/// owns reporting the failure.
pub async fn contain_panics<F: Future>(future: F) -> thread::Result<F::Output> {
    let mut caught = pin!(AssertUnwindSafe(future).catch_unwind());
    poll_fn(|cx| {
        let _contained = ContainedGuard::enter();
        caught.as_mut().poll(cx)
    })
    .await
}

fn panic_event() -> Event {
    if panic_is_contained() {
        Event::PanicRecovered
    } else {
        Event::UncaughtPanic
    }
}

/// Log every panic
///
/// Panics raised under [`contain_panics`] are `PANIC_RECOVERED`; all others
/// are `UNCAUGHT_PANIC` at FATAL. The hook only logs, unwinding proceeds as
/// usual.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();

        log_event_with_fields(
            panic_event(),
            &[("location", location.as_str()), ("message", message.as_str())],
        );
    }));
}
