//! Ctrl+C handling for long waits.
//!
//! Handlers live only as long as an [`InterruptGuard`], so Ctrl+C at a
//! prompt keeps its default behavior and ends the process. While a guard
//! is alive the signal handler only flips an atomic flag, and a watcher
//! thread turns the flag into a cancelled [`CancellationToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Restores default signal handling when dropped.
pub struct InterruptGuard {
    stop: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

/// Cancel `token` on SIGINT/SIGTERM until the returned guard is dropped.
pub fn install(token: CancellationToken) -> InterruptGuard {
    INTERRUPTED.store(false, Ordering::SeqCst);
    register_handlers();

    let stop = Arc::new(AtomicBool::new(false));
    let watcher_stop = Arc::clone(&stop);
    let spawned = thread::Builder::new()
        .name("interrupt-watch".to_string())
        .spawn(move || {
            while !watcher_stop.load(Ordering::SeqCst) {
                if INTERRUPTED.load(Ordering::SeqCst) {
                    tracing::info!("interrupt received, cancelling");
                    token.cancel();
                    return;
                }
                thread::sleep(WATCH_INTERVAL);
            }
        });

    let watcher = match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "interrupts will not cancel waits");
            None
        }
    };

    InterruptGuard { stop, watcher }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        restore_handlers();
        self.stop.store(true, Ordering::SeqCst);
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
    }
}

#[cfg(unix)]
fn register_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, on_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, on_signal as libc::sighandler_t);
    }
}

#[cfg(unix)]
fn restore_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
        libc::signal(libc::SIGTERM, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn register_handlers() {}

#[cfg(not(unix))]
fn restore_handlers() {}

#[cfg(unix)]
extern "C" fn on_signal(_: libc::c_int) {
    if INTERRUPTED.swap(true, Ordering::SeqCst) {
        // Second signal: stop waiting for the cancellation to land
        unsafe { libc::_exit(130) };
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    // Handlers are process-wide, so both cases run in one test.
    #[test]
    fn test_signal_cancels_token_only_while_guarded() {
        let idle = CancellationToken::new();
        drop(install(idle.clone()));
        thread::sleep(WATCH_INTERVAL * 2);
        assert!(!idle.is_cancelled());

        let token = CancellationToken::new();
        let guard = install(token.clone());
        unsafe { libc::raise(libc::SIGINT) };

        let deadline = Instant::now() + Duration::from_secs(2);
        while !token.is_cancelled() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        drop(guard);
        assert!(token.is_cancelled());
    }
}
