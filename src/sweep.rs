//! Background sweeper shared by the lease managers.
//!
//! A crashed lease holder never calls release, so each manager runs a
//! periodic sweep that deletes expired leases and their durable records,
//! independent of any acquire/release call. The sweeper thread holds only a
//! weak reference to the manager state: dropping the manager disconnects the
//! wake channel and the thread exits on its next tick.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Handle keeping a sweeper thread alive. Dropping the handle stops the
/// thread.
#[derive(Debug)]
pub(crate) struct SweeperHandle {
    _shutdown: Sender<()>,
}

/// Spawn a sweeper that calls `sweep` every `interval`.
///
/// The closure returns `false` when its target no longer exists, which also
/// stops the thread.
pub(crate) fn spawn<F>(interval: Duration, sweep: F) -> SweeperHandle
where
    F: Fn() -> bool + Send + 'static,
{
    let (shutdown, ticks) = mpsc::channel::<()>();

    thread::spawn(move || {
        loop {
            match ticks.recv_timeout(interval) {
                // No shutdown signal within the interval: time to sweep.
                Err(RecvTimeoutError::Timeout) => {
                    if !sweep() {
                        break;
                    }
                }
                // Handle dropped (or anything sent): stop.
                Err(RecvTimeoutError::Disconnected) | Ok(()) => break,
            }
        }
    });

    SweeperHandle {
        _shutdown: shutdown,
    }
}
