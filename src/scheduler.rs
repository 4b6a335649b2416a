//! Periodic self-check poller.
//!
//! Runs a [`PollRoutine`] on its own thread at a fixed interval until the
//! routine reports [`PollState::Idle`].  The relay driver reports idle once
//! it has been deinitialised, so the usual lifecycle is:
//!
//! ```text
//!   driver.init(..)
//!   Poller::spawn(driver.clone(), interval) ──▶ ┌────────────────────┐
//!   ...                                         │ loop {             │
//!   driver.request_close(..)                    │   poll() ─▶ Active │
//!   ...                                         │   sleep(interval)  │
//!   driver.deinit()                             │ } until Idle       │
//!   poller.join() ◀──────────────────────────── └────────────────────┘
//! ```
//!
//! The first poll happens immediately.  The poller does not start the
//! routine: spawning against an uninitialised driver exits after one poll.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{PollRoutine, PollState};

/// Name given to the polling thread.
pub const THREAD_NAME: &str = "relay-poller";

// ═══════════════════════════════════════════════════════════════
//  Poller
// ═══════════════════════════════════════════════════════════════

/// Handle to a running poll loop.
pub struct Poller {
    handle: JoinHandle<u64>,
}

impl Poller {
    /// Start polling `routine` every `interval` on a named thread.
    pub fn spawn<R>(routine: Arc<R>, interval: Duration) -> io::Result<Self>
    where
        R: PollRoutine + Send + Sync + 'static,
    {
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run(&*routine, interval))?;

        info!("poller: started, interval {} ms", interval.as_millis());
        Ok(Self { handle })
    }

    /// Whether the poll loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the routine to go idle.  Returns the number of polls made.
    pub fn join(self) -> u64 {
        match self.handle.join() {
            Ok(polls) => polls,
            Err(_) => {
                warn!("poller: thread panicked");
                0
            }
        }
    }
}

/// Poll until idle.  Returns the number of polls made.
fn run(routine: &dyn PollRoutine, interval: Duration) -> u64 {
    let mut polls = 0u64;
    loop {
        polls += 1;
        match routine.poll() {
            PollState::Active => thread::sleep(interval),
            PollState::Idle => break,
        }
    }
    debug!("poller: routine idle after {} polls", polls);
    info!("poller: stopped");
    polls
}
