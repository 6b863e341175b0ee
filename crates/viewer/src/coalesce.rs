//! Time-windowed coalescing for bursty events.
//!
//! Scroll events arrive far faster than thumbnails are worth scanning for.
//! Each event pokes the window, pushing its deadline out; one waiter sleeps
//! until the deadline stops moving and then does the work once for the
//! whole burst.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

pub struct QuietWindow {
    quiet: Duration,
    deadline: Mutex<Option<Instant>>,
}

impl QuietWindow {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: Mutex::new(None) }
    }

    /// Restarts the quiet period from now.
    pub fn poke(&self) {
        *self.deadline.lock().unwrap() = Some(Instant::now() + self.quiet);
    }

    /// Completes once the window has gone unpoked for the full quiet
    /// period. Returns immediately when the window was never poked.
    pub async fn wait_quiet(&self) {
        loop {
            let deadline = {
                let mut slot = self.deadline.lock().unwrap();
                match *slot {
                    None => return,
                    Some(deadline) if Instant::now() >= deadline => {
                        *slot = None;
                        return;
                    }
                    Some(deadline) => deadline,
                }
            };
            tokio::time::sleep_until(deadline).await;
        }
    }
}
