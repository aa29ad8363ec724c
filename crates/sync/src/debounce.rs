//! Cancel-and-replace deadline
//!
//! Re-arming replaces the previous deadline; it never queues a second one.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// A single re-armable quiet-period timer
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer one quiet period from now
    pub fn arm(&mut self) -> Instant {
        let deadline = Instant::now() + self.quiet_period;
        self.deadline = Some(deadline);
        deadline
    }

    /// Cancel the timer; returns whether it was armed
    pub fn disarm(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves when the armed deadline passes; pends forever when disarmed
    ///
    /// The timer stays armed after firing. Callers disarm it once they have
    /// consumed the pending work.
    pub async fn fired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}
