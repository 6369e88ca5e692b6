use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Periodic one-second (by default) ticker feeding a single consumer.
///
/// The ticking task stops when the countdown is cancelled or dropped, so an
/// abandoned quiz never leaves a timer running.
pub struct Countdown {
    ticks: mpsc::Receiver<()>,
    task: JoinHandle<()>,
    cancelled: bool,
}

impl Countdown {
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// Spawn the ticking task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            ticks,
            task,
            cancelled: false,
        }
    }

    /// Wait for the next tick. `None` once cancelled.
    pub async fn tick(&mut self) -> Option<()> {
        if self.cancelled {
            return None;
        }
        self.ticks.recv().await
    }

    /// Stop ticking. Calling it again is a no-op.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.task.abort();
        self.ticks.close();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
