//! Fixed-interval polling with a cancellable subscription.
//!
//! A [`Subscription`] spawns one task that runs its fetch closure right away
//! and then every interval, publishing each successful value on a watch
//! channel. Failures are logged at debug level and the next tick retries.
//! Cancelling or dropping the subscription aborts the task.

use crate::api::ApiError;
use std::{future::Future, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

/// Interval between status fetches.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct Subscription<T> {
    updates: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> Subscription<T>
where
    T: Send + Sync + 'static,
{
    /// Starts polling `fetch` every `period`, first run immediately.
    pub fn start<F, Fut>(name: &'static str, period: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (tx, updates) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(value) => {
                        if tx.send(Some(value)).is_err() {
                            debug!(name, "no receivers left, stopping poll");
                            return;
                        }
                    }
                    Err(err) => debug!(name, error = %err, "poll failed"),
                }
            }
        });

        Self { updates, task }
    }

    /// Receiver for the latest successful value.
    #[must_use]
    pub fn updates(&self) -> watch::Receiver<Option<T>> {
        self.updates.clone()
    }

    /// Waits for the next successful value.
    ///
    /// Returns `None` once the polling task is gone.
    pub async fn changed(&mut self) -> Option<T>
    where
        T: Clone,
    {
        self.updates.changed().await.ok()?;
        self.updates.borrow_and_update().clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
