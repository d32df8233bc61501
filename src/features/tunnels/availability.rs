//! Debounced subdomain availability check.
//!
//! Every input bumps a sequence number. A check only fires after 400ms
//! without newer input, and its answer is dropped if another input arrived
//! while the request was in flight, so a slow response can never overwrite
//! a newer one.

use crate::{
    api::{ApiClient, ApiError},
    features::tunnels::{
        client,
        form::{sanitize_subdomain, MIN_SUBDOMAIN_LEN},
    },
};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

pub const DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Availability {
    #[default]
    Unknown,
    Checking,
    Available,
    Taken,
}

impl Availability {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Checking => "checking...",
            Self::Available => "available",
            Self::Taken => "already taken",
        }
    }
}

pub struct AvailabilityChecker<F> {
    check: Arc<F>,
    seq: Arc<AtomicU64>,
    state: Arc<watch::Sender<Availability>>,
    tasks: Vec<JoinHandle<()>>,
}

/// Future returned by the API-backed check.
pub type CheckFuture = Pin<Box<dyn Future<Output = Result<bool, ApiError>> + Send>>;

/// Checker wired to `GET /tunnels/check-subdomain`.
pub fn api_checker(
    api: ApiClient,
) -> AvailabilityChecker<impl Fn(String) -> CheckFuture + Send + Sync + 'static> {
    AvailabilityChecker::new(move |subdomain: String| -> CheckFuture {
        let api = api.clone();
        Box::pin(async move {
            client::check_subdomain(&api, &subdomain)
                .await
                .map(|check| check.available)
        })
    })
}

impl<F, Fut> AvailabilityChecker<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, ApiError>> + Send + 'static,
{
    pub fn new(check: F) -> Self {
        let (state, _) = watch::channel(Availability::Unknown);
        Self {
            check: Arc::new(check),
            seq: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Availability> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Availability {
        *self.state.borrow()
    }

    /// Feeds a new raw input and returns its sanitised form. Inputs shorter
    /// than two characters reset the state without scheduling a check.
    pub fn input(&mut self, raw: &str) -> String {
        let subdomain = sanitize_subdomain(raw);
        self.tasks.retain(|task| !task.is_finished());
        // Bumped under the watch lock so no older task can publish after
        // this reset.
        let mut seq = 0;
        self.state.send_modify(|current| {
            seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            *current = Availability::Unknown;
        });

        if subdomain.len() < MIN_SUBDOMAIN_LEN {
            return subdomain;
        }

        let check = Arc::clone(&self.check);
        let latest = Arc::clone(&self.seq);
        let state = Arc::clone(&self.state);
        let candidate = subdomain.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            if !publish(&state, &latest, seq, Availability::Checking) {
                return;
            }

            let next = match check(candidate).await {
                Ok(true) => Availability::Available,
                Ok(false) => Availability::Taken,
                Err(err) => {
                    debug!(error = %err, "availability check failed");
                    Availability::Unknown
                }
            };
            if !publish(&state, &latest, seq, next) {
                debug!(seq, "discarding stale availability response");
            }
        }));

        subdomain
    }

    /// Waits for every scheduled check to finish and returns the state they
    /// left behind.
    pub async fn settle(&mut self) -> Availability {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        self.current()
    }
}

/// Writes `next` only while `seq` is still the latest input. The check runs
/// under the watch lock, the same lock [`AvailabilityChecker::input`] holds
/// when it bumps the sequence.
fn publish(
    state: &watch::Sender<Availability>,
    latest: &AtomicU64,
    seq: u64,
    next: Availability,
) -> bool {
    state.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != seq {
            return false;
        }
        *current = next;
        true
    })
}

impl<F> Drop for AvailabilityChecker<F> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
