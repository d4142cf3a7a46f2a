//! # Subscription Registry
//!
//! Live readiness-check subscriptions keyed by (task, check name). Each
//! subscription is the forwarding task that relays one check's result stream
//! into the tracker queue, represented by a cancellation token plus the
//! forwarding task's join handle.

use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{ReadinessError, Result};
use crate::logging::log_subscription_operation;
use crate::models::SubscriptionKey;

/// Cancelable handle to one open check stream
///
/// Dropping the handle cancels the stream.
#[derive(Debug)]
pub struct SubscriptionHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            token,
            task: Some(task),
        }
    }

    /// Signal cancellation and hand back the completion marker
    pub fn release(mut self) -> Option<JoinHandle<()>> {
        self.token.cancel();
        self.task.take()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<SubscriptionKey, SubscriptionHandle>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open subscription
    ///
    /// Keys are unique per task and check name. Adding an existing key is an
    /// invariant violation: the registered handle stays in place and the new
    /// handle is released.
    pub fn add(&mut self, key: SubscriptionKey, handle: SubscriptionHandle) -> Result<()> {
        if self.subscriptions.contains_key(&key) {
            error!(
                task_id = %key.task_id,
                check_name = %key.check_name,
                "Subscription already registered for key, releasing the new one"
            );
            drop(handle.release());
            return Err(ReadinessError::DuplicateSubscription {
                task_id: key.task_id,
                check_name: key.check_name,
            });
        }

        log_subscription_operation(
            "add",
            Some(&key.task_id),
            Some(&key.check_name),
            self.subscriptions.len() + 1,
        );
        self.subscriptions.insert(key, handle);
        Ok(())
    }

    /// Release and forget the subscription under `key`; returns whether one was open
    pub fn remove(&mut self, key: &SubscriptionKey) -> bool {
        let Some(handle) = self.subscriptions.remove(key) else {
            return false;
        };
        // The forwarding task finishes on its own once cancelled
        drop(handle.release());
        log_subscription_operation(
            "remove",
            Some(&key.task_id),
            Some(&key.check_name),
            self.subscriptions.len(),
        );
        true
    }

    /// Release every open subscription, waiting up to `timeout` for each
    /// forwarding task to finish and aborting those that do not
    ///
    /// Returns how many subscriptions were released. Calling it again on the
    /// emptied registry releases nothing.
    pub async fn remove_all(&mut self, timeout: Duration) -> usize {
        let released: Vec<(SubscriptionKey, Option<JoinHandle<()>>)> = self
            .subscriptions
            .drain()
            .map(|(key, handle)| (key, handle.release()))
            .collect();
        let count = released.len();

        for (key, task) in released {
            let Some(mut task) = task else { continue };
            if tokio::time::timeout(timeout, &mut task).await.is_err() {
                warn!(
                    task_id = %key.task_id,
                    check_name = %key.check_name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Check stream did not finish after release, aborting"
                );
                task.abort();
            }
        }

        log_subscription_operation("remove_all", None, None, count);
        count
    }

    pub fn contains(&self, key: &SubscriptionKey) -> bool {
        self.subscriptions.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SubscriptionKey> {
        self.subscriptions.keys()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
