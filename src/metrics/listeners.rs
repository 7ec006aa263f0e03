//! Subscriber table for completed metrics.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::warn;

use crate::models::Metric;
use crate::utils::log_throttle::LogThrottle;
use crate::utils::value::panic_message;

/// Callback notified once per completed metric.
///
/// Closures `Fn(&Metric) + Send + Sync` implement this directly.
pub trait MetricListener: Send + Sync {
    fn on_metric(&self, metric: &Metric);
}

impl<F> MetricListener for F
where
    F: Fn(&Metric) + Send + Sync,
{
    fn on_metric(&self, metric: &Metric) {
        self(metric)
    }
}

#[derive(Default)]
struct ListenerTable {
    next_handle: u64,
    // Handles increase monotonically, so key order is registration order.
    entries: BTreeMap<u64, Arc<dyn MetricListener>>,
}

type SharedTable = Arc<Mutex<ListenerTable>>;

fn lock_table(table: &Mutex<ListenerTable>) -> MutexGuard<'_, ListenerTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

fn throttle_key(handle: u64) -> String {
    format!("listener.{}", handle)
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    table: SharedTable,
    throttle: Arc<LogThrottle>,
}

impl ListenerRegistry {
    pub(crate) fn register(&self, listener: Arc<dyn MetricListener>) -> Subscription {
        let mut table = lock_table(&self.table);
        table.next_handle += 1;
        let handle = table.next_handle;
        table.entries.insert(handle, listener);

        Subscription {
            handle,
            table: Arc::downgrade(&self.table),
            throttle: Arc::downgrade(&self.throttle),
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock_table(&self.table).entries.len()
    }

    /// Invokes every listener in registration order.
    ///
    /// The table lock is not held while a listener runs, so listeners may
    /// subscribe, unsubscribe, or call back into the recorder. A panicking
    /// listener is logged and skipped.
    pub(crate) fn notify(&self, metric: &Metric) {
        let handles: Vec<u64> = lock_table(&self.table).entries.keys().copied().collect();

        for handle in handles {
            // Re-read per handle so an unsubscribe from an earlier listener takes effect.
            let Some(listener) = lock_table(&self.table).entries.get(&handle).cloned() else {
                continue;
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener.on_metric(metric))) {
                if let Some(suppressed) = self.throttle.should_emit(&throttle_key(handle)) {
                    warn!(
                        listener = handle,
                        metric_name = %metric.name,
                        metric_id = %metric.id,
                        suppressed,
                        "Metric listener panicked: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }
}

/// Handle returned by `Recorder::add_listener`.
///
/// Dropping it keeps the listener registered; call `unsubscribe` to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    handle: u64,
    table: Weak<Mutex<ListenerTable>>,
    throttle: Weak<LogThrottle>,
}

impl Subscription {
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Removes the listener and its warning window. Calling this more than
    /// once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(table) = self.table.upgrade() {
            lock_table(&table).entries.remove(&self.handle);
        }
        if let Some(throttle) = self.throttle.upgrade() {
            throttle.forget(&throttle_key(self.handle));
        }
    }
}
