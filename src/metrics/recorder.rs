//! In-process recorder of timed operations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use super::listeners::{ListenerRegistry, MetricListener, Subscription};
use super::timer::MetricTimer;
use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::models::{
    Completion, Metadata, Metric, MetricId, MetricKind, MetricStats, MetricsExport, OverallStats,
    Summary,
};

struct Inner {
    enabled: AtomicBool,
    capacity: usize,
    measure_response_size: bool,
    /// Zero point of the monotonic clock metric times are expressed against.
    epoch: Instant,
    history: Mutex<VecDeque<Metric>>,
    listeners: ListenerRegistry,
}

/// Bounded, thread-safe history of timed operations.
///
/// Cloning is cheap and every clone shares the same history, listeners, and
/// enabled flag. Compose one per host and pass it to whatever instruments calls.
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<Inner>,
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new()
    }
}

impl Recorder {
    /// Creates an enabled recorder retaining the default 1000 metrics.
    pub fn new() -> Self {
        Recorder::with_config(&RecorderConfig::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Recorder::with_config(&RecorderConfig {
            capacity,
            ..RecorderConfig::default()
        })
    }

    pub fn with_config(config: &RecorderConfig) -> Self {
        let capacity = config.capacity.max(1);
        Recorder {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(config.enabled),
                capacity,
                measure_response_size: config.measure_response_size,
                epoch: Instant::now(),
                history: Mutex::new(VecDeque::with_capacity(capacity)),
                listeners: ListenerRegistry::default(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub(crate) fn measures_response_size(&self) -> bool {
        self.inner.measure_response_size
    }

    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.inner.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!("Metric recording {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Milliseconds elapsed on the recorder's monotonic clock.
    fn now(&self) -> f64 {
        self.inner.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn history(&self) -> MutexGuard<'_, VecDeque<Metric>> {
        // Every mutation leaves the deque consistent, so a poisoned lock is safe to reuse.
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a pending metric and returns its id.
    ///
    /// Returns the empty id without recording anything while disabled. When
    /// the history is full the oldest entry is evicted, pending or not.
    pub fn start_metric(
        &self,
        name: impl Into<String>,
        kind: MetricKind,
        metadata: Option<Metadata>,
    ) -> MetricId {
        if !self.is_enabled() {
            return MetricId::default();
        }

        let id = MetricId::generate();
        let metric = Metric::pending(id.clone(), name.into(), kind, self.now(), metadata);

        let mut history = self.history();
        while history.len() >= self.inner.capacity {
            if let Some(evicted) = history.pop_front() {
                debug!(
                    metric_id = %evicted.id,
                    metric_name = %evicted.name,
                    metric_status = ?evicted.status,
                    "Evicted oldest metric"
                );
            }
        }
        history.push_back(metric);
        id
    }

    /// Starts a metric wrapped in a guard that always completes it.
    pub fn start_timer(
        &self,
        name: impl Into<String>,
        kind: MetricKind,
        metadata: Option<Metadata>,
    ) -> MetricTimer {
        let id = self.start_metric(name, kind, metadata);
        MetricTimer::new(self.clone(), id)
    }

    /// Completes a pending metric and notifies listeners.
    ///
    /// Silently does nothing while disabled, for the empty id, for ids not in
    /// the history (never created, evicted, or cleared), and for metrics that
    /// already completed.
    pub fn end_metric(&self, id: &MetricId, completion: Completion) {
        self.complete(id, completion, true);
    }

    pub(crate) fn complete(&self, id: &MetricId, completion: Completion, notify: bool) {
        if id.is_empty() || !self.is_enabled() {
            return;
        }

        let end_time = self.now();
        let completed = {
            let mut history = self.history();
            let Some(metric) = history.iter_mut().rev().find(|m| &m.id == id) else {
                debug!(metric_id = %id, "end_metric for unknown metric ignored");
                return;
            };
            if !metric.complete(end_time, completion) {
                debug!(metric_id = %id, "end_metric for completed metric ignored");
                return;
            }
            metric.clone()
        };

        debug!(
            metric_id = %completed.id,
            metric_name = %completed.name,
            metric_kind = %completed.kind,
            metric_status = ?completed.status,
            duration_ms = completed.duration.unwrap_or_default(),
            "Metric completed"
        );

        if notify {
            self.inner.listeners.notify(&completed);
        }
    }

    /// Full history, oldest first.
    pub fn get_metrics(&self) -> Vec<Metric> {
        self.history().iter().cloned().collect()
    }

    pub fn get_metrics_by_kind(&self, kind: MetricKind) -> Vec<Metric> {
        self.history()
            .iter()
            .filter(|m| m.kind == kind)
            .cloned()
            .collect()
    }

    pub fn get_metrics_by_name(&self, name: &str) -> Vec<Metric> {
        self.history()
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect()
    }

    /// The last `count` metrics, newest first.
    pub fn get_recent_metrics(&self, count: usize) -> Vec<Metric> {
        self.history().iter().rev().take(count).cloned().collect()
    }

    pub fn get_metric_stats(&self, name: &str) -> MetricStats {
        MetricStats::from_metrics(self.history().iter().filter(|m| m.name == name))
    }

    pub fn get_overall_stats(&self) -> OverallStats {
        OverallStats::from_metrics(self.history().iter())
    }

    pub fn get_summary(&self) -> Summary {
        Summary::from_metrics(self.history().iter())
    }

    /// Drops the whole history. Listeners and the enabled flag are kept.
    pub fn clear_metrics(&self) {
        let removed = {
            let mut history = self.history();
            let removed = history.len();
            history.clear();
            removed
        };
        info!("Cleared {} recorded metrics", removed);
    }

    /// Registers a listener for metrics completed from now on.
    pub fn add_listener<L>(&self, listener: L) -> Subscription
    where
        L: MetricListener + 'static,
    {
        self.inner.listeners.register(Arc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// History and overall stats captured under one lock.
    pub fn snapshot_export(&self) -> MetricsExport {
        let history = self.history();
        let metrics = history.iter().cloned().collect();
        let stats = OverallStats::from_metrics(history.iter());
        drop(history);
        MetricsExport::new(metrics, stats)
    }

    /// Pretty-printed JSON dump; see `MetricsExport` for the schema.
    pub fn export_metrics(&self) -> Result<String, RecorderError> {
        self.snapshot_export().to_json()
    }
}
