//! Aggregate figures derived on demand from recorded metrics.
//!
//! Only completed metrics (those with a duration) contribute to durations and
//! rates. Every figure is zero when nothing matches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metric::{Metric, MetricKind, MetricStatus};

/// Per-name statistics over completed metrics.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricStats {
    pub count: usize,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub success_count: usize,
    pub error_count: usize,
    pub total_duration: f64,
}

impl MetricStats {
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a Metric>) -> Self {
        let mut stats = MetricStats::default();

        for (metric, duration) in completed(metrics) {
            if stats.count == 0 {
                stats.min_duration = duration;
                stats.max_duration = duration;
            } else {
                stats.min_duration = stats.min_duration.min(duration);
                stats.max_duration = stats.max_duration.max(duration);
            }
            stats.count += 1;
            stats.total_duration += duration;
            match metric.status {
                MetricStatus::Success => stats.success_count += 1,
                MetricStatus::Error => stats.error_count += 1,
                MetricStatus::Pending => {}
            }
        }

        stats.avg_duration = average(stats.total_duration, stats.count);
        stats
    }
}

/// Cross-kind aggregates over the whole history.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_api_calls: usize,
    pub total_database_queries: usize,
    pub total_network_calls: usize,
    #[serde(default)]
    pub total_custom_metrics: usize,
    pub average_api_time: f64,
    pub average_database_time: f64,
    /// Percentage of completed metrics that succeeded.
    pub success_rate: f64,
}

impl OverallStats {
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a Metric>) -> Self {
        let mut stats = OverallStats::default();
        let mut api = DurationSum::default();
        let mut database = DurationSum::default();
        let mut finished = 0usize;
        let mut succeeded = 0usize;

        for metric in metrics {
            match metric.kind {
                MetricKind::Api => stats.total_api_calls += 1,
                MetricKind::Database => stats.total_database_queries += 1,
                MetricKind::Network => stats.total_network_calls += 1,
                MetricKind::Custom => stats.total_custom_metrics += 1,
            }

            let Some(duration) = metric.duration else {
                continue;
            };
            finished += 1;
            if metric.status == MetricStatus::Success {
                succeeded += 1;
            }
            match metric.kind {
                MetricKind::Api => api.add(duration),
                MetricKind::Database => database.add(duration),
                _ => {}
            }
        }

        stats.average_api_time = api.average();
        stats.average_database_time = database.average();
        stats.success_rate = percentage(succeeded, finished);
        stats
    }
}

/// Dashboard summary over completed metrics.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_calls: usize,
    pub avg_response_time: f64,
    pub slowest_call: Option<Metric>,
    pub fastest_call: Option<Metric>,
    /// Percentage of completed metrics that failed.
    pub error_rate: f64,
    pub calls_by_type: BTreeMap<MetricKind, usize>,
}

impl Summary {
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a Metric>) -> Self {
        let mut summary = Summary::default();
        let mut total_duration = 0.0;
        let mut errors = 0usize;
        let mut slowest: Option<(&Metric, f64)> = None;
        let mut fastest: Option<(&Metric, f64)> = None;

        for (metric, duration) in completed(metrics) {
            summary.total_calls += 1;
            total_duration += duration;
            if metric.status == MetricStatus::Error {
                errors += 1;
            }
            *summary.calls_by_type.entry(metric.kind).or_default() += 1;

            // Strict comparisons keep the earliest metric on ties.
            if slowest.map_or(true, |(_, max)| duration > max) {
                slowest = Some((metric, duration));
            }
            if fastest.map_or(true, |(_, min)| duration < min) {
                fastest = Some((metric, duration));
            }
        }

        summary.avg_response_time = average(total_duration, summary.total_calls);
        summary.error_rate = percentage(errors, summary.total_calls);
        summary.slowest_call = slowest.map(|(metric, _)| metric.clone());
        summary.fastest_call = fastest.map(|(metric, _)| metric.clone());
        summary
    }
}

#[derive(Default)]
struct DurationSum {
    total: f64,
    count: usize,
}

impl DurationSum {
    fn add(&mut self, duration: f64) {
        self.total += duration;
        self.count += 1;
    }

    fn average(&self) -> f64 {
        average(self.total, self.count)
    }
}

fn completed<'a>(
    metrics: impl IntoIterator<Item = &'a Metric>,
) -> impl Iterator<Item = (&'a Metric, f64)> {
    metrics
        .into_iter()
        .filter_map(|metric| metric.duration.map(|duration| (metric, duration)))
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Completion, MetricId};

    fn completed_metric(name: &str, kind: MetricKind, duration: f64, ok: bool) -> Metric {
        let mut metric = Metric::pending(MetricId::generate(), name.to_string(), kind, 0.0, None);
        let completion = if ok {
            Completion::success()
        } else {
            Completion::error("failed")
        };
        metric.complete(duration, completion);
        metric
    }

    fn pending_metric(name: &str, kind: MetricKind) -> Metric {
        Metric::pending(MetricId::generate(), name.to_string(), kind, 0.0, None)
    }

    #[test]
    fn metric_stats_are_zero_without_completed_entries() {
        let history = vec![pending_metric("X", MetricKind::Api)];
        assert_eq!(MetricStats::from_metrics(&history), MetricStats::default());
        assert_eq!(MetricStats::from_metrics(&Vec::new()), MetricStats::default());
    }

    #[test]
    fn metric_stats_aggregate_completed_entries_only() {
        let history = vec![
            completed_metric("X", MetricKind::Api, 10.0, true),
            pending_metric("X", MetricKind::Api),
            completed_metric("X", MetricKind::Api, 30.0, false),
            completed_metric("X", MetricKind::Api, 20.0, true),
        ];

        let stats = MetricStats::from_metrics(&history);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.success_count + stats.error_count, stats.count);
        assert_eq!(stats.total_duration, 60.0);
        assert_eq!(stats.avg_duration, 20.0);
        assert_eq!(stats.min_duration, 10.0);
        assert_eq!(stats.max_duration, 30.0);
    }

    #[test]
    fn overall_stats_split_by_kind() {
        let history = vec![
            completed_metric("a", MetricKind::Api, 10.0, true),
            completed_metric("b", MetricKind::Api, 30.0, false),
            completed_metric("q", MetricKind::Database, 5.0, true),
            pending_metric("n", MetricKind::Network),
            completed_metric("c", MetricKind::Custom, 1.0, true),
        ];

        let stats = OverallStats::from_metrics(&history);
        assert_eq!(stats.total_api_calls, 2);
        assert_eq!(stats.total_database_queries, 1);
        assert_eq!(stats.total_network_calls, 1);
        assert_eq!(stats.total_custom_metrics, 1);
        assert_eq!(stats.average_api_time, 20.0);
        assert_eq!(stats.average_database_time, 5.0);
        assert_eq!(stats.success_rate, 75.0);
    }

    #[test]
    fn overall_stats_success_rate_is_zero_when_nothing_completed() {
        let history = vec![pending_metric("n", MetricKind::Network)];
        let stats = OverallStats::from_metrics(&history);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_api_time, 0.0);
    }

    #[test]
    fn summary_picks_extremes_and_rates() {
        let history = vec![
            completed_metric("fast", MetricKind::Api, 2.0, true),
            completed_metric("slow", MetricKind::Database, 50.0, false),
            completed_metric("mid", MetricKind::Api, 8.0, true),
            pending_metric("open", MetricKind::Network),
        ];

        let summary = Summary::from_metrics(&history);
        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.avg_response_time, 20.0);
        assert_eq!(summary.slowest_call.unwrap().name, "slow");
        assert_eq!(summary.fastest_call.unwrap().name, "fast");
        assert!((summary.error_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.calls_by_type.get(&MetricKind::Api), Some(&2));
        assert_eq!(summary.calls_by_type.get(&MetricKind::Database), Some(&1));
        assert_eq!(summary.calls_by_type.get(&MetricKind::Network), None);
    }

    #[test]
    fn summary_of_empty_history_has_no_extremes() {
        let summary = Summary::from_metrics(&Vec::new());
        assert_eq!(summary.total_calls, 0);
        assert!(summary.slowest_call.is_none());
        assert!(summary.fastest_call.is_none());
        assert_eq!(summary.error_rate, 0.0);
    }

    #[test]
    fn summary_ties_keep_the_earliest_metric() {
        let history = vec![
            completed_metric("first", MetricKind::Api, 5.0, true),
            completed_metric("second", MetricKind::Api, 5.0, true),
        ];

        let summary = Summary::from_metrics(&history);
        assert_eq!(summary.slowest_call.unwrap().name, "first");
        assert_eq!(summary.fastest_call.unwrap().name, "first");
    }
}
