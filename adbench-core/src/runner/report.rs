use std::time::Duration;

use super::aggregate::{AggregateSnapshot, FailureKind};
use super::probe::ConnectionStates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_us: u64,
    pub avg_us: f64,
    pub max_us: u64,
}

/// Derived end-of-run metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub target: String,
    pub concurrency: u64,
    /// Wall-clock time from run start until every worker was joined.
    pub elapsed: Duration,

    pub requests_total: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub failed_status: u64,
    pub failed_timeout: u64,
    pub failed_transport: u64,

    /// `None` when nothing was sent.
    pub success_pct: Option<f64>,
    pub rps: f64,
    /// `None` when nothing succeeded.
    pub latency: Option<LatencySummary>,
    /// Response body bytes drained over the whole run.
    pub bytes_received: u64,

    pub memory_bytes: u64,
    pub max_concurrent_tasks: u64,
    /// Tasks alive when the summary was built.
    pub tasks_at_report: u64,
    pub connections: ConnectionStates,
}

impl RunSummary {
    pub fn from_snapshot(
        target: &str,
        concurrency: u64,
        snapshot: &AggregateSnapshot,
        elapsed: Duration,
        tasks_at_report: u64,
    ) -> Self {
        let secs = elapsed.as_secs_f64().max(1e-9);

        let success_pct = (snapshot.total_requests > 0).then(|| {
            (snapshot.successful_requests as f64) / (snapshot.total_requests as f64) * 100.0
        });

        let latency = snapshot
            .latency_extrema_us()
            .map(|(min_us, max_us)| LatencySummary {
                min_us,
                avg_us: (snapshot.total_latency_us as f64)
                    / (snapshot.successful_requests as f64),
                max_us,
            });

        Self {
            target: target.to_string(),
            concurrency,
            elapsed,
            requests_total: snapshot.total_requests,
            successful_requests: snapshot.successful_requests,
            failed_requests: snapshot.failed_requests,
            failed_status: snapshot.failed_status,
            failed_timeout: snapshot.failed_timeout,
            failed_transport: snapshot.failed_transport,
            success_pct,
            rps: (snapshot.total_requests as f64) / secs,
            latency,
            bytes_received: snapshot.bytes_received,
            memory_bytes: snapshot.memory_bytes,
            max_concurrent_tasks: snapshot.max_concurrent_tasks,
            tasks_at_report,
            connections: snapshot.connections,
        }
    }

    /// Failed attempts split by cause, in a fixed order.
    pub fn failures_by_kind(&self) -> [(FailureKind, u64); 3] {
        [
            (FailureKind::Status, self.failed_status),
            (FailureKind::Timeout, self.failed_timeout),
            (FailureKind::Transport, self.failed_transport),
        ]
    }

    pub fn memory_mb(&self) -> f64 {
        (self.memory_bytes as f64) / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::aggregate::{FailureKind, ResultAggregate};

    #[test]
    fn derives_rates_and_average_latency() {
        let agg = ResultAggregate::new();
        agg.record_success(100);
        agg.record_success(300);
        agg.record_failure(FailureKind::Status);
        agg.record_failure(FailureKind::Transport);
        agg.store_memory(3 * 1024 * 1024);

        let summary = RunSummary::from_snapshot(
            "http://127.0.0.1/ad?id=ad1",
            2,
            &agg.snapshot(),
            Duration::from_secs(2),
            1,
        );

        assert_eq!(summary.requests_total, 4);
        assert_eq!(summary.success_pct, Some(50.0));
        assert_eq!(summary.rps, 2.0);
        assert_eq!(
            summary.latency,
            Some(LatencySummary {
                min_us: 100,
                avg_us: 200.0,
                max_us: 300,
            })
        );
        assert_eq!(summary.memory_mb(), 3.0);
        assert_eq!(
            summary.failures_by_kind(),
            [
                (FailureKind::Status, 1),
                (FailureKind::Timeout, 0),
                (FailureKind::Transport, 1),
            ]
        );
    }

    #[test]
    fn empty_run_has_no_rates_to_divide() {
        let summary = RunSummary::from_snapshot(
            "http://127.0.0.1/",
            1,
            &ResultAggregate::new().snapshot(),
            Duration::from_secs(1),
            0,
        );

        assert_eq!(summary.success_pct, None);
        assert_eq!(summary.latency, None);
        assert_eq!(summary.rps, 0.0);
    }

    #[test]
    fn all_failures_omit_latency() {
        let agg = ResultAggregate::new();
        for _ in 0..10 {
            agg.record_failure(FailureKind::Status);
        }

        let summary = RunSummary::from_snapshot(
            "http://127.0.0.1/fail",
            1,
            &agg.snapshot(),
            Duration::from_secs(1),
            0,
        );

        assert_eq!(summary.success_pct, Some(0.0));
        assert_eq!(summary.failed_status, 10);
        assert_eq!(summary.latency, None);
    }

    #[test]
    fn zero_elapsed_does_not_divide_by_zero() {
        let agg = ResultAggregate::new();
        agg.record_success(1);
        let summary =
            RunSummary::from_snapshot("http://127.0.0.1/", 1, &agg.snapshot(), Duration::ZERO, 0);
        assert!(summary.rps.is_finite());
    }
}
