use std::sync::atomic::{AtomicU64, Ordering};

use super::probe::ConnectionStates;

/// Why a single attempt was counted as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// The exchange completed but the status is not in the success allowlist.
    Status,
    Timeout,
    /// Connect, protocol or body read errors.
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureKind),
}

/// Cumulative counters, latency extrema and sampled gauges for one run.
///
/// Every field is an individual atomic: workers and the monitor update it concurrently without a
/// lock. Reads during the run are per-field; a consistent view only exists once every worker has
/// been joined (see [`ResultAggregate::snapshot`]).
#[derive(Debug)]
pub struct ResultAggregate {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,

    failed_status: AtomicU64,
    failed_timeout: AtomicU64,
    failed_transport: AtomicU64,

    total_latency_us: AtomicU64,
    min_latency_us: AtomicU64,
    max_latency_us: AtomicU64,

    bytes_received: AtomicU64,

    connection_established: AtomicU64,
    connection_time_wait: AtomicU64,
    connection_close_wait: AtomicU64,
    memory_bytes: AtomicU64,
    max_concurrent_tasks: AtomicU64,
}

impl Default for ResultAggregate {
    fn default() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            failed_status: AtomicU64::new(0),
            failed_timeout: AtomicU64::new(0),
            failed_transport: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            min_latency_us: AtomicU64::new(u64::MAX),
            max_latency_us: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            connection_established: AtomicU64::new(0),
            connection_time_wait: AtomicU64::new(0),
            connection_close_wait: AtomicU64::new(0),
            memory_bytes: AtomicU64::new(0),
            max_concurrent_tasks: AtomicU64::new(0),
        }
    }
}

impl ResultAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome, latency_us: u64) {
        match outcome {
            Outcome::Success => self.record_success(latency_us),
            Outcome::Failure(kind) => self.record_failure(kind),
        }
    }

    pub fn record_success(&self, latency_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        update_min(&self.min_latency_us, latency_us);
        update_max(&self.max_latency_us, latency_us);
    }

    pub fn record_failure(&self, kind: FailureKind) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);

        let by_kind = match kind {
            FailureKind::Status => &self.failed_status,
            FailureKind::Timeout => &self.failed_timeout,
            FailureKind::Transport => &self.failed_transport,
        };
        by_kind.fetch_add(1, Ordering::Relaxed);
    }

    /// Response body bytes drained, whatever the outcome.
    pub fn record_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn observe_tasks(&self, alive: u64) {
        update_max(&self.max_concurrent_tasks, alive);
    }

    pub fn store_memory(&self, bytes: u64) {
        self.memory_bytes.store(bytes, Ordering::Relaxed);
    }

    pub fn store_connections(&self, states: ConnectionStates) {
        self.connection_established
            .store(states.established, Ordering::Relaxed);
        self.connection_time_wait
            .store(states.time_wait, Ordering::Relaxed);
        self.connection_close_wait
            .store(states.close_wait, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    pub fn max_concurrent_tasks(&self) -> u64 {
        self.max_concurrent_tasks.load(Ordering::Relaxed)
    }

    /// Reads every field. Only consistent after all writers have stopped.
    pub fn snapshot(&self) -> AggregateSnapshot {
        AggregateSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            failed_status: self.failed_status.load(Ordering::Relaxed),
            failed_timeout: self.failed_timeout.load(Ordering::Relaxed),
            failed_transport: self.failed_transport.load(Ordering::Relaxed),
            total_latency_us: self.total_latency_us.load(Ordering::Relaxed),
            min_latency_us: self.min_latency_us.load(Ordering::Relaxed),
            max_latency_us: self.max_latency_us.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            connections: ConnectionStates {
                established: self.connection_established.load(Ordering::Relaxed),
                time_wait: self.connection_time_wait.load(Ordering::Relaxed),
                close_wait: self.connection_close_wait.load(Ordering::Relaxed),
            },
            memory_bytes: self.memory_bytes.load(Ordering::Relaxed),
            max_concurrent_tasks: self.max_concurrent_tasks.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub failed_status: u64,
    pub failed_timeout: u64,
    pub failed_transport: u64,
    pub total_latency_us: u64,
    /// `u64::MAX` until the first successful request.
    pub min_latency_us: u64,
    pub max_latency_us: u64,
    pub bytes_received: u64,
    pub connections: ConnectionStates,
    pub memory_bytes: u64,
    pub max_concurrent_tasks: u64,
}

impl AggregateSnapshot {
    /// `(min, max)` latency in microseconds, if anything succeeded.
    pub fn latency_extrema_us(&self) -> Option<(u64, u64)> {
        (self.successful_requests > 0).then_some((self.min_latency_us, self.max_latency_us))
    }
}

pub(crate) fn update_max(cur: &AtomicU64, candidate: u64) {
    let mut existing = cur.load(Ordering::Relaxed);
    while candidate > existing {
        match cur.compare_exchange_weak(existing, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(observed) => existing = observed,
        }
    }
}

pub(crate) fn update_min(cur: &AtomicU64, candidate: u64) {
    let mut existing = cur.load(Ordering::Relaxed);
    while candidate < existing {
        match cur.compare_exchange_weak(existing, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(observed) => existing = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fresh_aggregate_has_no_extrema() {
        let agg = ResultAggregate::new();
        let snap = agg.snapshot();
        assert_eq!(snap.min_latency_us, u64::MAX);
        assert_eq!(snap.max_latency_us, 0);
        assert_eq!(snap.latency_extrema_us(), None);
    }

    #[test]
    fn success_and_failure_keep_totals_balanced() {
        let agg = ResultAggregate::new();
        agg.record(Outcome::Success, 120);
        agg.record(Outcome::Success, 80);
        agg.record(Outcome::Failure(FailureKind::Status), 5);
        agg.record(Outcome::Failure(FailureKind::Timeout), 30_000_000);
        agg.record(Outcome::Failure(FailureKind::Transport), 7);

        let snap = agg.snapshot();
        assert_eq!(snap.total_requests, 5);
        assert_eq!(snap.successful_requests, 2);
        assert_eq!(snap.failed_requests, 3);
        assert_eq!(
            snap.failed_status + snap.failed_timeout + snap.failed_transport,
            snap.failed_requests
        );
        // Failed latencies never reach the latency fields.
        assert_eq!(snap.total_latency_us, 200);
        assert_eq!(snap.latency_extrema_us(), Some((80, 120)));
    }

    #[test]
    fn failure_kinds_render_snake_case() {
        assert_eq!(FailureKind::Status.to_string(), "status");
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
        assert_eq!(FailureKind::Transport.to_string(), "transport");
    }

    #[test]
    fn received_bytes_accumulate() {
        let agg = ResultAggregate::new();
        agg.record_bytes_received(2);
        agg.record_bytes_received(0);
        agg.record_bytes_received(40);
        assert_eq!(agg.snapshot().bytes_received, 42);
    }

    #[test]
    fn gauges_are_overwritten_not_accumulated() {
        let agg = ResultAggregate::new();
        agg.store_memory(10);
        agg.store_memory(4);
        agg.store_connections(ConnectionStates {
            established: 9,
            time_wait: 3,
            close_wait: 1,
        });
        agg.store_connections(ConnectionStates {
            established: 2,
            time_wait: 0,
            close_wait: 0,
        });

        let snap = agg.snapshot();
        assert_eq!(snap.memory_bytes, 4);
        assert_eq!(
            snap.connections,
            ConnectionStates {
                established: 2,
                time_wait: 0,
                close_wait: 0,
            }
        );
    }

    #[test]
    fn max_tasks_only_grows() {
        let agg = ResultAggregate::new();
        agg.observe_tasks(5);
        agg.observe_tasks(50);
        agg.observe_tasks(7);
        assert_eq!(agg.max_concurrent_tasks(), 50);
    }

    #[test]
    fn concurrent_extrema_are_true_min_and_max() {
        let agg = Arc::new(ResultAggregate::new());
        let threads = 8u64;
        let per_thread = 10_000u64;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let agg = agg.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        // Spread values so every thread races on both extrema.
                        let latency = 10 + ((i * threads + t) * 7919) % 1_000_000;
                        agg.record_success(latency);
                        agg.observe_tasks(latency);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut expected_min = u64::MAX;
        let mut expected_max = 0;
        let mut expected_sum = 0;
        for t in 0..threads {
            for i in 0..per_thread {
                let latency = 10 + ((i * threads + t) * 7919) % 1_000_000;
                expected_min = expected_min.min(latency);
                expected_max = expected_max.max(latency);
                expected_sum += latency;
            }
        }

        let snap = agg.snapshot();
        assert_eq!(snap.total_requests, threads * per_thread);
        assert_eq!(snap.successful_requests, threads * per_thread);
        assert_eq!(snap.total_latency_us, expected_sum);
        assert_eq!(snap.min_latency_us, expected_min);
        assert_eq!(snap.max_latency_us, expected_max);
        assert_eq!(snap.max_concurrent_tasks, expected_max);
    }
}
