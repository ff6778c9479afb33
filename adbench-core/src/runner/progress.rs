use std::sync::Arc;
use std::time::Duration;

use super::probe::ConnectionStates;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Monotonic tick counter (1-based).
    pub tick: u64,
    pub elapsed: Duration,
    /// Configured run duration.
    pub duration: Duration,

    pub requests_total: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,

    /// `requests_total / elapsed` since run start.
    pub rps: f64,

    pub connections: ConnectionStates,
    pub memory_bytes: u64,
    pub alive_tasks: u64,
}

impl ProgressUpdate {
    pub fn success_pct(&self) -> Option<f64> {
        (self.requests_total > 0)
            .then(|| (self.successful_requests as f64) / (self.requests_total as f64) * 100.0)
    }
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
