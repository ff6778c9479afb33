use std::sync::Arc;
use std::time::{Duration, Instant};

use adbench_http::{HttpClient, HttpResponse, HttpTransportErrorKind, Target};

use super::aggregate::{FailureKind, Outcome, ResultAggregate};
use super::signal::StopSignal;

/// Statuses counted as a successful attempt. Redirects are not followed.
pub const SUCCESS_STATUSES: [u16; 2] = [200, 302];

pub(crate) struct WorkerContext {
    pub worker_id: u64,
    pub client: Arc<HttpClient>,
    pub target: Arc<Target>,
    pub aggregate: Arc<ResultAggregate>,
    pub stop: Arc<StopSignal>,
    pub delay: Duration,
}

pub fn classify(res: &adbench_http::Result<HttpResponse>) -> Outcome {
    match res {
        Ok(res) if SUCCESS_STATUSES.contains(&res.status) => Outcome::Success,
        Ok(_) => Outcome::Failure(FailureKind::Status),
        Err(err) => match err.transport_error_kind() {
            HttpTransportErrorKind::Timeout => Outcome::Failure(FailureKind::Timeout),
            _ => Outcome::Failure(FailureKind::Transport),
        },
    }
}

pub(crate) async fn request_worker(ctx: WorkerContext) {
    // An in-flight request always completes (bounded by the client timeout); the stop signal is
    // only consulted between requests.
    while !ctx.stop.is_stopped() {
        let started = Instant::now();
        let res = ctx.client.get(&ctx.target).await;
        let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &res {
            Ok(res) => ctx.aggregate.record_bytes_received(res.body_len),
            Err(err) => {
                tracing::trace!(worker = ctx.worker_id, error = %err, "request failed");
            }
        }
        ctx.aggregate.record(classify(&res), latency_us);

        if !ctx.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(ctx.delay) => {}
                _ = ctx.stop.wait() => break,
            }
        }
    }
}
