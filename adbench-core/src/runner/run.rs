use std::sync::Arc;
use std::time::Instant;

use adbench_http::{ClientOptions, HttpClient, Target};

use super::aggregate::ResultAggregate;
use super::config::{MONITOR_INTERVAL, RunConfig};
use super::error::Result;
use super::monitor::{MonitorContext, monitor};
use super::probe::{ConnectionProbe, platform_probe};
use super::progress::ProgressFn;
use super::report::RunSummary;
use super::sampler::alive_tasks;
use super::signal::StopSignal;
use super::worker::{WorkerContext, request_worker};

/// Runs one timed load test with the host platform's connection probe.
pub async fn run_load(cfg: RunConfig, progress: Option<ProgressFn>) -> Result<RunSummary> {
    run_load_with_probe(cfg, platform_probe(), progress).await
}

pub async fn run_load_with_probe(
    cfg: RunConfig,
    probe: Arc<dyn ConnectionProbe>,
    progress: Option<ProgressFn>,
) -> Result<RunSummary> {
    cfg.validate()?;

    // Nothing is spawned until the client can be built for the target.
    let target = Arc::new(Target::parse(&cfg.url)?);
    let client = Arc::new(HttpClient::new(ClientOptions {
        connect_timeout: cfg.connect_timeout,
        request_timeout: cfg.request_timeout,
        pool_max_idle_per_host: usize::try_from(cfg.concurrency).unwrap_or(usize::MAX),
        ..ClientOptions::default()
    }));

    let aggregate = Arc::new(ResultAggregate::new());
    let stop = Arc::new(StopSignal::new());

    aggregate.observe_tasks(alive_tasks());

    tracing::info!(
        url = %target,
        concurrency = cfg.concurrency,
        duration = ?cfg.duration,
        delay = ?cfg.delay,
        "run starting"
    );

    let started = Instant::now();

    let mut workers = Vec::with_capacity(usize::try_from(cfg.concurrency).unwrap_or(0));
    for worker_id in 1..=cfg.concurrency {
        let ctx = WorkerContext {
            worker_id,
            client: client.clone(),
            target: target.clone(),
            aggregate: aggregate.clone(),
            stop: stop.clone(),
            delay: cfg.delay,
        };
        workers.push(tokio::spawn(request_worker(ctx)));
    }

    let monitor_handle = tokio::spawn(monitor(MonitorContext {
        aggregate: aggregate.clone(),
        stop: stop.clone(),
        probe,
        started,
        duration: cfg.duration,
        interval: MONITOR_INTERVAL,
        progress,
    }));

    tokio::time::sleep(cfg.duration).await;

    // The task count can peak right at shutdown.
    aggregate.observe_tasks(alive_tasks());
    stop.stop();

    for h in workers {
        h.await?;
    }
    monitor_handle.await?;

    let elapsed = started.elapsed();
    let snapshot = aggregate.snapshot();

    tracing::info!(
        requests_total = snapshot.total_requests,
        failed_requests = snapshot.failed_requests,
        elapsed = ?elapsed,
        "run finished"
    );

    Ok(RunSummary::from_snapshot(
        target.as_str(),
        cfg.concurrency,
        &snapshot,
        elapsed,
        alive_tasks(),
    ))
}
