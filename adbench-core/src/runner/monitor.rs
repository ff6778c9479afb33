use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use super::aggregate::ResultAggregate;
use super::probe::ConnectionProbe;
use super::progress::{ProgressFn, ProgressUpdate};
use super::sampler::{ProcessSampler, alive_tasks};
use super::signal::StopSignal;

pub(crate) struct MonitorContext {
    pub aggregate: Arc<ResultAggregate>,
    pub stop: Arc<StopSignal>,
    pub probe: Arc<dyn ConnectionProbe>,
    pub started: Instant,
    pub duration: Duration,
    pub interval: Duration,
    pub progress: Option<ProgressFn>,
}

pub(crate) async fn monitor(ctx: MonitorContext) {
    let mut sampler = ProcessSampler::new();

    let mut interval =
        tokio::time::interval_at(tokio::time::Instant::now() + ctx.interval, ctx.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tick_id: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = ctx.stop.wait() => break,
            _ = interval.tick() => {}
        }

        tick_id = tick_id.saturating_add(1);

        let memory_bytes = sampler.memory_bytes();
        let tasks = alive_tasks();

        // `ss`/`netstat` block on a child process; keep them off the worker threads.
        let probe = ctx.probe.clone();
        let connections = tokio::task::spawn_blocking(move || probe.probe())
            .await
            .unwrap_or_default();

        ctx.aggregate.store_memory(memory_bytes);
        ctx.aggregate.store_connections(connections);
        ctx.aggregate.observe_tasks(tasks);

        let Some(progress) = &ctx.progress else {
            continue;
        };

        let elapsed = ctx.started.elapsed();
        let requests_total = ctx.aggregate.total_requests();
        (progress)(ProgressUpdate {
            tick: tick_id,
            elapsed,
            duration: ctx.duration,
            requests_total,
            successful_requests: ctx.aggregate.successful_requests(),
            failed_requests: ctx.aggregate.failed_requests(),
            rps: (requests_total as f64) / elapsed.as_secs_f64().max(1e-9),
            connections,
            memory_bytes,
            alive_tasks: tasks,
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::runner::probe::ConnectionStates;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Default)]
    struct CountingProbe {
        calls: AtomicU64,
    }

    impl ConnectionProbe for CountingProbe {
        fn probe(&self) -> ConnectionStates {
            let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
            ConnectionStates {
                established: n,
                time_wait: 0,
                close_wait: 0,
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn ticks_sample_gauges_and_stop_promptly() {
        let aggregate = Arc::new(ResultAggregate::new());
        let stop = Arc::new(StopSignal::new());
        let probe = Arc::new(CountingProbe::default());
        let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = updates.clone();
        let handle = tokio::spawn(monitor(MonitorContext {
            aggregate: aggregate.clone(),
            stop: stop.clone(),
            probe: probe.clone(),
            started: Instant::now(),
            duration: Duration::from_secs(1),
            interval: Duration::from_millis(50),
            progress: Some(Arc::new(move |u: ProgressUpdate| {
                sink.lock().unwrap().push(u)
            })),
        }));

        tokio::time::sleep(Duration::from_millis(280)).await;
        stop.stop();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let updates = updates.lock().unwrap();
        let calls = probe.calls.load(Ordering::Relaxed);
        assert!(calls >= 2, "calls={calls}");
        // One probe per tick, one progress line per tick.
        assert_eq!(updates.len() as u64, calls);
        for (i, u) in updates.iter().enumerate() {
            assert_eq!(u.tick, i as u64 + 1);
        }

        let snap = aggregate.snapshot();
        assert_eq!(snap.connections.established, calls);
        assert!(snap.max_concurrent_tasks >= 1);
    }
}
