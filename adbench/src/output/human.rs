use std::sync::Arc;

mod format;
mod progress;
mod summary;

use adbench_core::{ProgressFn, ProgressUpdate, RunConfig, RunSummary};
use format::{format_bytes, format_duration_single, format_pct, format_rate};
use progress::HumanProgress;
use summary::{render, render_comparison};

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }

    pub(crate) fn print_header(&self, label: &str, cfg: &RunConfig) {
        println!("{label}: {}", cfg.url);
        println!(
            "concurrency={} duration={} delay={} timeout={}",
            cfg.concurrency,
            humantime::format_duration(cfg.duration),
            humantime::format_duration(cfg.delay),
            humantime::format_duration(cfg.request_timeout)
        );
        println!();
    }

    pub(crate) fn progress(&self, label: &str) -> ProgressFn {
        let progress = self.progress.clone();
        let label = label.to_string();

        Arc::new(move |u: ProgressUpdate| {
            progress.update(&label, u.duration, u.elapsed, progress_message(&u));
        })
    }

    pub(crate) fn print_summary(&self, summary: &RunSummary) {
        self.progress.finish();
        print!("{}", render(summary));
        println!();
    }

    pub(crate) fn print_comparison(&self, runs: &[(&str, RunSummary)]) {
        self.progress.finish();
        println!("comparison");
        print!("{}", render_comparison(runs));
    }
}

fn progress_message(u: &ProgressUpdate) -> String {
    format!(
        "elapsed={} requests={} success={} rps={} estab={} time_wait={} close_wait={} tasks={} mem={}",
        format_duration_single(u.elapsed),
        u.requests_total,
        format_pct(u.success_pct()),
        format_rate(u.rps),
        u.connections.established,
        u.connections.time_wait,
        u.connections.close_wait,
        u.alive_tasks,
        format_bytes(u.memory_bytes)
    )
}
