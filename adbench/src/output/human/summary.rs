use std::fmt::Write as _;

use adbench_core::RunSummary;

use super::format::{format_bytes, format_pct, format_rate};

pub(crate) fn render(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("summary\n");
    writeln!(out, "  target: {}", summary.target).ok();
    writeln!(out, "  concurrency: {}", summary.concurrency).ok();
    writeln!(out, "  elapsed: {:.2}s", summary.elapsed.as_secs_f64()).ok();
    writeln!(out, "  requests: {}", summary.requests_total).ok();
    writeln!(
        out,
        "  successful: {} ({})",
        summary.successful_requests,
        format_pct(summary.success_pct)
    )
    .ok();
    let breakdown = summary
        .failures_by_kind()
        .iter()
        .map(|(kind, n)| format!("{kind} {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "  failed: {} ({breakdown})", summary.failed_requests).ok();
    writeln!(out, "  rps: {}", format_rate(summary.rps)).ok();

    match &summary.latency {
        Some(l) => {
            writeln!(
                out,
                "  latency: avg={:.2}us min={}us max={}us",
                l.avg_us, l.min_us, l.max_us
            )
            .ok();
        }
        None => out.push_str("  latency: n/a\n"),
    }

    writeln!(out, "  received: {}", format_bytes(summary.bytes_received)).ok();
    writeln!(out, "  memory: {:.2} MB", summary.memory_mb()).ok();
    writeln!(
        out,
        "  tasks: max={} current={}",
        summary.max_concurrent_tasks, summary.tasks_at_report
    )
    .ok();
    writeln!(
        out,
        "  connections: established={} time_wait={} close_wait={}",
        summary.connections.established,
        summary.connections.time_wait,
        summary.connections.close_wait
    )
    .ok();

    out
}

/// Side-by-side table, one column per labelled run.
pub(crate) fn render_comparison(runs: &[(&str, RunSummary)]) -> String {
    let mut out = String::new();

    write!(out, "{:<20}", "metric").ok();
    for (name, _) in runs {
        write!(out, " | {name:>12}").ok();
    }
    out.push('\n');
    out.push_str(&"-".repeat(20));
    for _ in runs {
        out.push_str("-+-------------");
    }
    out.push('\n');

    let rows: [(&str, fn(&RunSummary) -> String); 5] = [
        ("rps", |s| format_rate(s.rps)),
        ("success_pct", |s| format_pct(s.success_pct)),
        ("avg_latency_us", |s| {
            s.latency
                .map_or_else(|| "-".to_string(), |l| format!("{:.2}", l.avg_us))
        }),
        ("memory_mb", |s| format!("{:.2}", s.memory_mb())),
        ("max_tasks", |s| s.max_concurrent_tasks.to_string()),
    ];

    for (metric, cell) in rows {
        write!(out, "{metric:<20}").ok();
        for (_, summary) in runs {
            write!(out, " | {:>12}", cell(summary)).ok();
        }
        out.push('\n');
    }

    out
}
