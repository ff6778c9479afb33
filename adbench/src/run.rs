use adbench_core::{RunConfig, RunSummary};

use crate::cli::{CompareArgs, LoadArgs, RunArgs};
use crate::output::HumanReadableOutput;
use crate::run_error::RunError;

pub async fn run(args: RunArgs) -> Result<(), RunError> {
    let out = HumanReadableOutput::new();
    execute(&out, "run", run_config(args.url, &args.load)).await?;
    Ok(())
}

/// Loads each selected service in turn; the table is printed only when more than one ran.
pub async fn compare(args: CompareArgs) -> Result<(), RunError> {
    let out = HumanReadableOutput::new();

    let mut runs = Vec::new();
    for (name, url) in args.targets() {
        tracing::debug!(framework = name, url = %url, "comparing");
        let summary = execute(&out, name, run_config(url, &args.load)).await?;
        runs.push((name, summary));
    }

    if runs.len() > 1 {
        out.print_comparison(&runs);
    }

    Ok(())
}

fn run_config(url: String, load: &LoadArgs) -> RunConfig {
    RunConfig::new(url, load.concurrency, load.duration)
        .with_delay(load.delay)
        .with_request_timeout(load.timeout)
}

async fn execute(
    out: &HumanReadableOutput,
    label: &str,
    cfg: RunConfig,
) -> Result<RunSummary, RunError> {
    out.print_header(label, &cfg);
    let summary = adbench_core::run_load(cfg, Some(out.progress(label))).await?;
    out.print_summary(&summary);
    Ok(summary)
}
