mod aggregate;
mod config;
mod error;
mod monitor;
mod probe;
mod progress;
mod report;
mod run;
mod sampler;
mod signal;
mod worker;

pub use aggregate::{AggregateSnapshot, FailureKind, Outcome, ResultAggregate};
pub use config::{DEFAULT_REQUEST_TIMEOUT, MONITOR_INTERVAL, RunConfig};
pub use error::{Error, Result};
pub use probe::{ConnectionProbe, ConnectionStates, NetstatProbe, SsProbe, platform_probe};
pub use progress::{ProgressFn, ProgressUpdate};
pub use report::{LatencySummary, RunSummary};
pub use run::{run_load, run_load_with_probe};
pub use sampler::{ProcessSampler, alive_tasks};
pub use signal::StopSignal;
pub use worker::{SUCCESS_STATUSES, classify};
