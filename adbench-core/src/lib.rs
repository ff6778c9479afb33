pub mod runner;

pub use adbench_http::{
    ClientOptions, Error as HttpError, HttpClient, HttpResponse, HttpTransportErrorKind, Target,
};
pub use runner::{
    AggregateSnapshot, ConnectionProbe, ConnectionStates, Error, FailureKind, LatencySummary,
    NetstatProbe, ProgressFn, ProgressUpdate, Result, ResultAggregate, RunConfig, RunSummary,
    SsProbe, StopSignal, platform_probe, run_load, run_load_with_probe,
};
