use clap::{Args, Parser, Subcommand};
use std::time::Duration;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 10s, 250ms, 1m)".to_string());
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!(
            "invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"
        ));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"))?;

    match unit_str.trim() {
        "" | "s" | "sec" | "secs" => Ok(Duration::from_secs(value)),
        "ms" | "msec" | "msecs" => Ok(Duration::from_millis(value)),
        "us" | "µs" | "usec" | "usecs" => Ok(Duration::from_micros(value)),
        "m" | "min" | "mins" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large")),
        "h" | "hr" | "hrs" => value
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large")),
        _ => Err(format!(
            "invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"
        )),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "adbench",
    author,
    version,
    about = "Concurrent HTTP load generator for redirect services",
    long_about = "adbench drives a fixed pool of concurrent workers against an HTTP endpoint for a fixed duration and reports throughput, latency and resource usage.\n\nResponses with status 200 or 302 count as successful; redirects are never followed.",
    after_help = "Examples:\n  adbench run --url 'http://127.0.0.1:8080/ad?id=ad1' -c 200 -d 30s\n  adbench compare --framework both -c 1000 -d 10s\n  adbench compare --framework fiber --fiber-port 9000 --delay 0ms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a single URL
    Run(RunArgs),

    /// Load the fiber and/or hertz service in turn and compare the results
    Compare(CompareArgs),
}

/// Knobs shared by every run.
#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Number of concurrent request workers
    #[arg(
        short = 'c',
        long,
        env = "ADBENCH_CONCURRENCY",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub concurrency: u64,

    /// Test duration (e.g. 10s, 250ms, 1m)
    #[arg(
        short = 'd',
        long,
        env = "ADBENCH_DURATION",
        default_value = "10s",
        value_parser = parse_duration
    )]
    pub duration: Duration,

    /// Pause between consecutive requests of one worker
    #[arg(long, env = "ADBENCH_DELAY", default_value = "100ms", value_parser = parse_duration)]
    pub delay: Duration,

    /// Per-request timeout
    #[arg(long, env = "ADBENCH_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target URL (http or https), requested with GET
    #[arg(long, env = "ADBENCH_URL")]
    pub url: String,

    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Framework {
    Fiber,
    Hertz,
    Both,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Host both services listen on
    #[arg(long, env = "ADBENCH_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Which service(s) to load
    #[arg(long, value_enum, default_value_t = Framework::Both)]
    pub framework: Framework,

    #[arg(long, env = "ADBENCH_FIBER_PORT", default_value_t = 8080)]
    pub fiber_port: u16,

    #[arg(long, env = "ADBENCH_HERTZ_PORT", default_value_t = 8081)]
    pub hertz_port: u16,

    /// Ad id passed as `?id=` on every request
    #[arg(long, env = "ADBENCH_AD_ID", default_value = "ad1")]
    pub ad_id: String,

    #[command(flatten)]
    pub load: LoadArgs,
}

impl CompareArgs {
    /// `(name, url)` for each selected service, fiber first.
    pub fn targets(&self) -> Vec<(&'static str, String)> {
        let fiber = ("fiber", self.url_for(self.fiber_port));
        let hertz = ("hertz", self.url_for(self.hertz_port));
        match self.framework {
            Framework::Fiber => vec![fiber],
            Framework::Hertz => vec![hertz],
            Framework::Both => vec![fiber, hertz],
        }
    }

    fn url_for(&self, port: u16) -> String {
        format!("http://{}:{port}/ad?id={}", self.host, self.ad_id)
    }
}
