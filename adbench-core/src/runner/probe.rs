use std::ffi::OsString;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Header lines printed by `ss` before the first connection row.
const SS_HEADER_LINES: usize = 1;

/// Point-in-time count of TCP connections by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStates {
    pub established: u64,
    pub time_wait: u64,
    pub close_wait: u64,
}

/// Best-effort OS connection table query.
///
/// Implementations never fail: a missing command or unparsable output yields zero for the
/// affected states. Each call is a fresh external query, so callers should not invoke it more
/// than once per monitor tick.
pub trait ConnectionProbe: Send + Sync + std::fmt::Debug {
    fn probe(&self) -> ConnectionStates;
}

/// `ss -tan state <state>`, one invocation per state.
#[derive(Debug, Clone)]
pub struct SsProbe {
    program: OsString,
}

impl Default for SsProbe {
    fn default() -> Self {
        Self::with_program("ss")
    }
}

impl SsProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn count_state(&self, state: &str) -> u64 {
        match run_captured(&self.program, &["-tan", "state", state]) {
            Some(stdout) => count_ss_rows(&stdout),
            None => 0,
        }
    }
}

impl ConnectionProbe for SsProbe {
    fn probe(&self) -> ConnectionStates {
        ConnectionStates {
            established: self.count_state("established"),
            time_wait: self.count_state("time-wait"),
            close_wait: self.count_state("close-wait"),
        }
    }
}

/// `netstat -an`, a single invocation matched line by line.
#[derive(Debug, Clone)]
pub struct NetstatProbe {
    program: OsString,
}

impl Default for NetstatProbe {
    fn default() -> Self {
        Self::with_program("netstat")
    }
}

impl NetstatProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ConnectionProbe for NetstatProbe {
    fn probe(&self) -> ConnectionStates {
        run_captured(&self.program, &["-an"])
            .map(|stdout| count_netstat_states(&stdout))
            .unwrap_or_default()
    }
}

/// The probe for the host platform.
pub fn platform_probe() -> Arc<dyn ConnectionProbe> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(SsProbe::new())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(NetstatProbe::new())
    }
}

fn run_captured(program: &OsString, args: &[&str]) -> Option<String> {
    let output = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
    {
        Ok(out) => out,
        Err(err) => {
            tracing::debug!(program = ?program, error = %err, "connection probe unavailable");
            return None;
        }
    };

    if !output.status.success() {
        tracing::debug!(program = ?program, status = %output.status, "connection probe failed");
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub(crate) fn count_ss_rows(stdout: &str) -> u64 {
    let lines = stdout.lines().filter(|l| !l.trim().is_empty()).count();
    lines.saturating_sub(SS_HEADER_LINES) as u64
}

pub(crate) fn count_netstat_states(stdout: &str) -> ConnectionStates {
    let mut states = ConnectionStates::default();
    for line in stdout.lines() {
        if line.contains("ESTABLISHED") {
            states.established += 1;
        } else if line.contains("TIME_WAIT") {
            states.time_wait += 1;
        } else if line.contains("CLOSE_WAIT") {
            states.close_wait += 1;
        }
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;

    const SS_ESTABLISHED: &str = "\
Recv-Q Send-Q  Local Address:Port    Peer Address:Port  Process
0      0           127.0.0.1:41234      127.0.0.1:8080
0      0           127.0.0.1:41236      127.0.0.1:8080
0      0           127.0.0.1:8080       127.0.0.1:41234
";

    const NETSTAT: &str = "\
Active Internet connections (including servers)
Proto Recv-Q Send-Q  Local Address          Foreign Address        (state)
tcp4       0      0  127.0.0.1.8080         127.0.0.1.50412        ESTABLISHED
tcp4       0      0  127.0.0.1.50412        127.0.0.1.8080         ESTABLISHED
tcp4       0      0  127.0.0.1.50400        127.0.0.1.8080         TIME_WAIT
tcp4       0      0  127.0.0.1.8080         127.0.0.1.50399        CLOSE_WAIT
tcp4       0      0  *.8080                 *.*                    LISTEN
";

    #[test]
    fn ss_rows_exclude_header() {
        assert_eq!(count_ss_rows(SS_ESTABLISHED), 3);
    }

    #[test]
    fn ss_header_only_or_empty_is_zero() {
        assert_eq!(
            count_ss_rows("Recv-Q Send-Q Local Address:Port Peer Address:Port\n"),
            0
        );
        assert_eq!(count_ss_rows(""), 0);
        assert_eq!(count_ss_rows("\n\n"), 0);
    }

    #[test]
    fn netstat_counts_each_state() {
        assert_eq!(
            count_netstat_states(NETSTAT),
            ConnectionStates {
                established: 2,
                time_wait: 1,
                close_wait: 1,
            }
        );
    }

    #[test]
    fn netstat_noise_is_zero() {
        assert_eq!(
            count_netstat_states("garbage\n\u{fffd}\u{fffd}\n"),
            ConnectionStates::default()
        );
    }

    #[test]
    fn missing_command_degrades_to_zero() {
        let ss = SsProbe::with_program("adbench-definitely-missing-ss");
        assert_eq!(ss.probe(), ConnectionStates::default());

        let netstat = NetstatProbe::with_program("adbench-definitely-missing-netstat");
        assert_eq!(netstat.probe(), ConnectionStates::default());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_degrades_to_zero() {
        // `false` exists on every unix host and always exits non-zero.
        let ss = SsProbe::with_program("false");
        assert_eq!(ss.probe(), ConnectionStates::default());
    }

    #[test]
    fn platform_probe_never_panics() {
        let _ = platform_probe().probe();
    }
}
