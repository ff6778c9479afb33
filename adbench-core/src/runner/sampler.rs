use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// Samples the resident memory of the current process.
pub struct ProcessSampler {
    sys: System,
    pid: Option<Pid>,
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSampler {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing());
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                tracing::debug!(error = err, "process memory sampling unavailable");
                None
            }
        };

        Self {
            sys: System::new_with_specifics(refresh),
            pid,
        }
    }

    /// Resident set size in bytes; zero when the platform cannot report it.
    pub fn memory_bytes(&mut self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.sys.process(pid).map_or(0, |p| p.memory())
    }
}

/// Tasks currently alive on the ambient tokio runtime; zero outside a runtime.
pub fn alive_tasks() -> u64 {
    tokio::runtime::Handle::try_current()
        .map(|h| h.metrics().num_alive_tasks() as u64)
        .unwrap_or(0)
}
