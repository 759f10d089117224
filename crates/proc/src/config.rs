//! TEAM_431: Tunables for the process subsystem.

use crate::Pid;
use crate::error::ProcError;

/// Lowest pid handed out. Pid 0 is the value fork returns in the child and
/// never names a process.
pub const PID_MIN: Pid = 1;
/// Highest pid handed out.
pub const PID_MAX: Pid = 32767;

/// Process subsystem configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcConfig {
    pid_min: Pid,
    pid_max: Pid,
}

impl ProcConfig {
    /// Validate a pid range. `min` must be non-zero and not above `max`.
    pub const fn new(pid_min: Pid, pid_max: Pid) -> Result<Self, ProcError> {
        if pid_min == 0 || pid_min > pid_max {
            return Err(ProcError::InvalidArgument);
        }
        Ok(Self { pid_min, pid_max })
    }

    pub const fn pid_min(&self) -> Pid {
        self.pid_min
    }

    pub const fn pid_max(&self) -> Pid {
        self.pid_max
    }

    /// Number of processes that can be live at once.
    pub const fn max_processes(&self) -> usize {
        self.pid_max - self.pid_min + 1
    }
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            pid_min: PID_MIN,
            pid_max: PID_MAX,
        }
    }
}
