//! Process lifecycle syscalls.
//!
//! TEAM_073: Core process syscalls (exit, getpid).
//! TEAM_188: Waitpid implementation.
//! TEAM_421: Returns SyscallResult, no scattered casts.
//! TEAM_431: fork, and wiring onto `ProcessManager`.

use crate::Pid;
use crate::error::ProcError;
use crate::lifecycle::{ProcessManager, ProcessRef};
use crate::pcb::Process;
use crate::platform::Platform;

/// Syscall return: value on success, error mapped to -errno on the way out.
pub type SyscallResult = Result<i64, ProcError>;

/// Fold a result into the raw value placed in the return register.
pub fn into_raw(result: SyscallResult) -> i64 {
    match result {
        Ok(value) => value,
        Err(e) => e.errno(),
    }
}

impl<P: Platform> ProcessManager<P> {
    /// sys_exit - Terminate the process.
    pub fn sys_exit(&self, current: ProcessRef<P>, code: i32) -> ! {
        #[cfg(feature = "verbose-syscalls")]
        log::trace!("[SYSCALL] exit({})", code);
        self.exit(current, code)
    }

    /// sys_getpid - Get process ID.
    pub fn sys_getpid(&self, current: &Process<P::Space>) -> SyscallResult {
        Ok(self.getpid(current) as i64)
    }

    /// sys_getppid - Get parent process ID.
    pub fn sys_getppid(&self, current: &Process<P::Space>) -> SyscallResult {
        Ok(self.getppid(current) as i64)
    }

    /// sys_fork - Duplicate the calling process.
    ///
    /// `frame` is the caller's trap frame. The parent gets the child pid;
    /// the child resumes from a copy of `frame` with 0.
    pub fn sys_fork(&self, current: &ProcessRef<P>, frame: &P::Frame) -> SyscallResult {
        #[cfg(feature = "verbose-syscalls")]
        log::trace!("[SYSCALL] fork() from pid {}", current.pid());
        self.fork(current, frame).map(|pid| pid as i64)
    }

    /// sys_waitpid - Wait for a child process to exit.
    ///
    /// Non-positive pids never name a child of the caller and fail with
    /// ESRCH once `options` has been validated.
    pub fn sys_waitpid(
        &self,
        current: &Process<P::Space>,
        pid: i32,
        status_ptr: usize,
        options: i32,
    ) -> SyscallResult {
        #[cfg(feature = "verbose-syscalls")]
        log::trace!("[SYSCALL] waitpid({}, 0x{:x}, {})", pid, status_ptr, options);
        // Pid 0 is never allocated, so it cannot match a child.
        let target = Pid::try_from(pid).unwrap_or(0);
        self.wait(current, target, status_ptr, options)
            .map(|pid| pid as i64)
    }
}
