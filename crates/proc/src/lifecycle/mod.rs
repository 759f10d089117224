//! TEAM_431: Process lifecycle manager.
//!
//! Ties the registry, the PCBs and the platform together. Every operation
//! takes the calling process explicitly; there is no ambient "current
//! process" in this crate.

extern crate alloc;

use alloc::sync::Arc;
use core::fmt;

use crate::Pid;
use crate::config::ProcConfig;
use crate::error::ProcError;
use crate::pcb::Process;
use crate::platform::Platform;
use crate::registry::Registry;

mod exit;
mod fork;
mod wait;

/// Shorthand for the PCB type a platform's processes use.
pub type ProcessRef<P> = Arc<Process<<P as Platform>::Space>>;

/// Owns the process registry and drives create, fork, exit and wait.
pub struct ProcessManager<P: Platform> {
    platform: P,
    registry: Registry<P::Space>,
    config: ProcConfig,
}

impl<P: Platform> ProcessManager<P> {
    pub fn new(platform: P, config: ProcConfig) -> Self {
        log::debug!(
            "[PROC] process manager up, pids {}..={}",
            config.pid_min(),
            config.pid_max()
        );
        Self {
            platform,
            registry: Registry::new(&config),
            config,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn registry(&self) -> &Registry<P::Space> {
        &self.registry
    }

    pub fn config(&self) -> &ProcConfig {
        &self.config
    }

    /// Create a process directly (no parent), e.g. the first user program.
    ///
    /// The calling context adopts the new process: it is expected to go on
    /// to enter user mode in it.
    pub fn create_process(&self, name: &str, space: P::Space) -> Result<ProcessRef<P>, ProcError> {
        let process = self
            .registry
            .register(|pid| Process::new(pid, name, None, Some(space)))?;
        process.attach_context();
        log::debug!("[PROC] created '{}' pid={}", name, process.pid());
        Ok(process)
    }

    pub fn lookup(&self, pid: Pid) -> Option<ProcessRef<P>> {
        self.registry.lookup(pid)
    }

    pub fn getpid(&self, current: &Process<P::Space>) -> Pid {
        current.pid()
    }

    /// Parent pid, or 0 once the parent is gone (or never existed).
    pub fn getppid(&self, current: &Process<P::Space>) -> Pid {
        current.parent().unwrap_or(0)
    }
}

/// A broken kernel invariant. Not reported to user space.
#[cold]
#[track_caller]
#[allow(clippy::panic)]
pub(crate) fn kernel_bug(args: fmt::Arguments<'_>) -> ! {
    log::error!("[PROC] kernel bug: {}", args);
    panic!("kernel bug: {}", args)
}
