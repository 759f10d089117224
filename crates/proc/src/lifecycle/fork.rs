//! TEAM_431: Fork.
//!
//! Order matters:
//! 1. register the child and publish its entry in the parent,
//! 2. duplicate the address space (may sleep, no PCB lock held),
//! 3. hand a heap copy of the caller's frame to a new context.
//!
//! The child is therefore visible in the parent's children before it can run
//! and before fork returns. Any failure after step 1 is unwound completely.

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::Pid;
use crate::error::{MmError, ProcError};
use crate::pcb::Process;
use crate::platform::{AddressSpace, ForkedEntry, Platform};

use super::{ProcessManager, ProcessRef, kernel_bug};

impl<P: Platform> ProcessManager<P> {
    /// Duplicate `current`. Returns the child's pid; the child itself
    /// resumes from `frame` with a result of 0.
    ///
    /// # Returns
    /// * `Ok(pid)` - Child is registered, linked and scheduled
    /// * `Err(ResourceExhausted)` - No pid available
    /// * `Err(NoMemory)` - Address space could not be copied
    /// * `Err(NoContext)` - Child context could not be scheduled
    pub fn fork(&self, current: &ProcessRef<P>, frame: &P::Frame) -> Result<Pid, ProcError> {
        if !current.has_space() {
            kernel_bug(format_args!("fork from pid {} without an address space", current.pid()));
        }

        let parent_pid = current.pid();
        let child = self
            .registry
            .register(|pid| Process::new(pid, current.name(), Some(parent_pid), None))?;
        current.add_child(Arc::clone(&child));
        let child_pid = child.pid();

        let space = match current
            .lend_space(|space| space.duplicate())
            .unwrap_or(Err(MmError::BadAddress))
        {
            Ok(space) => space,
            Err(e) => {
                log::warn!("[FORK] pid {}: address space copy failed: {}", parent_pid, e);
                self.unwind_fork(current, child_pid);
                return Err(ProcError::NoMemory(e));
            }
        };
        child.install_space(space);

        // Bound before it can run, so the child may exit as soon as it is scheduled.
        child.attach_context();
        let entry = ForkedEntry::new(Arc::clone(&child), Box::new(frame.clone()));
        if let Err(e) = self.platform.spawn_context(child.name(), entry) {
            child.detach_context();
            log::warn!("[FORK] pid {}: context spawn failed: {}", parent_pid, e);
            if let Some(space) = child.take_space() {
                space.destroy();
            }
            self.unwind_fork(current, child_pid);
            return Err(ProcError::NoContext(e));
        }

        log::trace!("[FORK] pid {} -> child {}", parent_pid, child_pid);
        Ok(child_pid)
    }

    /// Undo step 1 of a failed fork: drop the parent's entry, retire the pid.
    fn unwind_fork(&self, current: &Process<P::Space>, child_pid: Pid) {
        drop(current.remove_child(child_pid));
        drop(self.registry.release(child_pid));
    }
}
