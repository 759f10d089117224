//! TEAM_431: Waitpid.

use crate::Pid;
use crate::error::{MmError, ProcError};
use crate::pcb::{ChildState, Process};
use crate::platform::{AddressSpace, Platform};
use crate::status::WaitStatus;

use super::ProcessManager;

impl<P: Platform> ProcessManager<P> {
    /// Wait for child `pid` of `current` to exit, store its status at user
    /// address `status_ptr` (skipped when 0) and reap it.
    ///
    /// While the child is still running the caller registers itself on the
    /// child's entry and blocks; the child's exit wakes it.
    ///
    /// # Returns
    /// * `Ok(pid)` - Child exited and has been reaped
    /// * `Err(InvalidArgument)` - `options` is not 0
    /// * `Err(NoSuchProcess)` - `pid` is not a child of `current`
    /// * `Err(Fault)` - Status could not be written; the child is not reaped
    pub fn wait(
        &self,
        current: &Process<P::Space>,
        pid: Pid,
        status_ptr: usize,
        options: i32,
    ) -> Result<Pid, ProcError> {
        if options != 0 {
            return Err(ProcError::InvalidArgument);
        }

        let waker = self.platform.current_waker();
        let code = loop {
            match current.poll_child(pid, &waker) {
                None => return Err(ProcError::NoSuchProcess),
                Some(ChildState::Exited(code)) => break code,
                Some(ChildState::Running) => {
                    log::trace!("[WAIT] pid {} blocks on {}", current.pid(), pid);
                    self.platform.block_current();
                }
            }
        };

        let status = WaitStatus::exited(code);
        if status_ptr != 0 {
            current
                .lend_space(|space| space.copy_out(status_ptr, &status.to_bytes()))
                .unwrap_or(Err(MmError::BadAddress))
                .map_err(ProcError::Fault)?;
        }

        if let Some(entry) = current.remove_child(pid) {
            drop(entry);
            drop(self.registry.release(pid));
        }
        log::trace!("[WAIT] pid {} reaped {} (code {})", current.pid(), pid, code);
        Ok(pid)
    }
}
