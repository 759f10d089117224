//! TEAM_431: Exit.
//!
//! Teardown order:
//! 1. detach and destroy the address space, so nothing can re-activate a
//!    half-destroyed space if destruction sleeps,
//! 2. detach the execution context,
//! 3. record the exit and publish it on the parent's entry, or reclaim the
//!    PCB when no parent is interested,
//! 4. terminate the context.
//!
//! No PCB lock is held across step 4.

use crate::Pid;
use crate::pcb::{ChildState, Process};
use crate::platform::{AddressSpace, Platform};

use super::{ProcessManager, ProcessRef, kernel_bug};

impl<P: Platform> ProcessManager<P> {
    /// Terminate `current` with `code`. Does not return.
    ///
    /// Takes the caller's reference so it is released before the context
    /// goes away.
    pub fn exit(&self, current: ProcessRef<P>, code: i32) -> ! {
        self.retire(&current, code);
        drop(current);
        self.platform.exit_context()
    }

    /// Everything exit does short of terminating the context.
    fn retire(&self, current: &Process<P::Space>, code: i32) {
        let pid = current.pid();
        log::trace!("[EXIT] pid {} exit({})", pid, code);

        let Some(space) = current.take_space() else {
            kernel_bug(format_args!("pid {pid} exiting without an address space"))
        };
        space.deactivate();
        space.destroy();

        if !current.detach_context() {
            kernel_bug(format_args!("pid {pid} exiting without a context"));
        }
        // A second exit already failed on the missing address space.
        let first = current.record_exit(code);
        debug_assert!(first);

        self.abandon_children(current);

        let published = current
            .parent()
            .and_then(|ppid| self.registry.lookup(ppid))
            .is_some_and(|parent| parent.mark_child_exited(pid, code));

        if published {
            log::trace!("[EXIT] pid {} waiting to be reaped", pid);
        } else {
            // Nobody will ever wait for us.
            drop(self.registry.release(pid));
            log::trace!("[EXIT] pid {} reclaimed", pid);
        }
    }

    /// Give up interest in every child. Children that already exited are
    /// reclaimed now; running ones lose their parent link and reclaim
    /// themselves when they exit.
    fn abandon_children(&self, current: &Process<P::Space>) {
        let children = current.drain_children();
        for entry in children {
            let child_pid: Pid = entry.process.pid();
            match entry.state {
                ChildState::Exited(_) => {
                    drop(self.registry.release(child_pid));
                    log::trace!("[EXIT] pid {} reclaimed orphan zombie {}", current.pid(), child_pid);
                }
                ChildState::Running => entry.process.clear_parent(),
            }
        }
    }
}
