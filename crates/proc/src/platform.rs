//! TEAM_431: Seams to the memory manager and the scheduler.
//!
//! The lifecycle core never touches page tables or register state directly.
//! It consumes the operations below, which the kernel implements for its
//! architecture (and the tests implement with host threads).

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::task::Waker;

use crate::error::{ContextError, MmError};
use crate::pcb::Process;

/// A process's memory mappings.
pub trait AddressSpace: Send + Sized + 'static {
    /// Deep copy. Later writes through either copy must not be visible
    /// through the other.
    fn duplicate(&self) -> Result<Self, MmError>;

    /// Install this space on the current CPU.
    fn activate(&self);

    /// Stop using this space on the current CPU (flush TLB etc).
    fn deactivate(&self);

    /// Copy `bytes` to user address `dst` in this space.
    fn copy_out(&self, dst: usize, bytes: &[u8]) -> Result<(), MmError>;

    /// Tear down the mappings. May sleep.
    fn destroy(self) {
        drop(self);
    }
}

/// Saved user register state a context resumes from.
pub trait ResumeFrame: Clone + Send + 'static {
    /// Arrange for the interrupted syscall to return `value` successfully
    /// when this frame is resumed.
    fn set_return(&mut self, value: usize);
}

/// Scheduler operations the lifecycle core needs.
pub trait Platform: Send + Sync + Sized + 'static {
    type Space: AddressSpace;
    type Frame: ResumeFrame;

    /// Create and schedule a new execution context that runs
    /// [`ForkedEntry::enter`]. On error `entry` is dropped unrun.
    fn spawn_context(&self, name: &str, entry: ForkedEntry<Self>) -> Result<(), ContextError>;

    /// Drop to user mode in `process` with the given register state.
    fn enter_user(&self, process: &Arc<Process<Self::Space>>, frame: Self::Frame) -> !;

    /// Terminate the calling execution context.
    fn exit_context(&self) -> !;

    /// Handle that makes the calling context runnable again.
    ///
    /// Waking must not block: it is called with a PCB lock held. A wake
    /// delivered before the context blocks makes its next
    /// [`Platform::block_current`] return at once.
    fn current_waker(&self) -> Waker;

    /// Sleep until woken through a waker from [`Platform::current_waker`].
    /// May return spuriously; callers re-check their condition.
    fn block_current(&self);
}

/// Everything a freshly forked context needs to start running its process.
///
/// Owns the heap copy of the parent's frame; it is freed as soon as the
/// frame has been moved onto the new context's stack.
pub struct ForkedEntry<P: Platform> {
    process: Arc<Process<P::Space>>,
    frame: Box<P::Frame>,
}

impl<P: Platform> ForkedEntry<P> {
    pub(crate) fn new(process: Arc<Process<P::Space>>, frame: Box<P::Frame>) -> Self {
        Self { process, frame }
    }

    /// The process the new context belongs to.
    pub fn process(&self) -> &Arc<Process<P::Space>> {
        &self.process
    }

    /// Entry point of the forked context: install the duplicated frame and
    /// return to user mode as if fork returned 0.
    pub fn enter(self, platform: &P) -> ! {
        let Self { process, frame } = self;
        let mut frame = *frame;
        frame.set_return(0);

        process.activate_space();
        log::trace!("[FORK] child {} entering user mode", process.pid());

        platform.enter_user(&process, frame)
    }
}
