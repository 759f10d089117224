//! TEAM_431: Error types for the process lifecycle core.

use linux_raw_sys::errno::{EAGAIN, EFAULT, EINVAL, ENOMEM, ESRCH};
use los_error::define_kernel_error;

define_kernel_error! {
    /// Failures reported by an address-space implementation.
    pub enum MmError(0x09) {
        /// No frames left to back a copy
        OutOfMemory = 0x01, ENOMEM => "Out of physical memory",
        /// User address not mapped or not writable
        BadAddress = 0x02, EFAULT => "Bad user address",
    }
}

define_kernel_error! {
    /// Failures reported by the scheduler when creating a context.
    pub enum ContextError(0x0B) {
        /// Kernel stack or scheduler slot could not be allocated
        OutOfMemory = 0x01, ENOMEM => "Context allocation failed",
    }
}

define_kernel_error! {
    /// Errors surfaced by fork, waitpid and registry operations.
    pub enum ProcError(0x0A) {
        /// Bad options word or configuration
        InvalidArgument = 0x01, EINVAL => "Invalid argument",
        /// Target is not a child of the caller
        NoSuchProcess = 0x02, ESRCH => "No such child process",
        /// Every pid in the configured range is live
        ResourceExhausted = 0x03, EAGAIN => "Process id space exhausted",
        /// Address space could not be duplicated
        NoMemory(MmError) = 0x04, ENOMEM => "Address space duplication failed",
        /// The child's execution context could not be scheduled
        NoContext(ContextError) = 0x05, ENOMEM => "Context creation failed",
        /// Status destination not writable
        Fault(MmError) = 0x06, EFAULT => "Status delivery failed",
    }
}
