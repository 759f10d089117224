//! TEAM_431: Process lifecycle core.
//!
//! Process control blocks, the global pid registry, and the fork / exit /
//! waitpid / getpid primitives built on them. Memory management and
//! scheduling are reached through the traits in [`platform`].
//!
//! One thread per process. Each operation receives the calling process's
//! PCB explicitly.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod pcb;
pub mod platform;
pub mod registry;
pub mod status;
pub mod syscall;

/// Process ID type alias
pub type Pid = usize;

pub use config::ProcConfig;
pub use error::{ContextError, MmError, ProcError};
pub use lifecycle::{ProcessManager, ProcessRef};
pub use pcb::{ChildState, Process};
pub use platform::{AddressSpace, ForkedEntry, Platform, ResumeFrame};
pub use registry::Registry;
pub use status::{Termination, WaitStatus};
pub use syscall::{SyscallResult, into_raw};
