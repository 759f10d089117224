//! TEAM_431: Process control block.
//!
//! A PCB records a process's identity, its address space, whether an
//! execution context is bound to it, its own exit state, and the entries for
//! the children it forked.
//!
//! Locking:
//! - `inner` guards `children` and the exit record. A child's entry lives in
//!   the parent's `inner`, so exit (writer) and wait (reader) of one child
//!   both serialize on the parent's lock.
//! - `space` has its own lock, held only to move the space in or out.
//!   Address-space work runs on a detached space with no lock held.
//! - The parent link is only an id. It is resolved through the registry and
//!   cleared when the parent exits first.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::Waker;

use los_utils::Mutex;

use crate::Pid;
use crate::platform::AddressSpace;

/// State of a child as seen from its parent's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    /// Exit code passed to exit.
    Exited(i32),
}

/// Parent-owned record for one forked child.
pub(crate) struct ChildEntry<S> {
    pub(crate) process: Arc<Process<S>>,
    pub(crate) state: ChildState,
    /// Parent context blocked in wait on this child.
    waiter: Option<Waker>,
}

struct ProcessInner<S> {
    /// Insertion ordered. Pids are unique so duplicates cannot occur.
    children: Vec<ChildEntry<S>>,
    /// Some once the process has exited; set at most once.
    exit_code: Option<i32>,
}

/// Process control block.
pub struct Process<S> {
    pid: Pid,
    name: String,
    parent: Mutex<Option<Pid>>,
    space: Mutex<Option<S>>,
    has_context: AtomicBool,
    inner: Mutex<ProcessInner<S>>,
}

impl<S> Process<S> {
    pub(crate) fn new(pid: Pid, name: &str, parent: Option<Pid>, space: Option<S>) -> Self {
        Self {
            pid,
            name: String::from(name),
            parent: Mutex::new(parent),
            space: Mutex::new(space),
            has_context: AtomicBool::new(false),
            inner: Mutex::new(ProcessInner {
                children: Vec::new(),
                exit_code: None,
            }),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent pid, or `None` for the bootstrap process and orphans.
    pub fn parent(&self) -> Option<Pid> {
        *self.parent.lock()
    }

    pub(crate) fn clear_parent(&self) {
        *self.parent.lock() = None;
    }

    // ------------------------------------------------------------------
    // Address space
    // ------------------------------------------------------------------

    pub fn has_space(&self) -> bool {
        self.space.lock().is_some()
    }

    /// Run `f` against the address space, if one is attached.
    pub fn with_space<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.space.lock().as_ref().map(f)
    }

    /// Run `f` against the address space with no lock held. The space is
    /// detached while `f` runs, so only the process's own context may call
    /// this.
    pub(crate) fn lend_space<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        let space = self.take_space()?;
        let result = f(&space);
        self.install_space(space);
        Some(result)
    }

    pub(crate) fn install_space(&self, space: S) {
        *self.space.lock() = Some(space);
    }

    /// Detach the address space. The caller destroys it outside the lock.
    pub(crate) fn take_space(&self) -> Option<S> {
        self.space.lock().take()
    }

    // ------------------------------------------------------------------
    // Execution context
    // ------------------------------------------------------------------

    /// True while an execution context runs on behalf of this process.
    pub fn has_context(&self) -> bool {
        self.has_context.load(Ordering::Acquire)
    }

    pub(crate) fn attach_context(&self) {
        self.has_context.store(true, Ordering::Release);
    }

    /// Returns false if no context was attached.
    pub(crate) fn detach_context(&self) -> bool {
        self.has_context.swap(false, Ordering::AcqRel)
    }

    // ------------------------------------------------------------------
    // Exit record
    // ------------------------------------------------------------------

    /// Own exit code once the process has exited.
    pub fn exit_code(&self) -> Option<i32> {
        self.inner.lock().exit_code
    }

    pub fn has_exited(&self) -> bool {
        self.exit_code().is_some()
    }

    /// Record the exit code. Returns false if one was already recorded.
    pub(crate) fn record_exit(&self, code: i32) -> bool {
        let mut inner = self.inner.lock();
        if inner.exit_code.is_some() {
            return false;
        }
        inner.exit_code = Some(code);
        true
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    pub fn child_count(&self) -> usize {
        self.inner.lock().children.len()
    }

    /// Child pids in fork order.
    pub fn child_pids(&self) -> Vec<Pid> {
        self.inner.lock().children.iter().map(|c| c.process.pid).collect()
    }

    /// State of child `pid`, or `None` if it is not a child of this process.
    pub fn child_state(&self, pid: Pid) -> Option<ChildState> {
        self.inner
            .lock()
            .children
            .iter()
            .find(|c| c.process.pid == pid)
            .map(|c| c.state)
    }

    /// Like [`Process::child_state`], but if the child is still running
    /// `waker` is registered to be woken when it exits. Checking and
    /// registering happen under one lock, so no exit can slip in between.
    pub(crate) fn poll_child(&self, pid: Pid, waker: &Waker) -> Option<ChildState> {
        let mut inner = self.inner.lock();
        let entry = inner.children.iter_mut().find(|c| c.process.pid == pid)?;
        if entry.state == ChildState::Running {
            entry.waiter = Some(waker.clone());
        }
        Some(entry.state)
    }

    pub(crate) fn add_child(&self, child: Arc<Process<S>>) {
        self.inner.lock().children.push(ChildEntry {
            process: child,
            state: ChildState::Running,
            waiter: None,
        });
    }

    pub(crate) fn remove_child(&self, pid: Pid) -> Option<ChildEntry<S>> {
        let mut inner = self.inner.lock();
        let index = inner.children.iter().position(|c| c.process.pid == pid)?;
        Some(inner.children.remove(index))
    }

    /// Record `code` on the entry for child `pid` and wake a waiter blocked
    /// on it. Returns false if this process holds no entry for it any more.
    pub(crate) fn mark_child_exited(&self, pid: Pid, code: i32) -> bool {
        let mut inner = self.inner.lock();
        match inner.children.iter_mut().find(|c| c.process.pid == pid) {
            Some(entry) => {
                entry.state = ChildState::Exited(code);
                if let Some(waiter) = entry.waiter.take() {
                    waiter.wake();
                }
                true
            }
            None => false,
        }
    }

    /// Take every child entry, leaving the collection empty.
    pub(crate) fn drain_children(&self) -> Vec<ChildEntry<S>> {
        core::mem::take(&mut self.inner.lock().children)
    }
}

impl<S: AddressSpace> Process<S> {
    /// Make this process's address space current on the running CPU.
    pub fn activate_space(&self) {
        if let Some(space) = self.space.lock().as_ref() {
            space.activate();
        }
    }
}

impl<S> core::fmt::Debug for Process<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .field("parent", &self.parent())
            .field("has_context", &self.has_context())
            .finish_non_exhaustive()
    }
}
