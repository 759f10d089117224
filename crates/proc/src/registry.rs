//! TEAM_188: Process table for parent-child tracking and waitpid.
//! TEAM_431: Rebuilt around pid allocation; child bookkeeping moved into the
//! PCBs themselves.
//!
//! The registry maps every live pid to its PCB. A pid stays allocated until
//! `release`, which callers only issue once no parent entry refers to it.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use los_utils::{HashMap, IdAllocator, Mutex};

use crate::Pid;
use crate::config::ProcConfig;
use crate::error::ProcError;
use crate::pcb::Process;

struct RegistryInner<S> {
    ids: IdAllocator,
    table: HashMap<Pid, Arc<Process<S>>>,
}

/// Global pid → PCB table.
pub struct Registry<S> {
    inner: Mutex<RegistryInner<S>>,
}

impl<S> Registry<S> {
    pub fn new(config: &ProcConfig) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                ids: IdAllocator::new(config.pid_min(), config.pid_max()),
                table: HashMap::new(),
            }),
        }
    }

    /// Allocate a pid, build the PCB for it with `build` and insert it.
    ///
    /// # Returns
    /// * `Ok(pcb)` - The registered PCB
    /// * `Err(ResourceExhausted)` - Every pid in range is live
    pub fn register(
        &self,
        build: impl FnOnce(Pid) -> Process<S>,
    ) -> Result<Arc<Process<S>>, ProcError> {
        let mut inner = self.inner.lock();
        let pid = inner.ids.alloc().ok_or(ProcError::ResourceExhausted)?;
        let process = Arc::new(build(pid));
        inner.table.insert(pid, Arc::clone(&process));
        Ok(process)
    }

    pub fn lookup(&self, pid: Pid) -> Option<Arc<Process<S>>> {
        self.inner.lock().table.get(&pid).cloned()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.inner.lock().table.contains_key(&pid)
    }

    /// Remove `pid` and make it allocatable again.
    ///
    /// The PCB is handed back so the last reference is dropped after the
    /// registry lock is released.
    pub fn release(&self, pid: Pid) -> Option<Arc<Process<S>>> {
        let mut inner = self.inner.lock();
        let process = inner.table.remove(&pid)?;
        inner.ids.free(pid);
        Some(process)
    }

    /// Number of live pids.
    pub fn len(&self) -> usize {
        self.inner.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live pids in ascending order.
    pub fn pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.inner.lock().table.keys().copied().collect();
        pids.sort_unstable();
        pids
    }
}
