//! Host platform for lifecycle tests.
//!
//! Execution contexts are OS threads. "Entering user mode" records the pid
//! and the fork return value the frame carries, then ends the thread.
//! Terminating a context unwinds the thread with a `ContextExit` payload.

#![allow(dead_code)]

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::task::{Wake, Waker};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use los_proc::{
    AddressSpace, ContextError, ForkedEntry, MmError, Platform, Pid, Process, ProcConfig,
    ProcessManager, ResumeFrame,
};

/// Payload a terminated context unwinds with.
pub struct ContextExit;

/// Shared knobs and counters for every `MockSpace` of one test.
#[derive(Default)]
pub struct MemCtl {
    pub fail_next_copy: AtomicBool,
    pub live: AtomicUsize,
    pub destroyed: AtomicUsize,
}

pub struct MockSpace {
    memory: Mutex<Vec<u8>>,
    ctl: Arc<MemCtl>,
}

impl MockSpace {
    pub fn new(ctl: &Arc<MemCtl>, size: usize) -> Self {
        Self::from_bytes(ctl, vec![0; size])
    }

    fn from_bytes(ctl: &Arc<MemCtl>, bytes: Vec<u8>) -> Self {
        ctl.live.fetch_add(1, Ordering::SeqCst);
        Self {
            memory: Mutex::new(bytes),
            ctl: Arc::clone(ctl),
        }
    }

    pub fn write(&self, addr: usize, bytes: &[u8]) {
        self.memory.lock().unwrap()[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub fn read(&self, addr: usize, len: usize) -> Vec<u8> {
        self.memory.lock().unwrap()[addr..addr + len].to_vec()
    }

    pub fn read_i32(&self, addr: usize) -> i32 {
        let bytes = self.read(addr, 4);
        i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Drop for MockSpace {
    fn drop(&mut self) {
        self.ctl.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AddressSpace for MockSpace {
    fn duplicate(&self) -> Result<Self, MmError> {
        if self.ctl.fail_next_copy.swap(false, Ordering::SeqCst) {
            return Err(MmError::OutOfMemory);
        }
        let bytes = self.memory.lock().unwrap().clone();
        Ok(Self::from_bytes(&self.ctl, bytes))
    }

    fn activate(&self) {}

    fn deactivate(&self) {}

    fn copy_out(&self, dst: usize, bytes: &[u8]) -> Result<(), MmError> {
        let mut memory = self.memory.lock().unwrap();
        let end = dst.checked_add(bytes.len()).ok_or(MmError::BadAddress)?;
        let target = memory.get_mut(dst..end).ok_or(MmError::BadAddress)?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    fn destroy(self) {
        self.ctl.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Trap frame stand-in: the syscall return register plus a marker so tests
/// can tell which frame a child resumed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFrame {
    pub ret: usize,
    pub marker: u32,
}

impl MockFrame {
    pub fn new(marker: u32) -> Self {
        Self {
            ret: usize::MAX,
            marker,
        }
    }
}

impl ResumeFrame for MockFrame {
    fn set_return(&mut self, value: usize) {
        self.ret = value;
    }
}

#[derive(Default)]
pub struct MockState {
    pub fail_next_spawn: AtomicBool,
    /// (pid, fork return value, frame marker) per child that reached user mode
    pub entered: Mutex<Vec<(Pid, usize, u32)>>,
    pub spawned: AtomicUsize,
    /// Times a context parked in `block_current`.
    pub blocks: AtomicUsize,
    pub wakes: AtomicUsize,
}

/// Wakes a parked host thread.
struct ThreadWaker {
    thread: Thread,
    state: Arc<MockState>,
}

impl Wake for ThreadWaker {
    fn wake(self: Arc<Self>) {
        self.state.wakes.fetch_add(1, Ordering::SeqCst);
        self.thread.unpark();
    }
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    pub state: Arc<MockState>,
}

impl Platform for MockPlatform {
    type Space = MockSpace;
    type Frame = MockFrame;

    fn spawn_context(&self, name: &str, entry: ForkedEntry<Self>) -> Result<(), ContextError> {
        if self.state.fail_next_spawn.swap(false, Ordering::SeqCst) {
            return Err(ContextError::OutOfMemory);
        }
        let platform = self.clone();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    entry.enter(&platform);
                }));
            })
            .map_err(|_| ContextError::OutOfMemory)?;
        self.state.spawned.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn enter_user(&self, process: &Arc<Process<MockSpace>>, frame: MockFrame) -> ! {
        self.state
            .entered
            .lock()
            .unwrap()
            .push((process.pid(), frame.ret, frame.marker));
        panic::resume_unwind(Box::new(ContextExit))
    }

    fn exit_context(&self) -> ! {
        panic::resume_unwind(Box::new(ContextExit))
    }

    fn current_waker(&self) -> Waker {
        Waker::from(Arc::new(ThreadWaker {
            thread: thread::current(),
            state: Arc::clone(&self.state),
        }))
    }

    fn block_current(&self) {
        self.state.blocks.fetch_add(1, Ordering::SeqCst);
        thread::park();
    }
}

pub type Manager = ProcessManager<MockPlatform>;
pub type Proc = Arc<Process<MockSpace>>;

pub struct Harness {
    pub mgr: Arc<Manager>,
    pub platform: MockPlatform,
    pub mem: Arc<MemCtl>,
    pub init: Proc,
}

pub const SPACE_SIZE: usize = 256;

static LOGGER: Once = Once::new();

fn stderr_writer(args: std::fmt::Arguments<'_>) {
    eprintln!("{args}");
}

/// Manager with one bootstrap process ("init", pid 1).
pub fn boot() -> Harness {
    boot_with(ProcConfig::default())
}

pub fn boot_with(config: ProcConfig) -> Harness {
    LOGGER.call_once(|| {
        let _ = los_utils::logger::init(log::LevelFilter::Debug, stderr_writer, true);
    });
    let platform = MockPlatform::default();
    let mem = Arc::new(MemCtl::default());
    let mgr = Arc::new(ProcessManager::new(platform.clone(), config));
    let init = mgr
        .create_process("init", MockSpace::new(&mem, SPACE_SIZE))
        .unwrap();
    Harness {
        mgr,
        platform,
        mem,
        init,
    }
}

/// Run `exit` on its own context and wait for that context to end.
pub fn exit_in_context(mgr: &Arc<Manager>, process: Proc, code: i32) {
    let mgr = Arc::clone(mgr);
    let outcome = thread::spawn(move || {
        mgr.exit(process, code);
    })
    .join();
    let payload = outcome.err().expect("exit returned");
    assert!(payload.is::<ContextExit>(), "context died with a real panic");
}

/// Wait until the forked child `pid` has resumed in user mode and return
/// its (fork return value, frame marker).
pub fn wait_entered(platform: &MockPlatform, pid: Pid) -> (usize, u32) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(&(_, ret, marker)) = platform
            .state
            .entered
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _, _)| *p == pid)
        {
            return (ret, marker);
        }
        assert!(Instant::now() < deadline, "child {pid} never ran");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Fork `parent` and return the child's PCB.
pub fn fork_child(h: &Harness, parent: &Proc) -> Proc {
    let pid = h.mgr.fork(parent, &MockFrame::new(0)).unwrap();
    h.mgr.lookup(pid).unwrap()
}
