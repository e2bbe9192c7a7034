use nix::unistd::Pid;
use std::{
    fmt,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Running,
    Ready,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::New => "NEW",
            ProcessState::Running => "RUNNING",
            ProcessState::Ready => "READY",
            ProcessState::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Process {
    name: String,
    state: ProcessState,
    pid: Option<Pid>,
    ppid: Option<Pid>,
    interrupts: u32,
    switches: u32,
    started: u64,
    launched_at: Option<Instant>,
}

impl Process {
    pub const IDLE_NAME: &'static str = "IDLE";

    pub fn new(name: &str) -> Self {
        Process::with_state(name, ProcessState::New)
    }

    pub fn idle(pid: Pid, ppid: Pid) -> Self {
        let mut idle = Process::with_state(Process::IDLE_NAME, ProcessState::Ready);
        idle.pid = Some(pid);
        idle.ppid = Some(ppid);
        idle
    }

    fn with_state(name: &str, state: ProcessState) -> Self {
        Self {
            name: name.to_owned(),
            state,
            pid: None,
            ppid: None,
            interrupts: 0,
            switches: 0,
            started: 0,
            launched_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn ppid(&self) -> Option<Pid> {
        self.ppid
    }

    pub fn interrupts(&self) -> u32 {
        self.interrupts
    }

    pub fn switches(&self) -> u32 {
        self.switches
    }

    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn turnaround(&self) -> Option<Duration> {
        self.launched_at.map(|at| at.elapsed())
    }

    pub fn is_new(&self) -> bool {
        self.state == ProcessState::New
    }

    pub fn is_ready(&self) -> bool {
        self.state == ProcessState::Ready
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    pub fn admit(&mut self, pid: Pid, ppid: Pid, clock: u64) {
        assert!(self.is_new(), "{} admitted while {}", self.name, self.state);
        self.state = ProcessState::Running;
        self.pid = Some(pid);
        self.ppid = Some(ppid);
        self.started = clock;
        self.launched_at = Some(Instant::now());
        self.charge();
    }

    pub fn preempt(&mut self) {
        assert!(self.is_running(), "{} preempted while {}", self.name, self.state);
        self.state = ProcessState::Ready;
        self.charge();
    }

    pub fn resume(&mut self) {
        assert!(self.is_ready(), "{} resumed while {}", self.name, self.state);
        self.state = ProcessState::Running;
    }

    pub fn terminate(&mut self) {
        assert!(
            !self.is_terminated() && !self.is_new(),
            "{} terminated while {}",
            self.name,
            self.state
        );
        self.state = ProcessState::Terminated;
    }

    // Idle is never charged and never terminates; it only flips between
    // READY and RUNNING.
    pub(super) fn set_idle_running(&mut self, running: bool) {
        self.state = if running {
            ProcessState::Running
        } else {
            ProcessState::Ready
        };
    }

    fn charge(&mut self) {
        self.interrupts += 1;
        self.switches += 1;
        debug_assert!(self.switches <= self.interrupts);
    }
}
