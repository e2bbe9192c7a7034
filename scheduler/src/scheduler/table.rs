use super::Process;
use nix::unistd::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Running {
    Idle,
    Job(usize),
}

pub struct ProcessTable {
    processes: Vec<Process>,
    idle: Process,
    running: Running,
}

impl ProcessTable {
    pub fn new<I, S>(names: I, idle: Process) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let processes = names
            .into_iter()
            .map(|name| Process::new(name.as_ref()))
            .collect();

        Self {
            processes,
            idle,
            running: Running::Idle,
        }
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn job(&self, index: usize) -> &Process {
        &self.processes[index]
    }

    pub fn job_mut(&mut self, index: usize) -> &mut Process {
        &mut self.processes[index]
    }

    pub fn idle_pid(&self) -> Pid {
        self.idle
            .pid()
            .expect("idle control block is created with a pid")
    }

    pub fn running(&self) -> Running {
        self.running
    }

    pub fn running_process(&self) -> &Process {
        match self.running {
            Running::Idle => &self.idle,
            Running::Job(index) => &self.processes[index],
        }
    }

    pub fn running_pid(&self) -> Pid {
        match self.running {
            Running::Idle => self.idle_pid(),
            Running::Job(index) => self.processes[index]
                .pid()
                .expect("only launched jobs can be running"),
        }
    }

    /// Points the running reference at `running`. The job's own state is
    /// managed by the caller; idle's state follows the reference.
    pub fn set_running(&mut self, running: Running) {
        self.idle.set_idle_running(running == Running::Idle);
        self.running = running;
    }

    pub fn find_job(&self, pid: Pid) -> Option<usize> {
        self.processes
            .iter()
            .position(|process| process.pid() == Some(pid))
    }

    pub fn running_jobs(&self) -> usize {
        self.processes
            .iter()
            .filter(|process| process.is_running())
            .count()
    }

    pub fn all_terminated(&self) -> bool {
        self.processes.iter().all(Process::is_terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str]) -> ProcessTable {
        ProcessTable::new(names, Process::idle(Pid::from_raw(2), Pid::from_raw(1)))
    }

    #[test]
    fn test_table_has_one_new_slot_per_name() {
        let table = table(&["./a", "./b", "./c"]);

        assert_eq!(table.len(), 3);
        assert!(table.processes().iter().all(Process::is_new));
        assert_eq!(table.job(1).name(), "./b");
        assert_eq!(table.running(), Running::Idle);
        assert_eq!(table.running_pid(), Pid::from_raw(2));
    }

    #[test]
    fn test_table_running_reference_tracks_idle_state() {
        let mut table = table(&["./a"]);

        table.job_mut(0).admit(Pid::from_raw(10), Pid::from_raw(1), 0);
        table.set_running(Running::Job(0));
        assert!(table.idle.is_ready());
        assert_eq!(table.running_pid(), Pid::from_raw(10));
        assert_eq!(table.running_jobs(), 1);

        table.job_mut(0).terminate();
        table.set_running(Running::Idle);
        assert!(table.running_process().is_running());
        assert_eq!(table.running_jobs(), 0);
        assert!(table.all_terminated());
    }

    #[test]
    fn test_table_finds_jobs_by_pid() {
        let mut table = table(&["./a", "./b"]);
        table.job_mut(1).admit(Pid::from_raw(11), Pid::from_raw(1), 0);

        assert_eq!(table.find_job(Pid::from_raw(11)), Some(1));
        assert_eq!(table.find_job(Pid::from_raw(2)), None);
    }

    #[test]
    fn test_empty_table() {
        let table = table(&[]);
        assert!(table.is_empty());
        assert!(table.all_terminated());
    }
}
