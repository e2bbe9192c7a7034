use super::Process;

#[derive(Debug, Default)]
pub struct RoundRobin {
    last: Option<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_new(processes: &[Process]) -> Option<usize> {
        processes.iter().position(Process::is_new)
    }

    /// First READY slot after the one that most recently ran, wrapping around.
    /// The most recently run slot itself is examined last.
    pub fn next_ready(&self, processes: &[Process]) -> Option<usize> {
        let len = processes.len();
        if len == 0 {
            return None;
        }

        let start = self.last.map_or(0, |last| last + 1);
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| processes[index].is_ready())
    }

    pub fn poll_process(&mut self, index: usize) {
        self.last = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    fn ready_processes(count: usize) -> Vec<Process> {
        (0..count)
            .map(|index| {
                let mut process = Process::new(&format!("./job{index}"));
                process.admit(Pid::from_raw(100 + index as i32), Pid::from_raw(1), 0);
                process.preempt();
                process
            })
            .collect()
    }

    #[test]
    fn test_round_robin_first_new_picks_lowest_slot() {
        let mut processes = ready_processes(2);
        processes.push(Process::new("./c"));
        processes.push(Process::new("./d"));

        assert_eq!(RoundRobin::first_new(&processes), Some(2));
        assert_eq!(RoundRobin::first_new(&ready_processes(3)), None);
    }

    #[test]
    fn test_round_robin_starts_after_last_and_wraps() {
        let processes = ready_processes(3);
        let mut rr = RoundRobin::new();

        assert_eq!(rr.next_ready(&processes), Some(0));
        rr.poll_process(1);
        assert_eq!(rr.next_ready(&processes), Some(2));
        rr.poll_process(2);
        assert_eq!(rr.next_ready(&processes), Some(0));
    }

    #[test]
    fn test_round_robin_skips_non_ready_slots() {
        let mut processes = ready_processes(4);
        processes[2].resume();
        processes[2].terminate();
        processes[3].resume();

        let mut rr = RoundRobin::new();
        rr.poll_process(1);
        assert_eq!(rr.next_ready(&processes), Some(0));
    }

    #[test]
    fn test_round_robin_reselects_sole_ready_job() {
        let mut processes = ready_processes(2);
        processes[0].resume();
        processes[0].terminate();

        let mut rr = RoundRobin::new();
        rr.poll_process(1);
        assert_eq!(rr.next_ready(&processes), Some(1));
    }

    #[test]
    fn test_round_robin_sweep_visits_every_ready_job_once() {
        let mut processes = ready_processes(5);
        let mut rr = RoundRobin::new();
        rr.poll_process(3);

        let mut picked = Vec::new();
        for _ in 0..5 {
            let index = rr.next_ready(&processes).unwrap();
            processes[index].resume();
            rr.poll_process(index);
            picked.push(index);
            processes[index].preempt();
        }

        assert_eq!(picked, vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_round_robin_empty_table() {
        assert_eq!(RoundRobin::new().next_ready(&[]), None);
    }
}
