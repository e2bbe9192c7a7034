use super::display::{Console, Tone};
use crate::error::{OsResult, Result};
use nix::{
    sys::signal::{kill, raise, Signal},
    unistd::{pause, Pid},
};
use std::{io::Write, thread, time::Duration};

pub trait Task {
    fn name(&self) -> &'static str;
    fn run<W: Write>(&mut self, console: &mut Console<W>) -> Result<()>;
}

pub struct IdleTask;

impl Task for IdleTask {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn run<W: Write>(&mut self, _console: &mut Console<W>) -> Result<()> {
        raise(Signal::SIGSTOP).context("raise")?;
        loop {
            pause();
        }
    }
}

/// Sends `signal` to `target` every `interval`, `count` times.
pub struct TimerTask {
    signal: Signal,
    target: Pid,
    interval: Duration,
    count: u32,
}

impl TimerTask {
    pub fn new(signal: Signal, target: Pid, interval: Duration, count: u32) -> Self {
        Self {
            signal,
            target,
            interval,
            count,
        }
    }

    fn tick<W: Write>(&self, console: &mut Console<W>) -> Result<()> {
        console.line(
            Tone::Plain,
            &format!(
                "Sending signal: {} to process: {}",
                self.signal as i32, self.target
            ),
        )?;
        kill(self.target, self.signal).context("kill")
    }
}

impl Task for TimerTask {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn run<W: Write>(&mut self, console: &mut Console<W>) -> Result<()> {
        for _ in 0..self.count {
            thread::sleep(self.interval);
            self.tick(console)?;
        }
        log::info!("timer sent {} interrupts, exiting", self.count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::getpid;

    #[test]
    fn test_timer_task_announces_each_signal() {
        // SIGCONT to a process that is already running has no effect.
        let target = getpid();
        let mut console = Console::new(Vec::new(), false);
        let mut timer = TimerTask::new(Signal::SIGCONT, target, Duration::ZERO, 2);

        timer.run(&mut console).unwrap();

        let expected = format!(
            "Sending signal: {sig} to process: {target}\nSending signal: {sig} to process: {target}\n",
            sig = Signal::SIGCONT as i32,
        );
        assert_eq!(String::from_utf8(console.get_ref().clone()).unwrap(), expected);
    }
}
