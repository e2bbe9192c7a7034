use super::{
    display::{Console, Tone},
    ChildExit, ExitKind, Interrupt, ProcessControl, ProcessTable, RoundRobin, Running,
};
use crate::{config::CompletionPolicy, error::Result};
use nix::unistd::Pid;
use std::{
    io::Write,
    time::{Duration, Instant},
};

pub struct Kernel<C, W: Write> {
    table: ProcessTable,
    round_robin: RoundRobin,
    control: C,
    console: Console<W>,
    policy: CompletionPolicy,
    timer: Option<Pid>,
    clock: u64,
    last_decision: Duration,
    finished: bool,
}

impl<C: ProcessControl, W: Write> Kernel<C, W> {
    pub fn new(
        table: ProcessTable,
        control: C,
        console: Console<W>,
        policy: CompletionPolicy,
    ) -> Self {
        Self {
            table,
            round_robin: RoundRobin::new(),
            control,
            console,
            policy,
            timer: None,
            clock: 0,
            last_decision: Duration::ZERO,
            finished: false,
        }
    }

    pub fn with_timer(mut self, pid: Pid) -> Self {
        self.timer = Some(pid);
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn dispatch(&mut self, signum: i32) -> Result<()> {
        let interrupt = Interrupt::from_signal(signum);

        // A tick can arrive ahead of the exit notification it raced with.
        if interrupt == Interrupt::Timer {
            self.children_exited()?;
            if self.finished {
                return Ok(());
            }
        }

        if interrupt.freezes_running() {
            let pid = self.table.running_pid();
            self.control.stop(pid)?;
            self.say(Tone::Plain, &format!("Stopping: {pid}"))?;
        }

        match interrupt {
            Interrupt::Timer => self.schedule()?,
            Interrupt::ChildExited => self.children_exited()?,
            Interrupt::Unrecognized(signum) => self.bad_signal(signum)?,
        }

        debug_assert!(self.table.running_jobs() <= 1);
        Ok(())
    }

    fn schedule(&mut self) -> Result<()> {
        let started = Instant::now();
        self.say(Tone::Scheduler, "---- entering scheduler")?;
        self.clock += 1;

        if let Running::Job(index) = self.table.running() {
            self.table.job_mut(index).preempt();
        }

        if let Some(index) = RoundRobin::first_new(self.table.processes()) {
            self.admit(index)?;
        } else if let Some(index) = self.round_robin.next_ready(self.table.processes()) {
            self.continue_job(index)?;
        } else {
            self.continue_idle()?;
        }

        self.last_decision = started.elapsed();
        log::debug!(
            "tick {}: decision took {:?}, running {}",
            self.clock,
            self.last_decision,
            self.table.running_process().name()
        );
        self.say(Tone::Scheduler, "---- leaving scheduler")
    }

    fn admit(&mut self, index: usize) -> Result<()> {
        let host = self.control.host_pid();
        let pid = self.control.launch(self.table.job(index).name())?;

        let job = self.table.job_mut(index);
        job.admit(pid, host, self.clock);
        log::debug!("launched {} as {pid}, parent {:?}", job.name(), job.ppid());
        let line = format!("Admitting: {} as {pid}", job.name());

        self.table.set_running(Running::Job(index));
        self.round_robin.poll_process(index);
        self.say(Tone::Scheduler, &line)
    }

    fn continue_job(&mut self, index: usize) -> Result<()> {
        let pid = self
            .table
            .job(index)
            .pid()
            .expect("ready jobs have been launched");

        self.say(Tone::Scheduler, &format!("Continuing: {pid}"))?;
        self.control.resume(pid)?;
        self.table.job_mut(index).resume();
        self.table.set_running(Running::Job(index));
        self.round_robin.poll_process(index);
        Ok(())
    }

    fn continue_idle(&mut self) -> Result<()> {
        let pid = self.table.idle_pid();

        self.say(Tone::Scheduler, &format!("Continuing idle: {pid}"))?;
        self.control.resume(pid)?;
        self.table.set_running(Running::Idle);
        Ok(())
    }

    fn children_exited(&mut self) -> Result<()> {
        for ChildExit { pid, kind } in self.control.reap()? {
            match kind {
                ExitKind::Code(code) => log::debug!("child {pid} exited with status {code}"),
                ExitKind::Signal(signal) => {
                    log::debug!("child {pid} killed by {}", signal.as_str())
                }
            }

            if self.timer == Some(pid) {
                self.timer_died()?;
            } else if let Some(index) = self.table.find_job(pid) {
                self.process_done(index)?;
            } else if pid == self.table.idle_pid() {
                log::warn!("idle task {pid} exited");
            } else {
                log::warn!("exit of unknown child {pid} ignored");
            }

            if self.finished {
                break;
            }
        }
        Ok(())
    }

    fn process_done(&mut self, index: usize) -> Result<()> {
        self.say(Tone::Completion, "---- entering process_done")?;

        let job = self.table.job(index);
        let lines = [
            format!("Interrupts: {}", job.interrupts()),
            format!("Switches: {}", job.switches()),
            format!(
                "{:.6} seconds to execute process.",
                self.last_decision.as_secs_f64()
            ),
        ];
        if let Some(turnaround) = job.turnaround() {
            log::info!(
                "{} finished after {turnaround:.2?} (started at tick {})",
                job.name(),
                job.started()
            );
        }
        for line in &lines {
            self.say(Tone::Completion, line)?;
        }

        self.table.job_mut(index).terminate();
        if self.table.running() == Running::Job(index) {
            self.continue_idle()?;
        }

        match self.policy {
            CompletionPolicy::TerminateAll => {
                self.say(Tone::Warning, "Timer died, cleaning up and killing everything")?;
                self.say(Tone::Completion, "---- leaving process_done")?;
                self.terminate_all()
            }
            CompletionPolicy::Continue => {
                if self.table.all_terminated() {
                    log::info!("every job has finished, idling until the timer stops");
                }
                self.say(Tone::Completion, "---- leaving process_done")
            }
        }
    }

    fn timer_died(&mut self) -> Result<()> {
        self.timer = None;
        self.say(Tone::Warning, "Timer died, cleaning up and killing everything")?;

        let summary: Vec<String> = self
            .table
            .processes()
            .iter()
            .map(|process| {
                format!(
                    "{}: {} interrupts={} switches={}",
                    process.name(),
                    process.state(),
                    process.interrupts(),
                    process.switches()
                )
            })
            .collect();
        for line in &summary {
            self.say(Tone::Plain, line)?;
        }

        self.terminate_all()
    }

    fn bad_signal(&mut self, signum: i32) -> Result<()> {
        self.say(Tone::Warning, &format!("bad signal: {signum}"))
    }

    fn terminate_all(&mut self) -> Result<()> {
        self.finished = true;
        self.control.terminate_all()
    }

    fn say(&mut self, tone: Tone, line: &str) -> Result<()> {
        Ok(self.console.line(tone, line)?)
    }
}
