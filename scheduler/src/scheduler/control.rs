use super::{display::Console, tasks::Task};
use crate::error::{OsResult, Result};
use nix::{
    errno::Errno,
    sys::{
        signal::{kill, sigaction, signal, SaFlags, SigAction, SigHandler, SigSet, Signal},
        wait::{waitpid, WaitPidFlag, WaitStatus},
    },
    unistd::{execv, fork, getpid, ForkResult, Pid},
};
use std::{
    ffi::CString,
    io::{self, Write},
    process,
};

pub const TIMER_SIGNAL: Signal = Signal::SIGALRM;
pub const EXIT_SIGNAL: Signal = Signal::SIGCHLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Code(i32),
    Signal(Signal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub pid: Pid,
    pub kind: ExitKind,
}

pub trait ProcessControl {
    fn host_pid(&self) -> Pid;
    fn stop(&mut self, pid: Pid) -> Result<()>;
    fn resume(&mut self, pid: Pid) -> Result<()>;
    fn launch(&mut self, executable: &str) -> Result<Pid>;
    fn reap(&mut self) -> Result<Vec<ChildExit>>;
    fn terminate_all(&mut self) -> Result<()>;
}

pub fn interrupt_mask() -> SigSet {
    let mut mask = SigSet::empty();
    mask.add(TIMER_SIGNAL);
    mask.add(EXIT_SIGNAL);
    mask
}

pub struct OsControl {
    host: Pid,
    colored: bool,
}

impl OsControl {
    // Must run before any child is created.
    pub fn boot(colored: bool) -> Result<Self> {
        // Stopping and continuing children must not look like exits.
        let action = SigAction::new(SigHandler::SigDfl, SaFlags::SA_NOCLDSTOP, SigSet::empty());
        unsafe { sigaction(EXIT_SIGNAL, &action) }.context("sigaction")?;
        interrupt_mask().thread_block().context("sigprocmask")?;

        Ok(Self {
            host: getpid(),
            colored,
        })
    }

    pub fn wait(&self) -> Result<Signal> {
        interrupt_mask().wait().context("sigwait")
    }

    pub fn spawn<T: Task>(&mut self, mut task: T) -> Result<Pid> {
        io::stdout().flush()?;
        match unsafe { fork() }.context("fork")? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                let _ = SigSet::empty().thread_set_mask();
                let mut console = Console::new(io::stdout(), self.colored);
                let code = match task.run(&mut console) {
                    Ok(()) => 0,
                    Err(err) => {
                        eprintln!("{}: {err}", task.name());
                        1
                    }
                };
                process::exit(code);
            }
        }
    }
}

impl ProcessControl for OsControl {
    fn host_pid(&self) -> Pid {
        self.host
    }

    fn stop(&mut self, pid: Pid) -> Result<()> {
        kill(pid, Signal::SIGSTOP).context("kill")
    }

    fn resume(&mut self, pid: Pid) -> Result<()> {
        kill(pid, Signal::SIGCONT).context("kill")
    }

    fn launch(&mut self, executable: &str) -> Result<Pid> {
        io::stdout().flush()?;
        match unsafe { fork() }.context("fork")? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                let _ = SigSet::empty().thread_set_mask();
                // The Rust runtime ignores SIGPIPE, and exec would keep that.
                let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
                let errno = exec(executable);
                eprintln!("execv() error: {executable}: {errno}");
                process::exit(errno as i32);
            }
        }
    }

    fn reap(&mut self) -> Result<Vec<ChildExit>> {
        let mut exits = Vec::new();
        loop {
            let exit = match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, code)) => ChildExit {
                    pid,
                    kind: ExitKind::Code(code),
                },
                Ok(WaitStatus::Signaled(pid, signal, _)) => ChildExit {
                    pid,
                    kind: ExitKind::Signal(signal),
                },
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(_) => continue,
                Err(err) => return Err(err).context("waitpid"),
            };
            exits.push(exit);
        }
        Ok(exits)
    }

    fn terminate_all(&mut self) -> Result<()> {
        terminate_group()
    }
}

pub fn abort_simulation() -> ! {
    // The host has to survive the group SIGTERM to exit with a failure status.
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let _ = unsafe { sigaction(Signal::SIGTERM, &ignore) };
    let _ = terminate_group();
    process::exit(1)
}

fn terminate_group() -> Result<()> {
    io::stdout().flush()?;
    let group = Pid::from_raw(0);
    // Stopped members only act on SIGTERM once continued.
    kill(group, Signal::SIGCONT).context("kill")?;
    kill(group, Signal::SIGTERM).context("kill")
}

fn exec(executable: &str) -> Errno {
    let path = match CString::new(executable) {
        Ok(path) => path,
        Err(_) => return Errno::EINVAL,
    };
    match execv(&path, &[&path]) {
        Ok(never) => match never {},
        Err(errno) => errno,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::IdleTask;
    use std::{thread, time::Duration};

    fn control() -> OsControl {
        OsControl {
            host: getpid(),
            colored: false,
        }
    }

    fn reap_until(control: &mut OsControl, pids: &[Pid]) -> Vec<ChildExit> {
        let mut exits = Vec::new();
        for _ in 0..500 {
            exits.extend(control.reap().unwrap());
            if pids.iter().all(|pid| exits.iter().any(|exit| exit.pid == *pid)) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        exits
    }

    fn kind_of(exits: &[ChildExit], pid: Pid) -> Option<ExitKind> {
        exits.iter().find(|exit| exit.pid == pid).map(|exit| exit.kind)
    }

    // Kept in one test so no other test collects these children first.
    #[test]
    fn test_os_control_children_report_how_they_ended() {
        let mut control = control();

        let missing = control.launch("/nonexistent").unwrap();
        assert_eq!(
            waitpid(missing, None).unwrap(),
            WaitStatus::Exited(missing, Errno::ENOENT as i32)
        );

        let job = control.launch("/bin/true").unwrap();
        let idle = control.spawn(IdleTask).unwrap();
        kill(idle, Signal::SIGKILL).unwrap();

        let exits = reap_until(&mut control, &[job, idle]);
        assert_eq!(kind_of(&exits, job), Some(ExitKind::Code(0)));
        assert_eq!(
            kind_of(&exits, idle),
            Some(ExitKind::Signal(Signal::SIGKILL))
        );
    }

    #[test]
    fn test_exec_rejects_path_with_nul() {
        assert_eq!(exec("a\0b"), Errno::EINVAL);
    }

    #[test]
    fn test_interrupt_mask_holds_both_interrupts() {
        let mask = interrupt_mask();
        assert!(mask.contains(TIMER_SIGNAL));
        assert!(mask.contains(EXIT_SIGNAL));
        assert!(!mask.contains(Signal::SIGTERM));
    }
}
