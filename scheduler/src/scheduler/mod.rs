mod control;
mod display;
mod process;
mod round_robin;
mod runner;
mod table;
mod tasks;

pub use control::{
    abort_simulation, ChildExit, ExitKind, OsControl, ProcessControl, EXIT_SIGNAL, TIMER_SIGNAL,
};
pub use display::Console;
pub use process::Process;
pub use round_robin::RoundRobin;
pub use runner::Kernel;
pub use table::{ProcessTable, Running};
pub use tasks::{IdleTask, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Timer,
    ChildExited,
    Unrecognized(i32),
}

impl Interrupt {
    pub fn from_signal(signum: i32) -> Self {
        match signum {
            n if n == TIMER_SIGNAL as i32 => Interrupt::Timer,
            n if n == EXIT_SIGNAL as i32 => Interrupt::ChildExited,
            n => Interrupt::Unrecognized(n),
        }
    }

    pub fn freezes_running(self) -> bool {
        self != Interrupt::ChildExited
    }
}
