mod config;
mod error;
mod logger;
mod scheduler;

use config::{Options, USAGE};
use crossterm::tty::IsTty;
use error::{Result, SchedError};
use scheduler::{
    Console, IdleTask, Kernel, OsControl, Process, ProcessControl, ProcessTable, TimerTask,
    TIMER_SIGNAL,
};
use std::{env, io, process};

fn main() {
    if let Err(err) = run() {
        match err {
            SchedError::Usage(_) => {
                eprintln!("{err}\n\n{USAGE}");
                process::exit(2);
            }
            SchedError::ReadConfig { .. } | SchedError::Config { .. } => {
                eprintln!("{err}");
                process::exit(2);
            }
            _ => {
                eprintln!("fatal: {err}");
                scheduler::abort_simulation();
            }
        }
    }
}

fn run() -> Result<()> {
    let options = Options::parse(env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = options.config;
    let level = config.log_level(env::var("SCHED_LOG").ok().as_deref())?;
    logger::init(level, config.color);
    let colored = config.color && io::stdout().is_tty();

    let mut control = OsControl::boot(colored)?;
    let host = control.host_pid();
    let timer = control.spawn(TimerTask::new(
        TIMER_SIGNAL,
        host,
        config.interval(),
        config.interrupts,
    ))?;
    let idle = control.spawn(IdleTask)?;

    let table = ProcessTable::new(&options.jobs, Process::idle(idle, host));
    log::info!(
        "host {host}, timer {timer}, idle {idle}, {} jobs, job exit policy {:?}",
        table.len(),
        config.on_job_exit
    );
    if table.is_empty() {
        log::warn!("no executables given, only the idle task will run");
    }
    let console = Console::new(io::stdout(), colored);
    let mut kernel = Kernel::new(table, control, console, config.on_job_exit).with_timer(timer);

    while !kernel.is_finished() {
        let signal = kernel.control().wait()?;
        kernel.dispatch(signal as i32)?;
    }
    Ok(())
}
