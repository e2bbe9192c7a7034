use crossterm::{
    style::{Color, Stylize},
    tty::IsTty,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::{
    io::{self, Write},
    sync::atomic::{AtomicBool, Ordering},
};

struct StderrLogger {
    colored: AtomicBool,
}

static LOGGER: StderrLogger = StderrLogger {
    colored: AtomicBool::new(false),
};

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = format!("[{}]", record.level());
        let level = if self.colored.load(Ordering::Relaxed) {
            level.with(level_color(record.level())).to_string()
        } else {
            level
        };
        // Diagnostics are best effort; a closed stderr must not stop scheduling.
        let _ = writeln!(io::stderr().lock(), "{level} {}", record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::DarkGrey,
    }
}

/// Installs the stderr logger. Calling it twice only updates the level.
pub fn init(level: LevelFilter, color: bool) {
    LOGGER
        .colored
        .store(color && io::stderr().is_tty(), Ordering::Relaxed);
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
