use crate::error::{Result, SchedError};
use log::LevelFilter;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

pub const USAGE: &str = "\
usage: signal-scheduler [OPTIONS] [--] [EXECUTABLE]...

options:
    --config FILE         read settings from a TOML file
    --interval SECS       seconds between timer interrupts (default 1)
    --interrupts N        number of timer interrupts to send (default 20)
    --on-job-exit POLICY  terminate-all | continue (default terminate-all)
    --no-color            never colour the output
    -h, --help            print this message";

/// What the completion handler does after reporting a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    /// Kill the whole process group after the first job exits.
    TerminateAll,
    /// Keep scheduling the remaining jobs until the timer runs out.
    Continue,
}

impl FromStr for CompletionPolicy {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "terminate-all" => Ok(CompletionPolicy::TerminateAll),
            "continue" => Ok(CompletionPolicy::Continue),
            other => Err(SchedError::Usage(format!(
                "unknown job exit policy `{other}`, expected terminate-all or continue"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub interval_secs: u64,
    pub interrupts: u32,
    pub on_job_exit: CompletionPolicy,
    pub color: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            interrupts: 20,
            on_job_exit: CompletionPolicy::TerminateAll,
            color: true,
            log_level: "warn".to_owned(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SchedError::ReadConfig {
            path: path.to_owned(),
            source,
        })?;
        Config::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| SchedError::Config {
            path: path.to_owned(),
            source,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// `SCHED_LOG` wins over the configured level.
    pub fn log_level(&self, env: Option<&str>) -> Result<LevelFilter> {
        let level = env.unwrap_or(&self.log_level);
        LevelFilter::from_str(level)
            .map_err(|_| SchedError::Usage(format!("unknown log level `{level}`")))
    }

    fn validate(self) -> Result<Self> {
        if self.interval_secs == 0 {
            return Err(SchedError::Usage("the timer interval must be at least 1 second".into()));
        }
        if self.interrupts == 0 {
            return Err(SchedError::Usage("at least one timer interrupt is required".into()));
        }
        Ok(self)
    }
}

#[derive(Debug)]
pub struct Options {
    pub config: Config,
    pub jobs: Vec<String>,
    pub help: bool,
}

impl Options {
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config_path: Option<PathBuf> = None;
        let mut interval = None;
        let mut interrupts = None;
        let mut policy = None;
        let mut no_color = false;
        let mut help = false;
        let mut jobs = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = Some(value(&mut args, &arg)?.into()),
                "--interval" => interval = Some(number(&value(&mut args, &arg)?, &arg)?),
                "--interrupts" => interrupts = Some(number(&value(&mut args, &arg)?, &arg)?),
                "--on-job-exit" => policy = Some(value(&mut args, &arg)?.parse()?),
                "--no-color" => no_color = true,
                "-h" | "--help" => help = true,
                "--" => {
                    jobs.extend(args.by_ref());
                    break;
                }
                option if option.starts_with('-') && option.len() > 1 => {
                    return Err(SchedError::Usage(format!("unknown option `{option}`")));
                }
                _ => jobs.push(arg),
            }
        }

        let mut config = match config_path {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        };
        if let Some(interval) = interval {
            config.interval_secs = interval;
        }
        if let Some(interrupts) = interrupts {
            config.interrupts = interrupts;
        }
        if let Some(policy) = policy {
            config.on_job_exit = policy;
        }
        if no_color {
            config.color = false;
        }

        Ok(Self {
            config: config.validate()?,
            jobs,
            help,
        })
    }
}

fn value<I>(args: &mut I, option: &str) -> Result<String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| SchedError::Usage(format!("`{option}` needs a value")))
}

fn number<T: FromStr>(text: &str, option: &str) -> Result<T> {
    text.parse()
        .map_err(|_| SchedError::Usage(format!("`{option}` expects a number, got `{text}`")))
}
