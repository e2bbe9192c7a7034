use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum SchedError {
    /// A system call failed. Every one of these aborts the simulation.
    Os {
        call: &'static str,
        source: nix::Error,
    },
    Io(io::Error),
    ReadConfig {
        path: PathBuf,
        source: io::Error,
    },
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    Usage(String),
}

pub type Result<T> = std::result::Result<T, SchedError>;

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::Os { call, source } => write!(f, "{call}() failed: {source}"),
            SchedError::Io(err) => write!(f, "failed to write to the console: {err}"),
            SchedError::ReadConfig { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            SchedError::Config { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            SchedError::Usage(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for SchedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchedError::Os { source, .. } => Some(source),
            SchedError::Io(err) => Some(err),
            SchedError::ReadConfig { source, .. } => Some(source),
            SchedError::Config { source, .. } => Some(source),
            SchedError::Usage(_) => None,
        }
    }
}

impl From<io::Error> for SchedError {
    fn from(err: io::Error) -> Self {
        SchedError::Io(err)
    }
}

pub trait OsResult<T> {
    fn context(self, call: &'static str) -> Result<T>;
}

impl<T> OsResult<T> for nix::Result<T> {
    fn context(self, call: &'static str) -> Result<T> {
        self.map_err(|source| SchedError::Os { call, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn test_os_error_names_the_call() {
        let result: nix::Result<()> = Err(Errno::ESRCH);
        let err = result.context("kill").unwrap_err();

        assert!(matches!(err, SchedError::Os { call: "kill", .. }));
        assert!(err.to_string().starts_with("kill() failed: "));
    }
}
