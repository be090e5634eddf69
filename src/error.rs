use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run or a store operation.
///
/// Malformed input lines are *not* errors: they are reported in place on
/// the document and the run ends with `RunOutcome::Aborted`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("machine {machine} has {count} program ids, at most {max} fit in one file")]
    SlotOverflow { machine: u32, count: usize, max: usize },

    #[error("machine {0} already exists")]
    DuplicateMachine(u32),

    #[error("machine {0} does not exist")]
    UnknownMachine(u32),

    #[error("configuration: {0}")]
    Config(String),

    #[error("invalid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("background run panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the attempted action and path to an `io::Error`.
pub(crate) trait IoContext<T> {
    fn io_context(self, action: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, action: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            action,
            path: path.into(),
            source,
        })
    }
}
