//! Errors a run can end with.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The passes kept rewriting each other's output.
    #[error("no fixed point after {cycles} cycles")]
    CycleLimit { cycles: usize },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a unit could not be turned into text. The unit is dropped.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not in any supported encoding", path.display())]
    Undecodable { path: PathBuf },
}
