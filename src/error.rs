//! Host-level errors. The scenes themselves never fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("score file {path}: {source}")]
    ScoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode scores: {0}")]
    ScoreEncode(#[from] toml::ser::Error),

    #[error("log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),
}
