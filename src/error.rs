use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrillError {
    #[error("failed to read drill file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown drill category `{0}`")]
    UnknownCategory(String),
    #[error("drill display is no longer listening")]
    FeedbackClosed,
}
