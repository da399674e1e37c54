use std::io;

use crate::unsigned::Width;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid width {0} (expected 1..={max})", max = Width::MAX)]
    InvalidWidth(u32),
    #[error("width mismatch (register: {expected}, data input: {found})")]
    WidthMismatch { expected: Width, found: Width },
    #[error("invalid clock frequency {0} Hz")]
    InvalidFreq(usize),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid stimulus: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
