use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown class id {0}: not in the configured class set")]
    UnknownClass(i32),

    #[error("boundary line is degenerate: endpoints must be finite and distinct")]
    DegenerateBoundary,

    #[error("utc offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("frame on line {line}: {source}")]
    Frame { line: u64, source: Box<Error> },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}
