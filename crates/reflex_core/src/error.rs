use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Per-frame collaborator failure. Always recoverable: the frame is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Capture timed out")]
    Timeout,

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Display conversion failed: {0}")]
    Convert(String),

    #[error("Detection failed: {0}")]
    Detect(String),
}
