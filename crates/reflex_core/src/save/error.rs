use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file not found: {path}")]
    NotFound { path: String },

    #[error("Settings record is empty")]
    Empty,

    #[error("Wrong token count: found {found}, expected {expected}")]
    TokenCount { found: usize, expected: usize },

    #[error("Token {index} is not a number: {token:?}")]
    InvalidNumber { index: usize, token: String },
}

impl GeometryError {
    /// Whether the game can carry on by calibrating from scratch.
    ///
    /// Every load failure is; only a failed write is worth surfacing.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GeometryError::Io(_) => false,
            GeometryError::NotFound { .. } => true,
            GeometryError::Empty => true,
            GeometryError::TokenCount { .. } => true,
            GeometryError::InvalidNumber { .. } => true,
        }
    }
}
