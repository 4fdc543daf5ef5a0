use thiserror::Error;

/// All errors produced by the DyadLink layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DyadLinkError {
    #[error("link endpoint already initialized")]
    AlreadyInitialized,

    #[error("link endpoint not initialized")]
    NotInitialized,

    #[error("peer endpoint disconnected")]
    Disconnected,

    #[error("no frame pending on link")]
    Empty,

    #[error("receive buffer too small: frame is {frame} bytes, buffer holds {buffer}")]
    BufferTooSmall { frame: usize, buffer: usize },

    #[error("link hardware fault")]
    Hardware,
}

pub type Result<T> = std::result::Result<T, DyadLinkError>;
