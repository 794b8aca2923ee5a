//! Error types for the graph server

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("unsupported command: {0:?}")]
    UnsupportedCommand(String),

    /// A goodbye or timeout message was requested before the client ever
    /// registered a name. This is a sequencing bug, not a recoverable
    /// protocol error: the connection is closed without a wire response.
    #[error("client name was never registered")]
    ClientNameNotRegistered,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
