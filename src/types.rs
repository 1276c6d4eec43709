use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the relay device or loading local configuration.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{path} returned {status}")]
    Status { path: String, status: StatusCode },

    #[error("Unexpected payload from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two failure classes a device round trip can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection failure or non-success HTTP status.
    Transport,
    /// The device answered, but not with the expected JSON shape.
    Decode,
    /// Anything that never reached the device (config, local I/O).
    Local,
}

impl DeviceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DeviceError::Transport(_) | DeviceError::Status { .. } => FailureKind::Transport,
            DeviceError::Decode { .. } => FailureKind::Decode,
            DeviceError::Config(_) | DeviceError::Io(_) => FailureKind::Local,
        }
    }
}
