use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong talking to an OpenVidu server.
///
/// The `*NotFound` kinds mean the server no longer knows the resource; the
/// local object that produced them has already been marked invalid.
#[derive(Debug, Error)]
pub enum Error {
    #[error("session does not exist")]
    SessionNotFound,
    #[error("a session with this id already exists")]
    SessionAlreadyExists,
    #[error("connection does not exist")]
    ConnectionNotFound,
    #[error("stream does not exist")]
    StreamNotFound,
    #[error("recording does not exist")]
    RecordingNotFound,
    #[error("recording has not been stopped")]
    RecordingNotStopped,
    #[error("recording has not been started")]
    RecordingNotStarted,
    #[error("recording is not enabled on the server")]
    RecordingNotEnabled,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("{method} {url} returned {status}")]
    Http {
        method: reqwest::Method,
        url: String,
        status: StatusCode,
    },
    #[error("cannot reach server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The server no longer knows the resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound
                | Self::ConnectionNotFound
                | Self::StreamNotFound
                | Self::RecordingNotFound
        )
    }

    pub fn is_recording_error(&self) -> bool {
        matches!(
            self,
            Self::RecordingNotFound
                | Self::RecordingNotStopped
                | Self::RecordingNotStarted
                | Self::RecordingNotEnabled
        )
    }

    /// Session, connection, stream and recording kinds. Transport, decoding
    /// and unexpected HTTP statuses are not.
    pub fn is_session_error(&self) -> bool {
        self.is_not_found() || self.is_recording_error() || matches!(self, Self::SessionAlreadyExists)
    }

    /// Status code of an unexpected HTTP response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}
