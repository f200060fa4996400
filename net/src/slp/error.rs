use std::{fmt, io};

use crate::proto::ProtoError;

/// Coarse classification of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    Network,
    Protocol,
    Decode,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::Network => write!(f, "network"),
            QueryErrorKind::Protocol => write!(f, "protocol"),
            QueryErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// The status payload arrived intact but could not be turned into a
/// [`StatusResponse`](super::StatusResponse).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("status payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("status payload is not a valid status document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(ProtoError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            QueryError::Network(_) => QueryErrorKind::Network,
            QueryError::Protocol(_) => QueryErrorKind::Protocol,
            QueryError::Decode(_) => QueryErrorKind::Decode,
        }
    }

    /// True when a read or connect gave up because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            QueryError::Network(err)
                if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
        )
    }
}

impl From<ProtoError> for QueryError {
    fn from(err: ProtoError) -> Self {
        match err {
            // A truncated buffer means the peer went away mid-packet.
            ProtoError::UnexpectedEof => {
                QueryError::Network(io::Error::from(io::ErrorKind::UnexpectedEof))
            }
            other => QueryError::Protocol(other),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Decode(DecodeError::Json(err))
    }
}
