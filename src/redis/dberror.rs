// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use redis::{ErrorKind, RedisError};
use thiserror::Error;

pub type RedisStorageResult<T> = std::result::Result<T, DbError>;

/// Error cases while working with redis.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbError {
    /// The redis-library does not know about this error kind
    #[error("Unclassified error occurred on redis: {0}.")]
    Unknown(String),
    /// Indicates that redis is wrongfully configured for our use case
    #[error("Unable to use redis due to wrong configuration: {0}.")]
    ConfigurationError(String),
    /// An underlying IO Error within redis.
    #[error("IOError within redis: {0}.")]
    IoError(String),
    /// Indicates issues within this library
    #[error("Library issue: {0}")]
    LibraryError(String),
    /// Lost connection to the master
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
    /// Redis is currently not able to handle request and the caller needs to retry it
    #[error("Temporary issue: {0}")]
    Retry(String),
}

/// The nvticache lives on a single node, cluster redirections end up as `Unknown`.
impl From<RedisError> for DbError {
    fn from(err: RedisError) -> DbError {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::ResponseError
            | ErrorKind::AuthenticationFailed
            | ErrorKind::NoScriptError
            | ErrorKind::ReadOnly
            | ErrorKind::InvalidClientConfig => DbError::ConfigurationError(msg),
            ErrorKind::IoError => DbError::IoError(msg),
            ErrorKind::TypeError | ErrorKind::ClientError | ErrorKind::ExtensionError => {
                DbError::LibraryError(msg)
            }
            ErrorKind::MasterDown => DbError::ConnectionLost(msg),
            ErrorKind::ExecAbortError | ErrorKind::BusyLoadingError | ErrorKind::TryAgain => {
                DbError::Retry(msg)
            }
            _ => DbError::Unknown(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use redis::{ErrorKind, RedisError};

    use super::DbError;

    #[test]
    fn classify() {
        let err = RedisError::from((ErrorKind::IoError, "broken pipe"));
        assert!(matches!(DbError::from(err), DbError::IoError(_)));
        let err = RedisError::from((ErrorKind::TypeError, "not a list"));
        assert!(matches!(DbError::from(err), DbError::LibraryError(_)));
        let err = RedisError::from((ErrorKind::BusyLoadingError, "loading"));
        assert!(matches!(DbError::from(err), DbError::Retry(_)));
        let err = RedisError::from((ErrorKind::AuthenticationFailed, "denied"));
        assert!(matches!(DbError::from(err), DbError::ConfigurationError(_)));
        let err = RedisError::from((ErrorKind::Moved, "moved"));
        assert!(matches!(DbError::from(err), DbError::Unknown(_)));
    }
}
