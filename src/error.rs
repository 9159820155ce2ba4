// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use thiserror::Error;

use crate::redis::DbError;

pub type Result<T> = std::result::Result<T, NvtiCacheError>;

/// Errors while reading from the nvticache.
///
/// An unknown OID is not an error but returned as `None`.
#[derive(Debug, Error)]
pub enum NvtiCacheError {
    /// The environment does not provide a compatible nvticache.
    ///
    /// This is not retried and must be fixed by an operator.
    #[error("Error setting nvticache. {0}")]
    Configuration(String),
    #[error("{0}")]
    Db(#[from] DbError),
    /// No database is marked with the name of the nvticache.
    #[error("No database contains the nvticache {0}.")]
    NoCacheDatabase(String),
    #[error("Invalid record for {oid}: expected {expected} fields but got {found}.")]
    InvalidRecord {
        oid: String,
        expected: usize,
        found: usize,
    },
}
