// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

/// Module with structures and methods to access redis.
mod connector;
/// Module to handle custom errors
mod dberror;
pub mod inmemory;

pub use connector::{RedisConnection, RedisConnector, RedisCtx, RedisWrapper};
pub use dberror::{DbError, RedisStorageResult};
