// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! Reads the VT metadata the scanner stores in the redis based nvticache.

pub mod cache;
pub mod config;
pub mod error;
pub mod nvt;
pub mod redis;
pub mod schema;
pub mod tags;
pub mod version;
pub mod vt_params;

pub use cache::{CacheHandle, NvtiCache};
pub use error::{NvtiCacheError, Result};
