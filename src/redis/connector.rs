// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use std::fmt::Debug;

use redis::{Cmd, Commands, Connection};

use super::dberror::RedisStorageResult;

/// Read and write access to a single redis namespace.
pub trait RedisWrapper {
    /// Index of the namespace.
    fn db(&self) -> u32;
    /// Returns the element at index of the list stored at key.
    ///
    /// Returns None when either the key or the index does not exist.
    fn lindex(&mut self, key: &str, index: isize) -> RedisStorageResult<Option<String>>;
    /// Returns the elements from start to end (inclusive) of the list stored at key.
    ///
    /// Negative indexes are counted from the end of the list.
    fn lrange(&mut self, key: &str, start: isize, end: isize) -> RedisStorageResult<Vec<String>>;
    fn keys(&mut self, pattern: &str) -> RedisStorageResult<Vec<String>>;
    fn count_keys(&mut self, pattern: &str) -> RedisStorageResult<usize> {
        Ok(self.keys(pattern)?.len())
    }
    fn del(&mut self, key: &str) -> RedisStorageResult<()>;
    fn rpush(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()>;
    /// Replaces the list stored at key, readers never see the key missing.
    fn replace_list(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()>;
    /// Deletes all keys of the namespace.
    fn flush_namespace(&mut self) -> RedisStorageResult<()>;
}

/// Finds the namespace containing a marker key.
pub trait RedisConnector {
    type Ctx: RedisWrapper;

    /// Returns the context of the first namespace containing the marker.
    fn find_database(&mut self, marker: &str) -> RedisStorageResult<Option<Self::Ctx>>;
}

/// Connection to a selected redis namespace.
pub struct RedisCtx {
    kb: Connection,
    db: u32,
}

impl Debug for RedisCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Redis connection. Db {}", self.db)
    }
}

impl RedisWrapper for RedisCtx {
    fn db(&self) -> u32 {
        self.db
    }

    fn lindex(&mut self, key: &str, index: isize) -> RedisStorageResult<Option<String>> {
        Ok(self.kb.lindex(key, index)?)
    }

    fn lrange(&mut self, key: &str, start: isize, end: isize) -> RedisStorageResult<Vec<String>> {
        Ok(self.kb.lrange(key, start, end)?)
    }

    fn keys(&mut self, pattern: &str) -> RedisStorageResult<Vec<String>> {
        Ok(self.kb.keys(pattern)?)
    }

    fn del(&mut self, key: &str) -> RedisStorageResult<()> {
        Ok(self.kb.del(key)?)
    }

    fn rpush(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        Ok(self.kb.rpush(key, values)?)
    }

    fn replace_list(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()> {
        if values.is_empty() {
            return self.del(key);
        }
        redis::pipe()
            .atomic()
            .del(key)
            .ignore()
            .rpush(key, values)
            .ignore()
            .query::<()>(&mut self.kb)?;
        Ok(())
    }

    fn flush_namespace(&mut self) -> RedisStorageResult<()> {
        Cmd::new().arg("FLUSHDB").query::<()>(&mut self.kb)?;
        Ok(())
    }
}

/// Client to a redis server.
///
/// Each found namespace gets its own connection.
#[derive(Debug, Clone)]
pub struct RedisConnection {
    client: redis::Client,
}

impl RedisConnection {
    /// Creates a client without connecting.
    ///
    /// The address must be a complete url including the used protocol e.g.:
    /// `"unix:///run/redis/redis-server.sock"`.
    pub fn open(address: &str) -> RedisStorageResult<Self> {
        let client = redis::Client::open(address)?;
        Ok(Self { client })
    }

    fn max_db(kb: &mut Connection) -> RedisStorageResult<u32> {
        Cmd::new()
            .arg("CONFIG")
            .arg("GET")
            .arg("databases")
            .query::<(String, u32)>(kb)
            .map(|(_, max_db)| max_db)
            .map_err(|e| e.into())
    }

    fn select_namespace(kb: &mut Connection, idx: u32) -> RedisStorageResult<()> {
        Cmd::new()
            .arg("SELECT")
            .arg(idx)
            .query(kb)
            .map_err(|e| e.into())
    }
}

impl RedisConnector for RedisConnection {
    type Ctx = RedisCtx;

    fn find_database(&mut self, marker: &str) -> RedisStorageResult<Option<RedisCtx>> {
        let mut kb = self.client.get_connection()?;
        let max_db = Self::max_db(&mut kb)?;
        // namespace 0 is reserved for the index of used namespaces
        for db in 1..max_db {
            Self::select_namespace(&mut kb, db)?;
            let found: bool = kb.exists(marker)?;
            if found {
                tracing::debug!(marker, db, "Found namespace.");
                return Ok(Some(RedisCtx { kb, db }));
            }
        }
        tracing::debug!(marker, max_db, "No namespace contains marker.");
        Ok(None)
    }
}
