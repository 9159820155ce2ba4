// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! In-memory replacement of a redis server.
//!
//! Only the list commands used by the nvticache are supported.

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};

use super::{DbError, RedisConnector, RedisStorageResult, RedisWrapper};

/// A single namespace holding lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRedis {
    db: u32,
    lists: BTreeMap<String, Vec<String>>,
}

impl InMemoryRedis {
    pub fn new(db: u32) -> Self {
        Self {
            db,
            ..Default::default()
        }
    }

    /// Stores a list, an already existing list is replaced.
    pub fn with_list<K, V>(mut self, key: K, values: V) -> Self
    where
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        self.lists
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    fn contains(&self, key: &str) -> bool {
        self.lists.contains_key(key)
    }

    /// Transforms a redis index into a position, negative indexes count from the end.
    fn position(len: usize, index: isize) -> isize {
        if index < 0 {
            len as isize + index
        } else {
            index
        }
    }
}

/// Keys are plain strings, `/` and leading dots have no special meaning.
const KEY_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl RedisWrapper for InMemoryRedis {
    fn db(&self) -> u32 {
        self.db
    }

    fn lindex(&mut self, key: &str, index: isize) -> RedisStorageResult<Option<String>> {
        let list = match self.lists.get(key) {
            Some(list) => list,
            None => return Ok(None),
        };
        let pos = Self::position(list.len(), index);
        if pos < 0 {
            return Ok(None);
        }
        Ok(list.get(pos as usize).cloned())
    }

    fn lrange(&mut self, key: &str, start: isize, end: isize) -> RedisStorageResult<Vec<String>> {
        let list = match self.lists.get(key) {
            Some(list) => list,
            None => return Ok(Vec::new()),
        };
        let len = list.len() as isize;
        let start = Self::position(list.len(), start).max(0);
        let end = Self::position(list.len(), end).min(len - 1);
        if start > end {
            return Ok(Vec::new());
        }
        Ok(list[start as usize..=end as usize].to_vec())
    }

    fn keys(&mut self, pattern: &str) -> RedisStorageResult<Vec<String>> {
        let pattern = Pattern::new(pattern)
            .map_err(|e| DbError::LibraryError(format!("Invalid pattern {pattern}: {e}")))?;
        Ok(self
            .lists
            .keys()
            .filter(|k| pattern.matches_with(k, KEY_MATCH_OPTIONS))
            .cloned()
            .collect())
    }

    fn replace_list(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()> {
        if values.is_empty() {
            self.lists.remove(key);
        } else {
            self.lists.insert(key.to_owned(), values.to_vec());
        }
        Ok(())
    }

    fn del(&mut self, key: &str) -> RedisStorageResult<()> {
        self.lists.remove(key);
        Ok(())
    }

    fn rpush(&mut self, key: &str, values: &[String]) -> RedisStorageResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.lists
            .entry(key.to_owned())
            .or_default()
            .extend(values.iter().cloned());
        Ok(())
    }

    fn flush_namespace(&mut self) -> RedisStorageResult<()> {
        self.lists.clear();
        Ok(())
    }
}

/// A set of in-memory namespaces.
///
/// A found namespace is handed out as a copy, changes made through it are
/// not visible in the connector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    databases: Vec<InMemoryRedis>,
    lookups: usize,
}

impl InMemoryConnector {
    pub fn new(databases: Vec<InMemoryRedis>) -> Self {
        Self {
            databases,
            lookups: 0,
        }
    }

    /// Amount of calls to find_database.
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}

impl RedisConnector for InMemoryConnector {
    type Ctx = InMemoryRedis;

    fn find_database(&mut self, marker: &str) -> RedisStorageResult<Option<InMemoryRedis>> {
        self.lookups += 1;
        Ok(self
            .databases
            .iter()
            .filter(|db| db.db > 0)
            .find(|db| db.contains(marker))
            .cloned())
    }
}
