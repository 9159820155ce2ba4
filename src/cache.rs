// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! Client reading VT metadata from the nvticache.
//!
//! The nvticache is stored by the scanner in one of the redis namespaces. The namespace is
//! marked by a key named after the version of the library writing the cache
//! (e.g. `nvticache20.4.1`). The VTs themselves are stored in two keys:
//!
//! - `nvt:<OID>`: the metadata ordered following the [`KbNvtPos`] indexes
//! - `oid:<OID>:prefs`: the preferences in the form of `id|||name|||type|||default`
//!
//! The namespace is searched lazily on the first call needing it and kept for the lifetime of
//! the client. Every call reads from redis, nothing else is cached.

use std::collections::BTreeMap;

use crate::{
    config::Config,
    error::{NvtiCacheError, Result},
    nvt::{NvtInfo, NvtMetadata, NvtRefs, decode_metadata},
    redis::{RedisConnection, RedisConnector, RedisStorageResult, RedisWrapper},
    schema::{self, KbNvtPos, NVT_FIELD_COUNT},
    tags::parse_tags,
    version::{self, PkgConfig, SUPPORTED_NVTICACHE_VERSIONS, VersionProbe},
    vt_params::VtParams,
};

/// Location of a resolved nvticache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHandle {
    /// Name of the marker key, e.g. `nvticache20.4.1`.
    pub name: String,
    /// Index of the redis namespace containing the cache.
    pub db: u32,
}

pub struct NvtiCache<C, P>
where
    C: RedisConnector,
    P: VersionProbe,
{
    connector: C,
    probe: P,
    name: Option<String>,
    ctx: Option<C::Ctx>,
}

impl NvtiCache<RedisConnection, PkgConfig> {
    /// Creates a client for the redis server and version probe configured in config.
    ///
    /// Does not connect yet.
    pub fn from_config(config: &Config) -> Result<Self> {
        let connector = RedisConnection::open(&config.redis.url)?;
        let probe = PkgConfig::new(config.version.package.as_str());
        Ok(Self::new(connector, probe))
    }
}

impl<C, P> NvtiCache<C, P>
where
    C: RedisConnector,
    P: VersionProbe,
{
    pub fn new(connector: C, probe: P) -> Self {
        Self {
            connector,
            probe,
            name: None,
            ctx: None,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Returns the name of the nvticache compatible with the installed version.
    ///
    /// The version is only probed once.
    pub fn cache_name(&mut self) -> Result<&str> {
        let name = match self.name.take() {
            Some(name) => name,
            None => {
                let installed = self.probe.installed_version()?;
                version::nvticache_name(&installed, SUPPORTED_NVTICACHE_VERSIONS)?
            }
        };
        Ok(self.name.insert(name).as_str())
    }

    fn context(&mut self) -> Result<Option<&mut C::Ctx>> {
        if self.ctx.is_none() {
            let name = self.cache_name()?.to_owned();
            match self.connector.find_database(&name)? {
                Some(ctx) => {
                    tracing::debug!(%name, db = ctx.db(), "Using nvticache.");
                    self.ctx = Some(ctx);
                }
                None => tracing::warn!(%name, "No database contains the nvticache."),
            }
        }
        Ok(self.ctx.as_mut())
    }

    /// Resolves the namespace containing the nvticache.
    ///
    /// Returns None when no namespace contains the cache, in that case the next call searches
    /// again. Once found the namespace is kept, further calls neither probe the version nor
    /// search redis.
    pub fn resolve(&mut self) -> Result<Option<CacheHandle>> {
        let db = self.context()?.map(|ctx| ctx.db());
        Ok(db.map(|db| CacheHandle {
            name: self.name.clone().unwrap_or_default(),
            db,
        }))
    }

    /// Runs f on the resolved namespace or returns absent when there is none.
    fn read<T, F>(&mut self, absent: T, f: F) -> Result<T>
    where
        F: FnOnce(&mut C::Ctx) -> RedisStorageResult<T>,
    {
        match self.context()? {
            Some(ctx) => Ok(f(ctx)?),
            None => Ok(absent),
        }
    }

    /// Runs f on the resolved namespace, fails when there is none.
    fn write<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut C::Ctx) -> RedisStorageResult<()>,
    {
        match self.context()? {
            Some(ctx) => Ok(f(ctx)?),
            None => Err(NvtiCacheError::NoCacheDatabase(
                self.name.clone().unwrap_or_default(),
            )),
        }
    }

    /// Returns the version of the feed stored in the cache.
    pub fn get_feed_version(&mut self) -> Result<Option<String>> {
        let name = self.cache_name()?.to_owned();
        self.read(None, |ctx| ctx.lindex(&name, 0))
    }

    /// Returns the filename and OID of each VT.
    pub fn get_oids(&mut self) -> Result<Vec<(String, String)>> {
        self.read(Vec::new(), |ctx| {
            let mut result = Vec::new();
            for key in ctx.keys(schema::FILENAME_PATTERN)? {
                // the first element is the upload timestamp of the plugin
                match ctx.lindex(&key, 1)? {
                    Some(oid) => {
                        let filename = schema::filename_from_key(&key).unwrap_or(&key);
                        result.push((filename.to_owned(), oid));
                    }
                    None => tracing::debug!(%key, "Skipping filename without oid."),
                }
            }
            Ok(result)
        })
    }

    /// Returns the amount of VT files in the cache.
    pub fn get_nvt_files_count(&mut self) -> Result<usize> {
        self.read(0, |ctx| ctx.count_keys(schema::FILENAME_PATTERN))
    }

    /// Returns the amount of VTs in the cache.
    pub fn get_nvt_count(&mut self) -> Result<usize> {
        self.read(0, |ctx| ctx.count_keys(schema::NVT_PATTERN))
    }

    /// Returns the checksum of a feed file.
    pub fn get_file_checksum(&mut self, path: &str) -> Result<Option<String>> {
        let key = schema::checksum_key(path);
        self.read(None, |ctx| ctx.lindex(&key, 0))
    }

    /// Returns the raw preferences of a VT.
    pub fn get_nvt_prefs(&mut self, oid: &str) -> Result<Vec<String>> {
        let key = schema::prefs_key(oid);
        self.read(Vec::new(), |ctx| ctx.lrange(&key, 0, -1))
    }

    /// Returns the script timeout of a VT.
    ///
    /// None means that the VT is unknown.
    pub fn get_nvt_timeout(&mut self, oid: &str) -> Result<Option<String>> {
        self.get_nvt_field(oid, KbNvtPos::Timeout)
    }

    fn get_nvt_field(&mut self, oid: &str, pos: KbNvtPos) -> Result<Option<String>> {
        let key = schema::nvt_key(oid);
        self.read(None, |ctx| ctx.lindex(&key, pos.index()))
    }

    /// Returns the tags of a VT.
    pub fn get_nvt_tags(&mut self, oid: &str) -> Result<Option<BTreeMap<String, String>>> {
        Ok(self
            .get_nvt_field(oid, KbNvtPos::Tags)?
            .map(|tags| parse_tags(&tags, oid)))
    }

    /// Returns the metadata of a VT or None when the VT is unknown.
    pub fn get_nvt_metadata(&mut self, oid: &str) -> Result<Option<NvtMetadata>> {
        let key = schema::nvt_key(oid);
        let fields = self.read(Vec::new(), |ctx| {
            ctx.lrange(&key, KbNvtPos::Filename.index(), KbNvtPos::Name.index())
        })?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_metadata(oid, &fields)))
    }

    /// Returns the references of a VT or None when the VT is unknown.
    pub fn get_nvt_refs(&mut self, oid: &str) -> Result<Option<NvtRefs>> {
        let key = schema::nvt_key(oid);
        let fields = self.read(Vec::new(), |ctx| {
            ctx.lrange(&key, KbNvtPos::Cves.index(), KbNvtPos::Xrefs.index())
        })?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(NvtRefs::from_fields(&fields)))
    }

    /// Returns the timeout and preferences of a VT as parameters or None when the VT is unknown.
    pub fn get_nvt_params(&mut self, oid: &str) -> Result<Option<VtParams>> {
        let prefs = self.get_nvt_prefs(oid)?;
        let timeout = match self.get_nvt_timeout(oid)? {
            Some(timeout) => timeout,
            None => return Ok(None),
        };
        Ok(Some(VtParams::build(&timeout, &prefs)))
    }

    /// Returns metadata, references and parameters of a VT or None when the VT is unknown.
    pub fn get_nvt(&mut self, oid: &str) -> Result<Option<NvtInfo>> {
        let metadata = match self.get_nvt_metadata(oid)? {
            Some(metadata) => metadata,
            None => return Ok(None),
        };
        let refs = self.get_nvt_refs(oid)?;
        let vt_params = self.get_nvt_params(oid)?;
        Ok(Some(NvtInfo {
            oid: oid.to_owned(),
            metadata,
            refs,
            vt_params,
        }))
    }

    /// Deletes all keys within the namespace of the nvticache.
    pub fn flush(&mut self) -> Result<()> {
        self.write(|ctx| ctx.flush_namespace())
    }

    /// Stores the record of a VT, an existing record is replaced.
    ///
    /// The values must be ordered following the [`KbNvtPos`] indexes.
    pub fn add_vt_to_cache(&mut self, oid: &str, values: &[String]) -> Result<()> {
        if values.len() != NVT_FIELD_COUNT {
            return Err(NvtiCacheError::InvalidRecord {
                oid: oid.to_owned(),
                expected: NVT_FIELD_COUNT,
                found: values.len(),
            });
        }
        let key = schema::nvt_key(oid);
        self.write(|ctx| ctx.replace_list(&key, values))
    }
}
