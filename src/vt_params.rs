// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! User configurable parameters of a VT.
//!
//! The parameters are built from the script timeout and the preferences
//! stored under `oid:<OID>:prefs`.

use serde::{Serialize, ser::SerializeMap};

use crate::schema::{KbPrefPos, PREF_SEPARATOR};

/// Id of the parameter synthesized from the script timeout.
pub const TIMEOUT_PARAM_ID: &str = "0";

/// A single parameter of a VT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub class: String,
    pub name: String,
    pub description: String,
    pub default: String,
}

impl ParamDescriptor {
    /// Creates the script timeout parameter.
    pub fn timeout(timeout: &str) -> Self {
        Self {
            id: TIMEOUT_PARAM_ID.to_owned(),
            class: "entry".to_owned(),
            name: "timeout".to_owned(),
            description: "Script Timeout".to_owned(),
            default: timeout.to_owned(),
        }
    }

    /// Parses a preference in the form of `id|||name|||type|||default`.
    ///
    /// The default is optional and only used when the type is set.
    /// Returns None when id, name or type are missing.
    pub fn from_preference(pref: &str) -> Option<Self> {
        let elem: Vec<&str> = pref.split(PREF_SEPARATOR).collect();
        if elem.len() <= KbPrefPos::Type.index() {
            return None;
        }
        let class = elem[KbPrefPos::Type.index()];
        let default = if class.is_empty() {
            ""
        } else {
            elem.get(KbPrefPos::Default.index()).copied().unwrap_or_default()
        };
        Some(Self {
            id: elem[KbPrefPos::Id.index()].to_owned(),
            class: class.to_owned(),
            name: elem[KbPrefPos::Name.index()].trim().to_owned(),
            description: "Description".to_owned(),
            default: default.to_owned(),
        })
    }
}

/// Parameters of a VT keyed by their id.
///
/// Keeps the order of the first insertion of an id, inserting an existing id
/// replaces the previous parameter in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VtParams {
    params: Vec<ParamDescriptor>,
}

impl VtParams {
    /// Merges the script timeout and preferences of a VT.
    ///
    /// The timeout parameter is only added when the timeout is a positive
    /// number. Preferences are added in the given order, a preference using
    /// the id of the timeout parameter overwrites it.
    pub fn build<S: AsRef<str>>(timeout: &str, prefs: &[S]) -> Self {
        let mut params = Self::default();
        match timeout.trim().parse::<i64>() {
            Ok(t) if t > 0 => params.insert(ParamDescriptor::timeout(timeout)),
            Ok(_) => {}
            Err(e) => tracing::debug!(timeout, error=%e, "Ignoring invalid script timeout."),
        }

        for pref in prefs {
            let pref = pref.as_ref();
            match ParamDescriptor::from_preference(pref) {
                Some(p) => params.insert(p),
                None => tracing::warn!(pref, "Skipping malformed preference."),
            }
        }
        params
    }

    /// Inserts a parameter, an existing parameter with the same id is replaced.
    pub fn insert(&mut self, param: ParamDescriptor) {
        match self.params.iter_mut().find(|p| p.id == param.id) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter()
    }
}

impl IntoIterator for VtParams {
    type Item = ParamDescriptor;
    type IntoIter = std::vec::IntoIter<ParamDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl Serialize for VtParams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for p in &self.params {
            map.serialize_entry(&p.id, p)?;
        }
        map.end()
    }
}
