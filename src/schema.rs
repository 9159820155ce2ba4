// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! Fixed layout of the records written by the scanner into the nvticache.

/// Positions of the fields within a `nvt:<OID>` list.
///
/// The order is a contract with the writer and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KbNvtPos {
    Filename,
    RequiredKeys,
    MandatoryKeys,
    ExcludedKeys,
    RequiredUDPPorts,
    RequiredPorts,
    Dependencies,
    Tags,
    Cves,
    Bids,
    Xrefs,
    Category,
    Timeout,
    Family,
    Name,
}

impl KbNvtPos {
    /// All positions in storage order.
    pub const ALL: [KbNvtPos; 15] = [
        KbNvtPos::Filename,
        KbNvtPos::RequiredKeys,
        KbNvtPos::MandatoryKeys,
        KbNvtPos::ExcludedKeys,
        KbNvtPos::RequiredUDPPorts,
        KbNvtPos::RequiredPorts,
        KbNvtPos::Dependencies,
        KbNvtPos::Tags,
        KbNvtPos::Cves,
        KbNvtPos::Bids,
        KbNvtPos::Xrefs,
        KbNvtPos::Category,
        KbNvtPos::Timeout,
        KbNvtPos::Family,
        KbNvtPos::Name,
    ];

    /// Index used for LINDEX and LRANGE.
    pub fn index(self) -> isize {
        self as isize
    }

    /// Name of the field as it is returned in the metadata map.
    pub fn field_name(self) -> &'static str {
        match self {
            KbNvtPos::Filename => "filename",
            KbNvtPos::RequiredKeys => "required_keys",
            KbNvtPos::MandatoryKeys => "mandatory_keys",
            KbNvtPos::ExcludedKeys => "excluded_keys",
            KbNvtPos::RequiredUDPPorts => "required_udp_ports",
            KbNvtPos::RequiredPorts => "required_ports",
            KbNvtPos::Dependencies => "dependencies",
            KbNvtPos::Tags => "tag",
            KbNvtPos::Cves => "cve",
            KbNvtPos::Bids => "bid",
            KbNvtPos::Xrefs => "xref",
            KbNvtPos::Category => "category",
            KbNvtPos::Timeout => "timeout",
            KbNvtPos::Family => "family",
            KbNvtPos::Name => "name",
        }
    }

    /// References are not part of the metadata but handled by their own call.
    pub fn is_reference(self) -> bool {
        matches!(self, KbNvtPos::Cves | KbNvtPos::Bids | KbNvtPos::Xrefs)
    }
}

/// Number of fields a complete `nvt:<OID>` record contains.
pub const NVT_FIELD_COUNT: usize = KbNvtPos::ALL.len();

/// Separator between the segments of a single preference.
pub const PREF_SEPARATOR: &str = "|||";
/// Separator between the tags of the tag field.
pub const TAG_SEPARATOR: char = '|';
/// Separator between key and value of a single tag.
pub const TAG_VALUE_SEPARATOR: char = '=';
/// Separator between references of the same class.
///
/// Some references contain a comma, therefore the separator includes the space.
pub const REF_SEPARATOR: &str = ", ";

/// Positions of the segments of a `oid:<OID>:prefs` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbPrefPos {
    Id,
    Name,
    Type,
    Default,
}

impl KbPrefPos {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Key of the list containing the VT record.
pub fn nvt_key(oid: &str) -> String {
    format!("nvt:{oid}")
}

/// Key of the list containing the preferences of a VT.
pub fn prefs_key(oid: &str) -> String {
    format!("oid:{oid}:prefs")
}

/// Prefix of the lists mapping a filename to `[timestamp, oid]`.
pub const FILENAME_PREFIX: &str = "filename:";

/// Returns the filename of a `filename:<name>` key.
pub fn filename_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(FILENAME_PREFIX)
}

/// Key of the list containing the checksum of a feed file.
pub fn checksum_key(path: &str) -> String {
    format!("sha256sums:{path}")
}

pub const FILENAME_PATTERN: &str = "filename:*";
pub const NVT_PATTERN: &str = "nvt:*";

/// Quality of detection values of the known qod types.
pub const QOD_TYPES: &[(&str, &str)] = &[
    ("exploit", "100"),
    ("remote_vul", "99"),
    ("remote_app", "98"),
    ("package", "97"),
    ("registry", "97"),
    ("remote_active", "95"),
    ("remote_banner", "80"),
    ("executable_version", "80"),
    ("remote_analysis", "70"),
    ("remote_probe", "50"),
    ("remote_banner_unreliable", "30"),
    ("executable_version_unreliable", "30"),
    ("general_note", "1"),
    ("default", "70"),
];

/// Returns the qod value of the given qod type.
///
/// Unknown types get the value of `default`.
pub fn qod_value(qod_type: &str) -> &'static str {
    QOD_TYPES
        .iter()
        .find(|(t, _)| *t == qod_type)
        .or_else(|| QOD_TYPES.iter().find(|(t, _)| *t == "default"))
        .map(|(_, v)| *v)
        .unwrap_or("70")
}
