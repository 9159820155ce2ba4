// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! Decoded representations of a VT record.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    schema::{KbNvtPos, REF_SEPARATOR},
    tags::parse_tags,
    vt_params::VtParams,
};

/// Metadata of a VT.
///
/// Contains the non-empty fields of the record and the tags flattened into
/// the same map.
pub type NvtMetadata = BTreeMap<String, String>;

/// Decodes the fields of a record starting at [`KbNvtPos::Filename`].
///
/// References are skipped as they are returned by their own call.
pub fn decode_metadata(oid: &str, fields: &[String]) -> NvtMetadata {
    let mut metadata = NvtMetadata::new();
    for (pos, value) in KbNvtPos::ALL.iter().zip(fields) {
        match pos {
            KbNvtPos::Tags => metadata.extend(parse_tags(value, oid)),
            p if p.is_reference() => {}
            p if !value.is_empty() => {
                metadata.insert(p.field_name().to_owned(), value.clone());
            }
            _ => {}
        }
    }
    metadata
}

/// References of a VT by class.
///
/// Every class is split on `", "`, an empty field results in a single empty
/// reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NvtRefs {
    pub cve: Vec<String>,
    pub bid: Vec<String>,
    pub xref: Vec<String>,
}

impl NvtRefs {
    /// Decodes the fields from [`KbNvtPos::Cves`] to [`KbNvtPos::Xrefs`].
    ///
    /// A class missing in fields stays empty.
    pub fn from_fields(fields: &[String]) -> Self {
        let split = |x: &String| -> Vec<String> {
            x.split(REF_SEPARATOR).map(|r| r.to_owned()).collect()
        };
        let mut refs = Self::default();
        for (pos, value) in [KbNvtPos::Cves, KbNvtPos::Bids, KbNvtPos::Xrefs]
            .iter()
            .zip(fields)
        {
            match pos {
                KbNvtPos::Cves => refs.cve = split(value),
                KbNvtPos::Bids => refs.bid = split(value),
                _ => refs.xref = split(value),
            }
        }
        refs
    }
}

/// Everything known about a single VT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NvtInfo {
    pub oid: String,
    #[serde(flatten)]
    pub metadata: NvtMetadata,
    pub refs: Option<NvtRefs>,
    pub vt_params: Option<VtParams>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|x| x.to_string()).collect()
    }

    fn mantis() -> Vec<String> {
        strings(&[
            "mantis_detect.nasl",
            "",
            "",
            "Settings/disable_cgi_scanning",
            "",
            "Services/www, 80",
            "find_service.nasl, http_version.nasl",
            "cvss_base_vector=AV:N/AC:L/Au:N/C:N/I:N/A:N|last_modification=1533906565\
             |creation_date=1237458156|summary=Detects the installed version of\n  Mantis.\
             |qod_type=remote_banner",
            "",
            "",
            "URL:http://www.mantisbt.org/",
            "3",
            "0",
            "Product detection",
            "Mantis Detection",
        ])
    }

    #[test]
    fn metadata() {
        let metadata = decode_metadata("1.2.3.4", &mantis());
        let expected: NvtMetadata = [
            ("category", "3"),
            ("creation_date", "1237458156"),
            ("cvss_base_vector", "AV:N/AC:L/Au:N/C:N/I:N/A:N"),
            ("dependencies", "find_service.nasl, http_version.nasl"),
            ("excluded_keys", "Settings/disable_cgi_scanning"),
            ("family", "Product detection"),
            ("filename", "mantis_detect.nasl"),
            ("last_modification", "1533906565"),
            ("name", "Mantis Detection"),
            ("qod_type", "remote_banner"),
            ("required_ports", "Services/www, 80"),
            ("summary", "Detects the installed version of\n  Mantis."),
            ("timeout", "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        assert_eq!(metadata, expected);
    }

    #[test]
    fn metadata_ignores_references() {
        let mut fields = mantis();
        fields[KbNvtPos::Cves as usize] = "CVE-2019-0001".to_owned();
        let metadata = decode_metadata("1.2.3.4", &fields);
        assert!(!metadata.contains_key("cve"));
        assert!(!metadata.contains_key("xref"));
        assert!(!metadata.contains_key("tag"));
    }

    #[test]
    fn short_record() {
        let metadata = decode_metadata("1.2.3.4", &strings(&["a.nasl", "key"]));
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["filename"], "a.nasl");
        assert_eq!(metadata["required_keys"], "key");
    }

    #[test]
    fn refs() {
        let refs = NvtRefs::from_fields(&strings(&["", "", "URL:http://www.mantisbt.org/"]));
        assert_eq!(
            refs,
            NvtRefs {
                cve: strings(&[""]),
                bid: strings(&[""]),
                xref: strings(&["URL:http://www.mantisbt.org/"]),
            }
        );
    }

    #[test]
    fn refs_split_on_comma_and_space() {
        let refs = NvtRefs::from_fields(&strings(&[
            "CVE-2019-0001, CVE-2019-0002",
            "1234",
            "URL:http://example.com/a,b, CERT-BUND:WID-SEC-2023-0001",
        ]));
        assert_eq!(refs.cve, strings(&["CVE-2019-0001", "CVE-2019-0002"]));
        assert_eq!(refs.bid, strings(&["1234"]));
        assert_eq!(
            refs.xref,
            strings(&["URL:http://example.com/a,b", "CERT-BUND:WID-SEC-2023-0001"])
        );
    }

    #[test]
    fn refs_missing_fields() {
        let refs = NvtRefs::from_fields(&strings(&["CVE-2019-0001"]));
        assert_eq!(refs.cve, strings(&["CVE-2019-0001"]));
        assert!(refs.bid.is_empty());
        assert!(refs.xref.is_empty());
    }

    #[test]
    fn serialize_info() {
        let info = NvtInfo {
            oid: "1.2.3".to_owned(),
            metadata: decode_metadata("1.2.3", &mantis()),
            refs: Some(NvtRefs::default()),
            vt_params: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["oid"], "1.2.3");
        assert_eq!(json["qod_type"], "remote_banner");
        assert!(json["refs"]["cve"].as_array().unwrap().is_empty());
        assert!(json["vt_params"].is_null());
    }
}
