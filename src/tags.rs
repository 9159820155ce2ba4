// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use std::collections::BTreeMap;

use crate::schema::{TAG_SEPARATOR, TAG_VALUE_SEPARATOR};

/// Parses a tag string in the form of `key=value|key=value`.
///
/// Values may contain `=` as only the first one separates key and value.
/// Segments without a value are logged and skipped, the oid is only used
/// for that log message.
pub fn parse_tags(tags: &str, oid: &str) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for tag in tags.split(TAG_SEPARATOR) {
        match tag.split_once(TAG_VALUE_SEPARATOR) {
            Some((key, value)) => {
                result.insert(key.to_owned(), value.to_owned());
            }
            None => tracing::error!(tag, oid, "Tag has no value."),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::parse_tags;

    #[test]
    #[traced_test]
    fn missing_value() {
        let tags = parse_tags("tag1", "1.2.3");
        assert!(tags.is_empty());
        assert!(logs_contain("Tag has no value."));
        assert!(logs_contain("tag1"));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("Tag has no value.")).count() {
                1 => Ok(()),
                n => Err(format!("expected one event, got {n}")),
            }
        });
    }

    #[test]
    fn single() {
        let tags = parse_tags("tag1=value1", "1.2.3");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("tag1").map(String::as_str), Some("value1"));
    }

    #[test]
    fn multiple() {
        let tags = parse_tags("tag1=value1|foo=bar", "1.2.3");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["tag1"], "value1");
        assert_eq!(tags["foo"], "bar");
    }

    #[test]
    fn value_contains_separator() {
        let tags = parse_tags(
            "cvss_base_vector=AV:N/AC:L|solution=set a=b in config",
            "1.2.3",
        );
        assert_eq!(tags["cvss_base_vector"], "AV:N/AC:L");
        assert_eq!(tags["solution"], "set a=b in config");
    }

    #[test]
    #[traced_test]
    fn malformed_segments_are_skipped() {
        let tags = parse_tags("qod_type=package|broken|affected=rubygems", "1.2.3");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["qod_type"], "package");
        assert_eq!(tags["affected"], "rubygems");
        assert!(logs_contain("broken"));
    }

    #[test]
    fn empty() {
        // an empty field is a single segment without a value
        assert!(parse_tags("", "1.2.3").is_empty());
    }

    #[test]
    fn empty_value() {
        let tags = parse_tags("summary=", "1.2.3");
        assert_eq!(tags["summary"], "");
    }
}
