//! Validation of one manifest element into a typed entry.

use serde_json::Value;
use std::fmt;

use crate::checksum::{Algorithm, Checksums};

/// One validated manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Destination path relative to the target directory.
    pub name: String,
    pub url: String,
    /// Expected digests; keys other than the supported algorithms are ignored.
    pub checksums: Checksums,
}

/// Why a manifest element was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidEntry {
    NotAnObject,
    MissingUrl,
    MissingName,
    NotAString { field: String },
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidEntry::NotAnObject => write!(f, "entry is not an object"),
            InvalidEntry::MissingUrl => write!(f, "missing \"url\" in entry"),
            InvalidEntry::MissingName => write!(f, "missing \"name\" in entry"),
            InvalidEntry::NotAString { field } => {
                write!(f, "\"{}\" in entry is not a string", field)
            }
        }
    }
}

impl std::error::Error for InvalidEntry {}

impl ManifestEntry {
    /// Validate a raw JSON element. `url` is checked before `name`.
    pub fn from_value(value: &Value) -> Result<ManifestEntry, InvalidEntry> {
        let obj = value.as_object().ok_or(InvalidEntry::NotAnObject)?;
        let string_field = |key: &str| -> Result<Option<String>, InvalidEntry> {
            match obj.get(key) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(InvalidEntry::NotAString {
                    field: key.to_string(),
                }),
            }
        };

        let url = string_field("url")?.ok_or(InvalidEntry::MissingUrl)?;
        let name = string_field("name")?.ok_or(InvalidEntry::MissingName)?;

        let mut checksums = Checksums::new();
        for algorithm in Algorithm::ALL {
            if let Some(expected) = string_field(algorithm.key())? {
                checksums.insert(algorithm, expected);
            }
        }

        Ok(ManifestEntry {
            name,
            url,
            checksums,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_entry() {
        let v = json!({
            "name": "dir/a.bin",
            "url": "https://example.com/a.bin",
            "md5": "m",
            "sha256": "s",
            "blake3": "ignored",
            "size": 12
        });
        let e = ManifestEntry::from_value(&v).unwrap();
        assert_eq!(e.name, "dir/a.bin");
        assert_eq!(e.url, "https://example.com/a.bin");
        assert_eq!(e.checksums.len(), 2);
        assert_eq!(e.checksums[&Algorithm::Md5], "m");
        assert_eq!(e.checksums[&Algorithm::Sha256], "s");
    }

    #[test]
    fn no_checksums() {
        let e = ManifestEntry::from_value(&json!({"name": "a", "url": "u"})).unwrap();
        assert!(e.checksums.is_empty());
    }

    #[test]
    fn missing_fields() {
        assert_eq!(
            ManifestEntry::from_value(&json!({"name": "a"})),
            Err(InvalidEntry::MissingUrl)
        );
        assert_eq!(
            ManifestEntry::from_value(&json!({"url": "u"})),
            Err(InvalidEntry::MissingName)
        );
        assert_eq!(
            ManifestEntry::from_value(&json!({})),
            Err(InvalidEntry::MissingUrl)
        );
    }

    #[test]
    fn not_an_object() {
        for v in [json!("x"), json!(1), json!(null), json!(["name", "url"])] {
            assert_eq!(ManifestEntry::from_value(&v), Err(InvalidEntry::NotAnObject));
        }
    }

    #[test]
    fn non_string_fields() {
        assert_eq!(
            ManifestEntry::from_value(&json!({"name": 1, "url": "u"})),
            Err(InvalidEntry::NotAString {
                field: "name".to_string()
            })
        );
        assert_eq!(
            ManifestEntry::from_value(&json!({"name": "a", "url": "u", "sha1": null})),
            Err(InvalidEntry::NotAString {
                field: "sha1".to_string()
            })
        );
    }

    #[test]
    fn display_messages() {
        assert_eq!(InvalidEntry::MissingUrl.to_string(), "missing \"url\" in entry");
        assert_eq!(
            InvalidEntry::NotAString {
                field: "md5".into()
            }
            .to_string(),
            "\"md5\" in entry is not a string"
        );
    }
}
