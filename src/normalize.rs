//! Context normalization.
//!
//! Turns an arbitrary [`Value`] into the description shape stored on a
//! record: either a flat string-to-string mapping, or one descriptive
//! string.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::encode::encode;
use crate::pretty::pretty_print;
use crate::value::{Key, Value};

/// Mappings with this many entries or more are described as one blob.
pub const MAX_FLAT_ENTRIES: usize = 30;

/// Reserved key a [`Description::Full`] is stored under.
pub const FULL_DESCRIPTION_KEY: &str = "full_description";

/// Normalized form of a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Flat(Vec<(String, String)>),
    Full(String),
}

impl Description {
    /// The description as an encodable value.
    pub fn to_value(&self) -> Value {
        match self {
            Description::Flat(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Key::Name(k.clone()), Value::Str(v.clone())))
                    .collect(),
            ),
            Description::Full(text) => Value::Map(vec![(
                Key::Name(FULL_DESCRIPTION_KEY.to_string()),
                Value::Str(text.clone()),
            )]),
        }
    }
}

impl Serialize for Description {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Description::Flat(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Description::Full(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(FULL_DESCRIPTION_KEY, text)?;
                map.end()
            }
        }
    }
}

/// Normalize a context into a [`Description`]. Never fails.
pub fn normalize(context: Value) -> Description {
    match context {
        Value::Map(entries) if is_flat_candidate(&entries) => Description::Flat(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), describe_entry(&value)))
                .collect(),
        ),
        collection @ (Value::Seq(_) | Value::Map(_)) => {
            Description::Full(pretty_print(&encode(&collection)))
        }
        scalar_or_opaque => Description::Full(scalar_or_opaque.to_text()),
    }
}

fn is_flat_candidate(entries: &[(Key, Value)]) -> bool {
    entries.len() < MAX_FLAT_ENTRIES && entries.iter().any(|(key, _)| key.is_name())
}

fn describe_entry(value: &Value) -> String {
    if value.is_collection() {
        pretty_print(&encode(value))
    } else {
        value.to_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn small_named_mapping_is_flat() {
        let d = normalize(Value::from(json!({"a": 1, "b": 2})));
        assert_eq!(
            d,
            Description::Flat(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
        );
    }

    #[test]
    fn sequence_is_one_pretty_blob() {
        let d = normalize(Value::from(vec![1, 2, 3]));
        assert_eq!(d, Description::Full("[\n\t1,\n\t2,\n\t3\n]".to_string()));
    }

    #[test]
    fn scalars_are_full_descriptions() {
        assert_eq!(normalize(Value::Null), Description::Full(String::new()));
        assert_eq!(normalize(Value::from(3.5)), Description::Full("3.5".into()));
        assert_eq!(normalize(Value::from("plain")), Description::Full("plain".into()));
        assert_eq!(
            normalize(Value::Opaque("Socket { fd: 3 }".into())),
            Description::Full("Socket { fd: 3 }".into())
        );
    }

    #[test]
    fn empty_mapping_is_full() {
        let d = normalize(Value::from_entries(Vec::<(Key, Value)>::new()));
        assert_eq!(d, Description::Full("{\n}".to_string()));
    }

    #[test]
    fn index_only_mapping_is_full() {
        let d = normalize(Value::from_entries([(0, "a"), (2, "b")]));
        assert_eq!(d, Description::Full("{\n\t\"0\": \"a\",\n\t\"2\": \"b\"\n}".to_string()));
    }

    #[test]
    fn thirty_entries_is_full() {
        let wide = Value::from_entries((0..MAX_FLAT_ENTRIES).map(|i| (format!("k{i}"), i)));
        assert!(matches!(normalize(wide), Description::Full(_)));

        let narrow = Value::from_entries((0..MAX_FLAT_ENTRIES - 1).map(|i| (format!("k{i}"), i)));
        assert!(matches!(normalize(narrow), Description::Flat(ref e) if e.len() == 29));
    }

    #[test]
    fn nested_values_are_pretty_printed_in_place() {
        let d = normalize(Value::from_entries([
            (Key::from("detail"), Value::from(json!({"code": 500}))),
            (Key::Index(7), Value::from(vec![true])),
            (Key::from("who"), Value::Opaque("Peer(1)".into())),
        ]));
        assert_eq!(
            d,
            Description::Flat(vec![
                ("detail".to_string(), "{\n\t\"code\": 500\n}".to_string()),
                ("7".to_string(), "[\n\ttrue\n]".to_string()),
                ("who".to_string(), "Peer(1)".to_string()),
            ])
        );
    }

    #[test]
    fn serializes_like_the_encoder() {
        let flat = normalize(Value::from(json!({"a": "x"})));
        assert_eq!(serde_json::to_string(&flat).unwrap(), encode(&flat.to_value()));

        let full = normalize(Value::from("s"));
        assert_eq!(serde_json::to_string(&full).unwrap(), r#"{"full_description":"s"}"#);
    }
}
