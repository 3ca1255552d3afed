//! Tagged context model.
//!
//! Callers hand the logger a [`Value`]; collections are classified once, at
//! construction, into [`Value::Seq`] (keys were exactly `0..n-1`) or
//! [`Value::Map`] (anything else). The encoder and normalizer only ever look
//! at the tag.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::encode::encode;

/// Key of a [`Value::Map`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl Key {
    pub fn is_name(&self) -> bool {
        matches!(self, Key::Name(_))
    }

    /// Whether a `{<name>}` placeholder refers to this key. Index keys only
    /// match their canonical decimal form, so `{<01>}` is not index 1.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Key::Name(key) => key == name,
            Key::Index(index) => index.to_string() == name,
        }
    }

    /// Fold a name spelled as a canonical integer (`"0"`, `"-3"`, not `"01"`
    /// or `"+1"`) into the index key it denotes.
    pub fn canonical(self) -> Key {
        match self {
            Key::Name(name) => match canonical_index(&name) {
                Some(index) => Key::Index(index),
                None => Key::Name(name),
            },
            index => index,
        }
    }
}

fn canonical_index(name: &str) -> Option<i64> {
    name.parse::<i64>()
        .ok()
        .filter(|index| index.to_string() == name)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{index}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Name(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Name(value.clone())
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Index(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Index(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Index(value as i64)
    }
}

/// Caller-supplied context payload.
///
/// `Map` never holds a key run of exactly `0..n-1` when built through
/// [`Value::from_entries`]; such input becomes a `Seq`. `Opaque` carries a
/// pre-rendered textual form of something that is neither scalar nor
/// collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(Vec<(Key, Value)>),
    Opaque(String),
}

impl Value {
    /// Build a collection from keyed entries.
    ///
    /// Names that spell a canonical integer are stored as index keys, so
    /// `"1"` and `1` are the same entry. A repeated key overwrites the
    /// earlier value in place. If the resulting keys are exactly `0, 1, .., n-1` in that order the
    /// collection is a `Seq`, otherwise a `Map`. An empty input is an
    /// empty `Map`.
    pub fn from_entries<I, K, V>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        let mut out: Vec<(Key, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.into().canonical();
            let value = value.into();
            match out.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }

        let is_list = !out.is_empty()
            && out
                .iter()
                .enumerate()
                .all(|(i, (key, _))| *key == Key::Index(i as i64));

        if is_list {
            Value::Seq(out.into_iter().map(|(_, value)| value).collect())
        } else {
            Value::Map(out)
        }
    }

    /// Convert any `Serialize` type. Serialization failure degrades to an
    /// `Opaque` placeholder naming the type.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Value {
        match serde_json::to_value(value) {
            Ok(json) => Value::from(json),
            Err(e) => Value::Opaque(format!(
                "<unserializable {}: {}>",
                std::any::type_name::<T>(),
                e
            )),
        }
    }

    /// Wrap an arbitrary object through its `Debug` form.
    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Value {
        Value::Opaque(format!("{value:?}"))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Seq(_) | Value::Map(_))
    }

    /// Look up a mapping entry. Only `Map` values resolve.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(key, _)| key.matches(name))
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// String form: scalars as their literal text (null is empty), opaque
    /// values as their stored text, collections as their compact encoding.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Str(s) => s.clone(),
            Value::Opaque(text) => text.clone(),
            Value::Seq(_) | Value::Map(_) => encode(self),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Int(value as i64)
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Str(value.to_string()),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::from_entries(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => {
                let mut entries: Vec<(Key, Value)> = object
                    .into_iter()
                    .map(|(k, v)| (Key::Name(k).canonical(), Value::from(v)))
                    .collect();
                // Object keys come back sorted as text ("10" before "2"); an
                // all-integer key set was an integer-keyed map, put it back
                // in numeric order before classifying.
                if entries.iter().all(|(key, _)| !key.is_name()) {
                    entries.sort_by_key(|(key, _)| match key {
                        Key::Index(index) => *index,
                        Key::Name(_) => i64::MAX,
                    });
                }
                Value::from_entries(entries)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contiguous_index_keys_become_a_sequence() {
        let v = Value::from_entries([(0, "a"), (1, "b")]);
        assert_eq!(v, Value::Seq(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn gapped_or_reordered_keys_stay_a_mapping() {
        let gapped = Value::from_entries([(0, "a"), (2, "b")]);
        assert!(matches!(gapped, Value::Map(ref e) if e.len() == 2));

        let reordered = Value::from_entries([(1, "b"), (0, "a")]);
        assert!(matches!(reordered, Value::Map(_)));

        let empty = Value::from_entries(Vec::<(Key, Value)>::new());
        assert_eq!(empty, Value::Map(vec![]));
    }

    #[test]
    fn repeated_key_overwrites_in_place() {
        let v = Value::from_entries([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(
            v,
            Value::Map(vec![
                (Key::from("a"), Value::Int(3)),
                (Key::from("b"), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn integer_keyed_maps_keep_their_index_keys() {
        let contiguous: BTreeMap<i32, &str> = [(0, "a"), (1, "b")].into_iter().collect();
        assert_eq!(
            Value::from_serialize(&contiguous),
            Value::Seq(vec!["a".into(), "b".into()])
        );
        assert_eq!(encode(&Value::from_serialize(&contiguous)), r#"["a","b"]"#);

        let gapped: BTreeMap<i32, &str> = [(0, "a"), (2, "b")].into_iter().collect();
        let v = Value::from_serialize(&gapped);
        assert_eq!(
            v,
            Value::Map(vec![
                (Key::Index(0), Value::from("a")),
                (Key::Index(2), Value::from("b")),
            ])
        );
        assert!(matches!(
            crate::normalize::normalize(v),
            crate::normalize::Description::Full(_)
        ));

        let long: BTreeMap<i32, i32> = (0..12).map(|i| (i, i)).collect();
        assert!(matches!(Value::from_serialize(&long), Value::Seq(ref items) if items.len() == 12));
    }

    #[test]
    fn numeric_names_fold_into_index_keys() {
        let v = Value::from_entries([(Key::Index(1), "a"), (Key::from("1"), "b")]);
        assert_eq!(v, Value::Map(vec![(Key::Index(1), Value::from("b"))]));
        assert_eq!(encode(&v), r#"{"1":"b"}"#);

        let kept = Value::from_entries([("01", 1), ("+1", 2)]);
        assert!(matches!(kept, Value::Map(ref e) if e.iter().all(|(k, _)| k.is_name())));
    }

    #[test]
    fn placeholders_match_only_canonical_indices() {
        let v = Value::from_entries([(0, "zero"), (2, "two")]);
        assert_eq!(v.get("2"), Some(&Value::from("two")));
        assert_eq!(v.get("02"), None);
        assert_eq!(v.get("+2"), None);
    }

    #[test]
    fn json_objects_become_named_mappings() {
        let v = Value::from(json!({"id": "42", "n": 1, "list": [true, null]}));
        assert_eq!(v.get("id"), Some(&Value::Str("42".into())));
        assert_eq!(v.get("n"), Some(&Value::Int(1)));
        assert_eq!(
            v.get("list"),
            Some(&Value::Seq(vec![Value::Bool(true), Value::Null]))
        );
    }

    #[test]
    fn unserializable_input_degrades_to_opaque() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid json object keys");
        let v = Value::from_serialize(&bad);
        assert!(matches!(v, Value::Opaque(ref s) if s.starts_with("<unserializable")));
    }

    #[test]
    fn scalar_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Int(-7).to_text(), "-7");
        assert_eq!(Value::Float(1.5).to_text(), "1.5");
        assert_eq!(Value::from(u64::MAX).to_text(), u64::MAX.to_string());
    }
}
