//! Dynamic values produced by transforms.
//!
//! Every capture that survives a parse ends up as a [`Value`]: matched text
//! becomes [`Value::Str`], sequences of captures become [`Value::List`] and
//! transforms are free to build anything else out of them.

use std::fmt::{self, Display};

use hashlink::LinkedHashMap;
use rustc_hash::FxBuildHasher;

/// An insertion-ordered string map.
pub type Map = LinkedHashMap<String, Value, FxBuildHasher>;

/// A value flowing through transforms and validators.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent matches, or the placeholder left by an epsilon term.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Captured or computed text.
    Str(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// An ordered map from names to values.
    Map(Map),
}

impl Value {
    /// Build a [`Value::Map`] from key/value pairs, keeping their order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut map = Map::default();
        for (key, value) in entries {
            map.insert(key.into(), value);
        }
        Value::Map(map)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integer view of the value; floats are accepted only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::Float(f) if f.fract() == 0.0 => Some(f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when the value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Spread the value into positional arguments.
    ///
    /// A list yields its items, anything else becomes a single argument.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }
}

macro_rules! impl_value_from {
    ($($type:ty => $variant:ident),+$(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Self {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

impl_value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    String => Str,
    &str => Str,
    Vec<Value> => List,
    Map => Map,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn spreading_lists_and_scalars() {
        let list = Value::from(vec![Value::from("a"), Value::Null]);
        assert_eq!(list.into_list(), vec![Value::from("a"), Value::Null]);
        assert_eq!(Value::from(3).into_list(), vec![Value::Int(3)]);
        assert_eq!(Value::Null.into_list(), vec![Value::Null]);
    }

    #[test]
    fn numeric_views() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::from("4").as_f64(), None);
    }

    #[test]
    fn options_collapse_to_null() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn maps_keep_insertion_order() {
        let value = Value::map([("b", Value::Int(1)), ("a", Value::Int(2))]);
        let keys: Vec<_> = value.as_map().into_iter().flat_map(|m| m.keys()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(value.get("a"), Some(&Value::Int(2)));
        assert_eq!(value.to_string(), r#"{"b": 1, "a": 2}"#);
    }

    #[test]
    fn display_nested() {
        let value = Value::from(vec![Value::from("x"), Value::Bool(true), Value::Null]);
        assert_eq!(value.to_string(), r#"["x", true, null]"#);
    }
}
