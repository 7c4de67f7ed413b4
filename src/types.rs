use std::collections::HashMap;

use serde::Serialize;

/// The typed result of resolving an option.
///
/// Config text is string-in; the function chain declared on an option decides
/// what comes out. An option with no chain resolves to [`Value::Str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<String>),
    Commands(Vec<Vec<String>>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_commands(&self) -> Option<&[Vec<String>]> {
        match self {
            Value::Commands(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value is blank: an empty string or an empty list.
    ///
    /// Booleans are never blank — `false` is a real value, not a missing one.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::Bool(_) => false,
            Value::List(v) => v.is_empty(),
            Value::Commands(v) => v.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v)
    }
}

impl From<Vec<Vec<String>>> for Value {
    fn from(v: Vec<Vec<String>>) -> Self {
        Value::Commands(v)
    }
}

/// How to read a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Extract directives and values (the first, full parse).
    Full,
    /// Update raw values only; previously extracted metadata is left untouched.
    ValuesOnly,
    /// [`Full`](ReadMode::Full) while the metadata store has no sections yet,
    /// [`ValuesOnly`](ReadMode::ValuesOnly) afterwards.
    #[default]
    Auto,
}

/// Command-line values keyed by option name.
///
/// Only options the user actually supplied belong here — an absent option
/// falls through to the environment and config layers. A present empty string
/// still wins over lower layers.
///
/// Non-string values (e.g. a pre-parsed boolean flag result) are returned from
/// resolution as-is, without running the option's function chain.
#[derive(Debug, Clone, Default)]
pub struct ArgValues {
    values: HashMap<String, Value>,
}

impl ArgValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, option: &str, value: impl Into<Value>) {
        self.values.insert(option.to_string(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, option: &str, value: impl Into<Value>) -> Self {
        self.set(option, value);
        self
    }

    pub fn get(&self, option: &str) -> Option<&Value> {
        self.values.get(option)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.values.contains_key(option)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(Value::Str(String::new()).is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(Value::Commands(vec![]).is_blank());
    }

    #[test]
    fn false_is_not_blank() {
        assert!(!Value::Bool(false).is_blank());
        assert!(!Value::Bool(true).is_blank());
    }

    #[test]
    fn non_empty_values_are_not_blank() {
        assert!(!Value::Str("x".into()).is_blank());
        assert!(!Value::List(vec!["x".into()]).is_blank());
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Str("x".into()).as_bool(), None);
        let list = Value::List(vec!["a".into()]);
        assert_eq!(list.as_list().unwrap(), ["a".to_string()]);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&Value::List(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let json = serde_json::to_string(&Value::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }

    #[test]
    fn arg_values_roundtrip() {
        let args = ArgValues::new().with("aa", "xxx").with("flag", true);
        assert!(args.contains("aa"));
        assert_eq!(args.get("aa"), Some(&Value::Str("xxx".into())));
        assert_eq!(args.get("flag"), Some(&Value::Bool(true)));
        assert!(args.get("missing").is_none());
    }

    #[test]
    fn read_mode_defaults_to_auto() {
        assert_eq!(ReadMode::default(), ReadMode::Auto);
    }
}
