//! Logical request parameters and their wire encoding.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Separator the API uses for multi-value parameters.
pub const LIST_SEPARATOR: &str = "|";

/// A single logical parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
    /// `true` is sent as an empty value, `false` isn't sent at all.
    Flag(bool),
}

impl ParamValue {
    /// Wire representation, `None` if the parameter must be left out.
    pub fn encode(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::List(items) => Some(items.join(LIST_SEPARATOR)),
            ParamValue::Flag(true) => Some(String::new()),
            ParamValue::Flag(false) => None,
        }
    }

    /// Convert a value found in a server document (e.g. a `continue` field).
    ///
    /// `null` maps to `None`.
    pub fn from_json(value: &Value) -> Option<ParamValue> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(ParamValue::Flag(*b)),
            Value::String(s) => Some(ParamValue::Text(s.clone())),
            Value::Number(n) => Some(ParamValue::Text(n.to_string())),
            Value::Array(items) => Some(ParamValue::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            Value::Object(_) => Some(ParamValue::Text(value.to_string())),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Text(value.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::List(items.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for ParamValue {
    fn from(items: &[T]) -> Self {
        ParamValue::List(items.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(items: [T; N]) -> Self {
        ParamValue::List(items.iter().map(ToString::to_string).collect())
    }
}

/// Ordered mapping of parameter names to logical values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Params {
        Params(BTreeMap::new())
    }

    /// Builder-style [`Params::insert`].
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Params {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode into wire form, merging `query_continue` over the caller's values.
    pub fn normalize(&self, query_continue: Option<&Map<String, Value>>) -> Normalized {
        let mut normal = Normalized(
            self.0
                .iter()
                .filter_map(|(k, v)| v.encode().map(|v| (k.clone(), v)))
                .collect(),
        );
        if let Some(token) = query_continue {
            normal.merge_continue(token);
        }
        normal.0.insert("format".to_string(), "json".to_string());
        normal
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Build [`Params`] from `key => value` pairs.
///
/// ```
/// let params = mwapi::params! { "action" => "query", "list" => "watchlist", "wllimit" => 10 };
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $( params.insert($key, $value); )+
        params
    }};
}

/// Parameters in wire form: every value is a string, `format` is always `json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized(BTreeMap<String, String>);

impl Normalized {
    /// Merge a `continue` object, overwriting same-named parameters.
    pub fn merge_continue(&mut self, token: &Map<String, Value>) {
        for (key, value) in token {
            match ParamValue::from_json(value).and_then(|v| v.encode()) {
                Some(value) => {
                    self.0.insert(key.clone(), value);
                }
                None => {
                    self.0.remove(key);
                }
            }
        }
        self.0.insert("format".to_string(), "json".to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ParamValue, Params};

    #[test]
    fn lists_are_pipe_joined() {
        let normal = params! { "revids" => vec![1, 2, 3], "titles" => ["Foo", "Bar"] }.normalize(None);

        assert_eq!(normal.get("revids"), Some("1|2|3"));
        assert_eq!(normal.get("titles"), Some("Foo|Bar"));
    }

    #[test]
    fn flags_use_presence() {
        let normal = params! { "redirects" => true, "watch" => false }.normalize(None);

        assert_eq!(normal.get("redirects"), Some(""));
        assert!(!normal.contains_key("watch"));
    }

    #[test]
    fn scalars_are_stringified() {
        let normal = params! { "action" => "query", "wllimit" => 10, "maxlag" => 2.5 }
            .normalize(None);

        assert_eq!(normal.get("action"), Some("query"));
        assert_eq!(normal.get("wllimit"), Some("10"));
        assert_eq!(normal.get("maxlag"), Some("2.5"));
    }

    #[test]
    fn format_is_always_json() {
        let normal = params! { "format" => "xml" }.normalize(None);
        assert_eq!(normal.get("format"), Some("json"));

        let normal = Params::new().normalize(None);
        assert_eq!(normal.get("format"), Some("json"));
    }

    #[test]
    fn continuation_overrides_caller() {
        let token = json!({"rvcontinue": "20240101|42", "continue": "||", "limit": 5});
        let normal = params! { "rvcontinue" => "stale", "action" => "query" }
            .normalize(token.as_object());

        assert_eq!(normal.get("rvcontinue"), Some("20240101|42"));
        assert_eq!(normal.get("continue"), Some("||"));
        assert_eq!(normal.get("limit"), Some("5"));
        assert_eq!(normal.get("action"), Some("query"));
    }

    #[test]
    fn continuation_cannot_change_format() {
        let token = json!({"format": "php"});
        let normal = Params::new().normalize(token.as_object());

        assert_eq!(normal.get("format"), Some("json"));
    }

    #[test]
    fn json_values() {
        assert_eq!(ParamValue::from_json(&json!(null)), None);
        assert_eq!(ParamValue::from_json(&json!(false)), Some(ParamValue::Flag(false)));
        assert_eq!(
            ParamValue::from_json(&json!(["a", 1])),
            Some(ParamValue::List(vec!["a".to_string(), "1".to_string()]))
        );
    }
}
