use serde_json::Value;

/// A decoded response.
pub type Document = Value;

/// The `continue` object of a response, echoed into the next request.
pub type ContinueToken = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// A file sent as the multipart field `file`.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Attachment {
        Attachment {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// HTTP level authentication sent with a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Auth::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

/// Pull `(module, message)` pairs out of a `warnings` object.
///
/// Handles both `{"main": {"*": "..."}}` and `{"main": {"warnings": "..."}}`.
pub fn warnings(doc: &Document) -> Vec<(String, String)> {
    let Some(warnings) = doc.get("warnings").and_then(Value::as_object) else {
        return Vec::new();
    };

    warnings
        .iter()
        .map(|(module, warning)| {
            let message = match warning {
                Value::String(s) => s.clone(),
                Value::Object(obj) => match obj.get("*").or_else(|| obj.get("warnings")) {
                    Some(Value::String(s)) => s.clone(),
                    _ => warning.to_string(),
                },
                other => other.to_string(),
            };
            (module.clone(), message)
        })
        .collect()
}

/// The `continue` object of a document, if it has one.
pub fn continue_token(doc: &Document) -> Option<&ContinueToken> {
    doc.get("continue").and_then(Value::as_object)
}
