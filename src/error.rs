use serde::Deserialize;
use thiserror::Error;

/// Number of characters of an undecodable body kept for diagnostics.
pub const DECODE_EXCERPT_LEN: usize = 350;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("couldn't connect: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("too many redirects: {0}")]
    TooManyRedirects(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("could not decode as json:\n{excerpt}")]
    Decode {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{code}: {info} -- {}", .content.as_deref().unwrap_or("None"))]
    Api {
        code: String,
        info: String,
        content: Option<String>,
    },
    #[error("{status} -- {message}")]
    Login { status: String, message: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("couldn't start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Code of an [`Error::Api`], `None` for every other kind.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub(crate) fn decode(body: &str, source: serde_json::Error) -> Error {
        Error::Decode {
            excerpt: body.chars().take(DECODE_EXCERPT_LEN).collect(),
            source,
        }
    }
}

/// Transport failures are checked in order: timeout, connection, redirect.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else if err.is_connect() {
            Error::Connection(err)
        } else if err.is_redirect() {
            Error::TooManyRedirects(err)
        } else {
            Error::Request(err)
        }
    }
}

/// The `error` object of a response document.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDoc {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    info: Option<String>,
    #[serde(rename = "*", default)]
    content: Option<serde_json::Value>,
}

impl ApiErrorDoc {
    /// Classify the `error` member of a document.
    ///
    /// A member that isn't an error object still counts as an API error,
    /// with the raw value as `info`.
    pub(crate) fn into_error(value: serde_json::Value) -> Error {
        match serde_json::from_value::<ApiErrorDoc>(value.clone()) {
            Ok(doc) => doc.into(),
            Err(_) => Error::Api {
                code: String::new(),
                info: match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                content: None,
            },
        }
    }
}

impl From<ApiErrorDoc> for Error {
    fn from(doc: ApiErrorDoc) -> Self {
        Error::Api {
            code: doc.code.unwrap_or_default(),
            info: doc.info.unwrap_or_default(),
            content: doc.content.map(|content| match content {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
        }
    }
}
