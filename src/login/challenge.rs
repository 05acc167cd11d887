use serde::Deserialize;

/// One value the server wants before it completes a login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Parameter name the value is sent under
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Enter without echo
    #[serde(default, deserialize_with = "de::presence")]
    pub sensitive: bool,
    #[serde(default, deserialize_with = "de::presence")]
    pub optional: bool,
    #[serde(default)]
    pub help: Option<String>,
    /// `string`, `password`, `checkbox`, ...
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

/// `clientlogin.requests[]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthRequest {
    /// Example: `MediaWiki\Extension\OATHAuth\Auth\TOTPAuthenticationRequest`
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "de::fields")]
    pub fields: Vec<Field>,
}

/// The server needs more input to finish logging in.
///
/// Answer it with [`crate::Session::continue_login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Must be echoed back when continuing
    pub login_token: String,
    pub message: String,
    pub requests: Vec<AuthRequest>,
}

impl Challenge {
    /// Every requested field, in the order the server listed them.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.requests.iter().flat_map(|req| req.fields.iter())
    }
}

/// Result of a login round that didn't fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { username: String },
    NeedsInteraction(Challenge),
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

/// `{"clientlogin": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ClientLoginResponse {
    pub clientlogin: ClientLogin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClientLogin {
    /// `PASS`, `UI`, `FAIL`, `REDIRECT` or `RESTART`
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messagecode: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "de::requests")]
    pub requests: Vec<AuthRequest>,
}

/// `{"login": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct LegacyLoginResponse {
    pub login: LegacyLogin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacyLogin {
    /// `NeedToken`, `Success`, `Failed`, ...
    pub result: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub lgusername: Option<String>,
    #[serde(default)]
    pub reason: Option<serde_json::Value>,
}

/// `{"query": {"tokens": {"logintoken": "..."}}}`
#[derive(Debug, Deserialize)]
pub(crate) struct TokensResponse {
    pub query: TokensQuery,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokensQuery {
    pub tokens: serde_json::Map<String, serde_json::Value>,
}

mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{AuthRequest, Field};

    /// Booleans are `true`/`false` in formatversion 2 but a present empty
    /// string in formatversion 1.
    pub fn presence<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match <Option<Value>>::deserialize(deserializer)? {
            None => false,
            Some(Value::Bool(b)) => b,
            Some(_) => true,
        })
    }

    /// `{"OATHToken": {...}, ...}` into fields, keeping the server's order.
    ///
    /// An empty PHP array serializes as `[]` instead of `{}`.
    pub fn fields<'de, D>(deserializer: D) -> Result<Vec<Field>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => map
                .into_iter()
                .map(|(id, value)| {
                    let mut field =
                        Field::deserialize(value).map_err(serde::de::Error::custom)?;
                    if field.label.is_empty() {
                        field.label = id.clone();
                    }
                    field.id = id;
                    Ok(field)
                })
                .collect(),
            Value::Array(items) if items.is_empty() => Ok(Vec::new()),
            Value::Null => Ok(Vec::new()),
            other => Err(serde::de::Error::custom(format!(
                "expected an object of fields, got {}",
                other
            ))),
        }
    }

    pub fn requests<'de, D>(deserializer: D) -> Result<Vec<AuthRequest>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(<Option<Vec<AuthRequest>>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClientLoginResponse, Field};

    #[test]
    fn parse_ui_response() {
        let doc = json!({
            "clientlogin": {
                "status": "UI",
                "message": "Enter a verification code from your authenticator app.",
                "messagecode": "oathauth-auth-ui",
                "requests": [{
                    "id": "TOTPAuthenticationRequest",
                    "metadata": {"account": "Example"},
                    "required": "required",
                    "provider": "",
                    "account": "",
                    "fields": {
                        "OATHToken": {
                            "type": "string",
                            "label": "Token",
                            "help": "Verification code from your authenticator app"
                        },
                        "PIN": {
                            "type": "password",
                            "label": "PIN",
                            "sensitive": ""
                        },
                        "remember": {
                            "type": "checkbox",
                            "optional": true
                        }
                    }
                }]
            }
        });

        let resp: ClientLoginResponse = serde_json::from_value(doc).unwrap();
        assert_eq!(resp.clientlogin.status, "UI");
        assert_eq!(resp.clientlogin.messagecode.as_deref(), Some("oathauth-auth-ui"));

        let req = &resp.clientlogin.requests[0];
        assert_eq!(req.id, "TOTPAuthenticationRequest");
        assert_eq!(
            req.fields,
            [
                Field {
                    id: "OATHToken".to_string(),
                    label: "Token".to_string(),
                    sensitive: false,
                    optional: false,
                    help: Some("Verification code from your authenticator app".to_string()),
                    field_type: Some("string".to_string()),
                },
                Field {
                    id: "PIN".to_string(),
                    label: "PIN".to_string(),
                    sensitive: true,
                    optional: false,
                    help: None,
                    field_type: Some("password".to_string()),
                },
                Field {
                    id: "remember".to_string(),
                    label: "remember".to_string(),
                    sensitive: false,
                    optional: true,
                    help: None,
                    field_type: Some("checkbox".to_string()),
                },
            ]
        );
    }

    #[test]
    fn parse_pass_response() {
        let doc = json!({"clientlogin": {"status": "PASS", "username": "Example"}});

        let resp: ClientLoginResponse = serde_json::from_value(doc).unwrap();
        assert_eq!(resp.clientlogin.status, "PASS");
        assert_eq!(resp.clientlogin.username.as_deref(), Some("Example"));
        assert!(resp.clientlogin.requests.is_empty());
    }

    #[test]
    fn fields_keep_server_order() {
        let body = r#"{"clientlogin": {"status": "UI", "requests": [
            {"id": "B", "fields": {"zeta": {"type": "string"}, "alpha": {"type": "password", "sensitive": ""}}},
            {"id": "A", "fields": {"mid": {"type": "string"}}}
        ]}}"#;

        let resp: ClientLoginResponse = serde_json::from_str(body).unwrap();
        let challenge = super::Challenge {
            login_token: String::new(),
            message: String::new(),
            requests: resp.clientlogin.requests,
        };
        let ids = challenge
            .fields()
            .map(|field| (field.id.as_str(), field.sensitive))
            .collect::<Vec<_>>();

        assert_eq!(ids, [("zeta", false), ("alpha", true), ("mid", false)]);
    }

    #[test]
    fn parse_empty_fields_array() {
        let doc = json!({
            "clientlogin": {
                "status": "UI",
                "requests": [{"id": "CaptchaAuthenticationRequest", "fields": []}]
            }
        });

        let resp: ClientLoginResponse = serde_json::from_value(doc).unwrap();
        assert!(resp.clientlogin.requests[0].fields.is_empty());
    }
}
