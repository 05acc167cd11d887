//! Logging a [`Session`] in and out.
//!
//! Passwords only live on the stack of these functions and are never logged.

use serde::de::DeserializeOwned;

use super::challenge::{
    Challenge, ClientLogin, ClientLoginResponse, LegacyLogin, LegacyLoginResponse, LoginOutcome,
    TokensResponse,
};
use crate::api::{AuthState, Document};
use crate::config::LoginFlow;
use crate::params::{ParamValue, Params};
use crate::{params, Error, Result, Session};

/// `clientlogin` insists on a return URL even when no redirect happens.
const LOGIN_RETURN_URL: &str = "http://example.org/";

fn parse<T: DeserializeOwned>(doc: Document, what: &str) -> Result<T> {
    serde_json::from_value(doc)
        .map_err(|err| Error::UnexpectedResponse(format!("couldn't parse {}: {}", what, err)))
}

impl ClientLogin {
    fn into_error(self) -> Error {
        Error::Login {
            status: self.status,
            message: self.message.or(self.messagecode).unwrap_or_default(),
        }
    }
}

impl LegacyLogin {
    fn into_error(self) -> Error {
        let message = match self.reason {
            Some(serde_json::Value::String(reason)) => reason,
            Some(reason) => reason.to_string(),
            None => String::new(),
        };
        Error::Login {
            status: self.result,
            message,
        }
    }
}

impl Session {
    /// Fetch a token of the given kind (`login`, `csrf`, `watch`, ...).
    pub async fn token(&self, kind: &str) -> Result<String> {
        let doc = self
            .post(params! { "action" => "query", "meta" => "tokens", "type" => kind })
            .await?;
        let key = format!("{}token", kind);

        parse::<TokensResponse>(doc, "tokens")?
            .query
            .tokens
            .get(&key)
            .and_then(|token| token.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::UnexpectedResponse(format!("no {} in response", key)))
    }

    /// Authenticate with the given credentials.
    ///
    /// The password is sent as-is, use an `https` host to keep it secret.
    /// Fails with [`Error::Login`] if the server rejects the credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        self.login_with_token(username, password, None).await
    }

    /// Like [`Session::login`] but reuses a login token that was fetched before.
    pub async fn login_with_token(
        &self,
        username: &str,
        password: &str,
        login_token: Option<String>,
    ) -> Result<LoginOutcome> {
        match self.login_flow() {
            LoginFlow::ClientLogin => self.client_login(username, password, login_token).await,
            LoginFlow::Legacy => self.legacy_login(username, password, login_token).await,
        }
    }

    /// Answer a [`Challenge`] with values for its fields.
    ///
    /// Can return another challenge, e.g. a second factor after a captcha.
    pub async fn continue_login<K, V>(
        &self,
        login_token: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<LoginOutcome>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut params = values.into_iter().collect::<Params>();
        params.insert("action", "clientlogin");
        params.insert("logintoken", login_token);
        params.insert("logincontinue", true);

        let doc = self.post(params).await?;
        let pending = match self.auth_state() {
            AuthState::Pending(username) => Some(username),
            _ => None,
        };
        self.client_login_result(login_token.to_string(), doc, pending)
            .await
    }

    /// Log out and forget the logged in user.
    ///
    /// The session counts as logged out afterwards even if the server
    /// rejected the request. Only transport failures are returned.
    pub async fn logout(&self) -> Result<()> {
        let mut params = params! { "action" => "logout" };
        match self.token("csrf").await {
            Ok(token) => params.insert("token", token),
            Err(err @ Error::Api { .. }) | Err(err @ Error::UnexpectedResponse(_)) => {
                log::debug!("logging out without csrf token: {}", err)
            }
            Err(err) => {
                self.set_auth_state(AuthState::LoggedOut);
                return Err(err);
            }
        }

        let result = self.post(params).await;
        self.set_auth_state(AuthState::LoggedOut);

        match result {
            Ok(_) => {
                log::info!("logged out");
                Ok(())
            }
            Err(err @ Error::Api { .. }) => {
                log::warn!("server rejected logout: {}", err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn client_login(
        &self,
        username: &str,
        password: &str,
        login_token: Option<String>,
    ) -> Result<LoginOutcome> {
        let login_token = match login_token {
            Some(token) => token,
            None => self.token("login").await?,
        };

        let doc = self
            .post(params! {
                "action" => "clientlogin",
                "username" => username,
                "password" => password,
                "logintoken" => &login_token,
                "loginreturnurl" => LOGIN_RETURN_URL,
            })
            .await?;

        self.client_login_result(login_token, doc, Some(username.to_string()))
            .await
    }

    async fn client_login_result(
        &self,
        login_token: String,
        doc: Document,
        username: Option<String>,
    ) -> Result<LoginOutcome> {
        let ClientLoginResponse { clientlogin } = parse(doc, "clientlogin")?;

        match clientlogin.status.as_str() {
            "PASS" => {
                let username = match clientlogin.username.or(username) {
                    Some(username) => username,
                    None => self.whoami().await?,
                };
                Ok(self.authenticated(username))
            }
            "UI" => {
                if let Some(username) = username {
                    self.set_auth_state(AuthState::Pending(username));
                }
                Ok(LoginOutcome::NeedsInteraction(Challenge {
                    login_token,
                    message: clientlogin.message.unwrap_or_default(),
                    requests: clientlogin.requests,
                }))
            }
            _ => {
                if let AuthState::Pending(_) = self.auth_state() {
                    self.set_auth_state(AuthState::LoggedOut);
                }
                Err(clientlogin.into_error())
            }
        }
    }

    async fn legacy_login(
        &self,
        username: &str,
        password: &str,
        login_token: Option<String>,
    ) -> Result<LoginOutcome> {
        let login_token = match login_token {
            Some(token) => token,
            None => {
                let doc = self
                    .post(params! {
                        "action" => "login",
                        "lgname" => username,
                        "lgpassword" => password,
                    })
                    .await?;
                let LegacyLoginResponse { login } = parse(doc, "login")?;

                match login.result.as_str() {
                    // older servers accept the credentials right away
                    "Success" => {
                        let username = login.lgusername.unwrap_or_else(|| username.to_string());
                        return Ok(self.authenticated(username));
                    }
                    "NeedToken" => login.token.ok_or_else(|| {
                        Error::UnexpectedResponse("no login.token in response".to_string())
                    })?,
                    _ => return Err(login.into_error()),
                }
            }
        };

        let doc = self
            .post(params! {
                "action" => "login",
                "lgname" => username,
                "lgpassword" => password,
                "lgtoken" => login_token,
            })
            .await?;
        let LegacyLoginResponse { login } = parse(doc, "login")?;

        match login.result.as_str() {
            "Success" => {
                let username = login.lgusername.unwrap_or_else(|| username.to_string());
                Ok(self.authenticated(username))
            }
            _ => Err(login.into_error()),
        }
    }

    /// Name of the user the session's cookies belong to.
    async fn whoami(&self) -> Result<String> {
        let doc = self
            .get(params! { "action" => "query", "meta" => "userinfo" })
            .await?;
        let userinfo = &doc["query"]["userinfo"];
        if userinfo.get("anon").is_some() {
            return Err(Error::UnexpectedResponse(
                "login passed but the session is still anonymous".to_string(),
            ));
        }
        userinfo["name"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::UnexpectedResponse("no query.userinfo.name in response".to_string()))
    }

    fn authenticated(&self, username: String) -> LoginOutcome {
        log::info!("logged in as {}", username);
        self.set_auth_state(AuthState::LoggedIn(username.clone()));
        LoginOutcome::Authenticated { username }
    }
}
