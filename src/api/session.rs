//! Exposes a `Session` struct to interact with the API.

use std::time::Duration;

use parking_lot::Mutex;

use super::continuation::Continuation;
use super::model::{Attachment, Auth, ContinueToken, Document, Method};
use super::transport::{Exchange, Transport};
use crate::config::LoginFlow;
use crate::{Config, Params, Result};

/// A connection to one MediaWiki API.
///
/// Every request shares the same cookie store, so a successful
/// [`Session::login`] authenticates all later requests of this session.
pub struct Session {
    /// Sends the requests
    transport: Transport,
    /// Protocol used by `login`
    login_flow: LoginFlow,
    /// Changed by `login`, `continue_login` and `logout`
    state: Mutex<AuthState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthState {
    LoggedOut,
    /// Waiting for `continue_login`
    Pending(String),
    LoggedIn(String),
}

impl Session {
    /// Create a session with its own cookie-enabled HTTP client.
    pub fn new(config: Config) -> Result<Session> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        Session::with_client(config, client)
    }

    /// Create a session on top of an existing client, e.g. to share a
    /// connection pool.
    ///
    /// The client needs a cookie store for logins to stick.
    pub fn with_client(config: Config, client: reqwest::Client) -> Result<Session> {
        Ok(Session {
            transport: Transport::new(&config, client)?,
            login_flow: config.login_flow,
            state: Mutex::new(AuthState::LoggedOut),
        })
    }

    /// Create a session from `MWAPI_*` environment variables.
    pub fn from_env() -> Result<Session> {
        Session::new(Config::from_env()?)
    }

    pub fn api_url(&self) -> &str {
        self.transport.api_url()
    }

    pub fn login_flow(&self) -> LoginFlow {
        self.login_flow
    }

    /// Start building a request.
    pub fn request(&self, method: Method, params: Params) -> Request<'_> {
        Request {
            session: self,
            method,
            params,
            query_continue: None,
            attachment: None,
            auth: None,
            timeout: None,
        }
    }

    /// Make a `GET` request, parameters go in the query string.
    pub async fn get(&self, params: Params) -> Result<Document> {
        self.request(Method::Get, params).send().await
    }

    /// Make a `GET` request and follow its continuations.
    pub fn get_continued(&self, params: Params) -> Continuation<'_> {
        self.request(Method::Get, params).continuation()
    }

    /// Make a `POST` request, parameters go in the body.
    pub async fn post(&self, params: Params) -> Result<Document> {
        self.request(Method::Post, params).send().await
    }

    /// Make a `POST` request and follow its continuations.
    pub fn post_continued(&self, params: Params) -> Continuation<'_> {
        self.request(Method::Post, params).continuation()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.lock(), AuthState::LoggedIn(_))
    }

    /// Name of the logged in user.
    pub fn username(&self) -> Option<String> {
        match &*self.state.lock() {
            AuthState::LoggedIn(username) => Some(username.clone()),
            _ => None,
        }
    }

    pub(crate) fn auth_state(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub(crate) fn set_auth_state(&self, state: AuthState) {
        *self.state.lock() = state;
    }
}

/// A request that hasn't been sent yet, see [`Session::request`].
#[must_use]
pub struct Request<'a> {
    session: &'a Session,
    method: Method,
    params: Params,
    query_continue: Option<ContinueToken>,
    attachment: Option<Attachment>,
    auth: Option<Auth>,
    timeout: Option<Duration>,
}

impl<'a> Request<'a> {
    /// Resume from the `continue` field of an earlier response.
    pub fn query_continue(mut self, token: ContinueToken) -> Request<'a> {
        self.query_continue = Some(token);
        self
    }

    /// Upload a file with a `POST` request.
    pub fn attachment(mut self, attachment: Attachment) -> Request<'a> {
        self.attachment = Some(attachment);
        self
    }

    pub fn auth(mut self, auth: Auth) -> Request<'a> {
        self.auth = Some(auth);
        self
    }

    /// Override the session's timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Request<'a> {
        self.timeout = Some(timeout);
        self
    }

    /// Send a single request.
    pub async fn send(self) -> Result<Document> {
        let params = self.params.normalize(self.query_continue.as_ref());
        self.session
            .transport
            .send(Exchange {
                method: self.method,
                params: &params,
                attachment: self.attachment,
                auth: self.auth.as_ref(),
                timeout: self.timeout,
            })
            .await
    }

    /// Send the request and keep following `continue` fields.
    pub fn continuation(self) -> Continuation<'a> {
        let params = self.params.normalize(self.query_continue.as_ref());
        Continuation::new(
            &self.session.transport,
            self.method,
            params,
            self.attachment,
            self.auth,
            self.timeout,
        )
    }
}
