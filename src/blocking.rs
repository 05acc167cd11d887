//! Synchronous wrapper around [`crate::Session`].
//!
//! Every call blocks the current thread on a private runtime, so these
//! types must not be used from inside an async context.

use std::time::Duration;

use futures::StreamExt;
use tokio::runtime::Runtime;

use crate::api::{self, Attachment, Auth, ContinueToken, Document, Method};
use crate::login::LoginOutcome;
use crate::params::ParamValue;
use crate::{Config, Error, Params, Result};

pub struct Session {
    runtime: Runtime,
    inner: api::Session,
}

impl Session {
    pub fn new(config: Config) -> Result<Session> {
        Session::from_async(api::Session::new(config)?)
    }

    pub fn with_client(config: Config, client: reqwest::Client) -> Result<Session> {
        Session::from_async(api::Session::with_client(config, client)?)
    }

    pub fn from_env() -> Result<Session> {
        Session::new(Config::from_env()?)
    }

    fn from_async(inner: api::Session) -> Result<Session> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        Ok(Session { runtime, inner })
    }

    /// The wrapped async session.
    pub fn inner(&self) -> &api::Session {
        &self.inner
    }

    pub fn request(&self, method: Method, params: Params) -> Request<'_> {
        Request {
            runtime: &self.runtime,
            inner: self.inner.request(method, params),
        }
    }

    pub fn get(&self, params: Params) -> Result<Document> {
        self.runtime.block_on(self.inner.get(params))
    }

    pub fn get_continued(&self, params: Params) -> Continuation<'_> {
        self.request(Method::Get, params).continuation()
    }

    pub fn post(&self, params: Params) -> Result<Document> {
        self.runtime.block_on(self.inner.post(params))
    }

    pub fn post_continued(&self, params: Params) -> Continuation<'_> {
        self.request(Method::Post, params).continuation()
    }

    pub fn token(&self, kind: &str) -> Result<String> {
        self.runtime.block_on(self.inner.token(kind))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        self.runtime.block_on(self.inner.login(username, password))
    }

    pub fn login_with_token(
        &self,
        username: &str,
        password: &str,
        login_token: Option<String>,
    ) -> Result<LoginOutcome> {
        self.runtime
            .block_on(self.inner.login_with_token(username, password, login_token))
    }

    pub fn continue_login<K, V>(
        &self,
        login_token: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<LoginOutcome>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.runtime
            .block_on(self.inner.continue_login(login_token, values))
    }

    pub fn logout(&self) -> Result<()> {
        self.runtime.block_on(self.inner.logout())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    pub fn username(&self) -> Option<String> {
        self.inner.username()
    }
}

#[must_use]
pub struct Request<'a> {
    runtime: &'a Runtime,
    inner: api::Request<'a>,
}

impl<'a> Request<'a> {
    pub fn query_continue(self, token: ContinueToken) -> Request<'a> {
        Request {
            runtime: self.runtime,
            inner: self.inner.query_continue(token),
        }
    }

    pub fn attachment(self, attachment: Attachment) -> Request<'a> {
        Request {
            runtime: self.runtime,
            inner: self.inner.attachment(attachment),
        }
    }

    pub fn auth(self, auth: Auth) -> Request<'a> {
        Request {
            runtime: self.runtime,
            inner: self.inner.auth(auth),
        }
    }

    pub fn timeout(self, timeout: Duration) -> Request<'a> {
        Request {
            runtime: self.runtime,
            inner: self.inner.timeout(timeout),
        }
    }

    pub fn send(self) -> Result<Document> {
        self.runtime.block_on(self.inner.send())
    }

    pub fn continuation(self) -> Continuation<'a> {
        Continuation {
            runtime: self.runtime,
            inner: self.inner.continuation(),
        }
    }
}

/// Iterator version of [`api::Continuation`], one request per `next`.
pub struct Continuation<'a> {
    runtime: &'a Runtime,
    inner: api::Continuation<'a>,
}

impl Iterator for Continuation<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.inner.next())
    }
}
