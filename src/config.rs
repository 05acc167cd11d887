use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_API_PATH: &str = "/w/api.php";
pub const DEFAULT_USER_AGENT: &str = "mwapi (rust) -- default user-agent";

/// Which login protocol [`crate::Session::login`] speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginFlow {
    /// `action=clientlogin`, supports additional authentication factors.
    #[default]
    ClientLogin,
    /// `action=login` with `lgname`/`lgpassword`/`lgtoken`.
    Legacy,
}

impl std::str::FromStr for LoginFlow {
    type Err = Error;
    fn from_str(s: &str) -> Result<LoginFlow> {
        match s.to_ascii_lowercase().as_str() {
            "clientlogin" => Ok(LoginFlow::ClientLogin),
            "legacy" | "login" => Ok(LoginFlow::Legacy),
            other => Err(Error::Config(format!("unknown login flow `{}`", other))),
        }
    }
}

/// Connection level settings of a [`crate::Session`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Example: `https://en.wikipedia.org`, no trailing `/`
    pub host: String,
    /// Path to `api.php`, must begin with `/`
    pub api_path: String,
    /// Send requests here instead, while still presenting `host` in the `Host` header
    pub origin: Option<String>,
    /// `None` falls back to [`DEFAULT_USER_AGENT`] with a warning
    pub user_agent: Option<String>,
    /// Injected into every request if set
    pub formatversion: Option<u32>,
    /// `None` waits forever
    pub timeout: Option<Duration>,
    pub login_flow: LoginFlow,
}

impl Config {
    pub fn new(host: impl Into<String>) -> Config {
        Config {
            host: host.into(),
            api_path: DEFAULT_API_PATH.to_string(),
            origin: None,
            user_agent: None,
            formatversion: None,
            timeout: None,
            login_flow: LoginFlow::default(),
        }
    }

    pub fn api_path(mut self, api_path: impl Into<String>) -> Config {
        self.api_path = api_path.into();
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Config {
        self.origin = Some(origin.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Config {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn formatversion(mut self, formatversion: u32) -> Config {
        self.formatversion = Some(formatversion);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Config {
        self.timeout = Some(timeout);
        self
    }

    pub fn login_flow(mut self, login_flow: LoginFlow) -> Config {
        self.login_flow = login_flow;
        self
    }

    /// URL every request is sent to.
    pub fn api_url(&self) -> String {
        let base = self.origin.as_deref().unwrap_or(&self.host);
        format!("{}{}", base, self.api_path)
    }

    /// Load the configuration from environment variables (and `.env`).
    ///
    /// Only `MWAPI_HOST` is required.
    pub fn from_env() -> Result<Config> {
        fn var(key: &str) -> Option<String> {
            dotenv::var(key).ok().filter(|v| !v.is_empty())
        }
        fn parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
        where
            T::Err: std::fmt::Display,
        {
            var(key)
                .map(|v| {
                    v.parse::<T>()
                        .map_err(|err| Error::Config(format!("couldn't parse {}: {}", key, err)))
                })
                .transpose()
        }

        let host = var("MWAPI_HOST").ok_or_else(|| Error::Config("missing MWAPI_HOST".into()))?;

        let mut config = Config::new(host);
        if let Some(api_path) = var("MWAPI_API_PATH") {
            config.api_path = api_path;
        }
        config.origin = var("MWAPI_ORIGIN");
        config.user_agent = var("MWAPI_USER_AGENT");
        config.formatversion = parse::<u32>("MWAPI_FORMATVERSION")?;
        config.timeout = parse::<f64>("MWAPI_TIMEOUT_SECONDS")?
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|err| {
                    Error::Config(format!("couldn't parse MWAPI_TIMEOUT_SECONDS: {}", err))
                })
            })
            .transpose()?;
        if let Some(flow) = parse::<LoginFlow>("MWAPI_LOGIN_FLOW")? {
            config.login_flow = flow;
        }

        Ok(config)
    }
}
