//! One HTTP exchange with the API.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, HOST, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};

use super::model::{self, Attachment, Auth, Document, Method};
use crate::error::ApiErrorDoc;
use crate::params::Normalized;
use crate::{Config, Error, Result};

fn elapsed_ms(start: &Instant) -> u128 {
    start.elapsed().as_millis()
}

/// Values of these parameters never end up in the log.
fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("password") || key.contains("token")
}

fn redacted(params: &Normalized) -> String {
    let pairs = params
        .iter()
        .map(|(k, v)| {
            if is_secret(k) {
                format!("{}=<redacted>", k)
            } else {
                format!("{}={:?}", k, v)
            }
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", pairs.join(", "))
}

/// Everything that varies between two requests of the same session.
pub(crate) struct Exchange<'a> {
    pub method: Method,
    pub params: &'a Normalized,
    pub attachment: Option<Attachment>,
    pub auth: Option<&'a Auth>,
    pub timeout: Option<Duration>,
}

pub(crate) struct Transport {
    client: reqwest::Client,
    api_url: String,
    headers: HeaderMap,
    formatversion: Option<u32>,
    timeout: Option<Duration>,
}

impl Transport {
    pub fn new(config: &Config, client: reqwest::Client) -> Result<Transport> {
        let mut headers = HeaderMap::new();

        let user_agent = match config.user_agent.as_deref() {
            Some(user_agent) => user_agent,
            None => {
                log::warn!(
                    "sending requests with default User-Agent, set `user_agent` on the session config to quiet this message"
                );
                crate::config::DEFAULT_USER_AGENT
            }
        };
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| Error::Config(format!("invalid user agent: {}", err)))?,
        );

        if config.origin.is_some() {
            let host = Url::parse(&config.host)
                .map_err(|err| Error::Config(format!("invalid host {}: {}", config.host, err)))?;
            let authority = match (host.host_str(), host.port()) {
                (Some(name), Some(port)) => format!("{}:{}", name, port),
                (Some(name), None) => name.to_string(),
                (None, _) => {
                    return Err(Error::Config(format!("host {} has no name", config.host)))
                }
            };
            headers.insert(
                HOST,
                HeaderValue::from_str(&authority)
                    .map_err(|err| Error::Config(format!("invalid host header: {}", err)))?,
            );
        }

        Ok(Transport {
            client,
            api_url: config.api_url(),
            headers,
            formatversion: config.formatversion,
            timeout: config.timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn build(&self, exchange: Exchange<'_>) -> RequestBuilder {
        let mut params = exchange.params.clone();
        if let Some(formatversion) = self.formatversion {
            params.insert("formatversion", formatversion.to_string());
        }
        let params = params.into_inner();

        let mut builder = self
            .client
            .request(exchange.method.into(), &self.api_url)
            .headers(self.headers.clone());

        builder = match (exchange.method, exchange.attachment) {
            (Method::Get, attachment) => {
                if attachment.is_some() {
                    log::warn!("dropping file attachment, files are only sent with POST requests");
                }
                builder.query(&params)
            }
            (Method::Post, None) => builder.form(&params),
            (Method::Post, Some(attachment)) => {
                let form = params
                    .into_iter()
                    .fold(Form::new(), |form, (k, v)| form.text(k, v))
                    .part(
                        "file",
                        Part::bytes(attachment.bytes).file_name(attachment.file_name),
                    );
                builder.multipart(form)
            }
        };

        builder = match exchange.auth {
            None => builder,
            Some(Auth::Basic { username, password }) => builder.basic_auth(username, password.as_ref()),
            Some(Auth::Bearer(token)) => builder.bearer_auth(token),
        };

        match exchange.timeout.or(self.timeout) {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// Send one request and decode the response.
    ///
    /// Fails with [`Error::Api`] if the document has an `error` field.
    pub async fn send(&self, exchange: Exchange<'_>) -> Result<Document> {
        let method = exchange.method;
        let params = exchange.params;
        let action = params.get("action").unwrap_or("-").to_string();

        let now = Instant::now();
        let resp = self.build(exchange).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        log::debug!(
            "{} request to {} (action={}, status={}) took {}ms",
            method,
            self.api_url,
            action,
            status.as_u16(),
            elapsed_ms(&now),
        );

        let doc = serde_json::from_str::<Document>(&text).map_err(|err| Error::decode(&text, err))?;

        if let Some(error) = doc.get("error") {
            return Err(ApiErrorDoc::into_error(error.clone()));
        }

        let warnings = model::warnings(&doc);
        if !warnings.is_empty() {
            log::warn!("the following query raised warnings: {}", redacted(params));
            for (module, warning) in warnings {
                log::warn!("\t- {} -- {}", module, warning);
            }
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_secret, redacted};
    use crate::params;

    #[test]
    fn secrets_are_redacted() {
        assert!(is_secret("lgpassword"));
        assert!(is_secret("OATHToken"));
        assert!(!is_secret("action"));

        let normal = params! { "action" => "clientlogin", "password" => "hunter2" }.normalize(None);
        let logged = redacted(&normal);

        assert!(logged.contains("action=\"clientlogin\""));
        assert!(logged.contains("password=<redacted>"));
        assert!(!logged.contains("hunter2"));
    }
}
