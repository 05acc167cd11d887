#![allow(dead_code)]

use std::collections::HashMap;

use mwapi::{Config, Session};
use serde_json::{json, Value};
use wiremock::{Match, MockServer, Request, Respond, ResponseTemplate};

pub const API_PATH: &str = "/w/api.php";
pub const USER_AGENT: &str = "mwapi tests";

pub fn config(server: &MockServer) -> Config {
    Config::new(server.uri()).user_agent(USER_AGENT)
}

pub fn session(server: &MockServer) -> Session {
    Session::new(config(server)).unwrap()
}

/// Query string and form body parameters of a received request.
pub fn params(request: &Request) -> HashMap<String, String> {
    let mut params = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<HashMap<_, _>>();

    let is_form = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        let body = String::from_utf8_lossy(&request.body);
        let url = reqwest::Url::parse(&format!("http://stub/?{}", body)).unwrap();
        params.extend(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())));
    }

    params
}

/// Matches requests whose body doesn't contain the given text.
pub struct BodyLacks(pub &'static str);

impl Match for BodyLacks {
    fn matches(&self, request: &Request) -> bool {
        !String::from_utf8_lossy(&request.body).contains(self.0)
    }
}

/// Serves `count` pages chained by a `pagecontinue` field.
///
/// Page `i` is selected by `pagecontinue=p{i}`, no `pagecontinue` means page 0.
pub struct Paged {
    pub count: usize,
}

impl Paged {
    pub fn page(&self, index: usize) -> Value {
        let mut page = json!({
            "batchcomplete": true,
            "query": {"page": index},
        });
        if index + 1 < self.count {
            page["continue"] = json!({
                "pagecontinue": format!("p{}", index + 1),
                "continue": "-||",
            });
        }
        page
    }
}

impl Respond for Paged {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let index = params(request)
            .get("pagecontinue")
            .and_then(|p| p.trim_start_matches('p').parse::<usize>().ok())
            .unwrap_or(0);
        ResponseTemplate::new(200).set_body_json(self.page(index))
    }
}
