mod common;

use mwapi::blocking::Session;
use mwapi::cli::{self, Prompt};
use mwapi::{params, Challenge, Error};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{Paged, API_PATH};

/// A stub server running on its own runtime, so the blocking session
/// can own the current thread.
struct Stub {
    server: MockServer,
    runtime: Runtime,
}

impl Stub {
    fn start() -> Stub {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        Stub { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn session(&self) -> Session {
        Session::new(common::config(&self.server)).unwrap()
    }

    fn requests(&self) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap()
    }
}

#[test]
fn get() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"userinfo": {"id": 0, "name": "127.0.0.1", "anon": true}}
            }))),
    );

    let session = stub.session();
    let doc = session
        .get(params! { "action" => "query", "meta" => "userinfo" })
        .unwrap();

    assert_eq!(doc["query"]["userinfo"]["anon"], true);
    assert_eq!(common::params(&stub.requests()[0])["meta"], "userinfo");
}

#[test]
fn continuation_iterator() {
    let stub = Stub::start();
    stub.mount(Mock::given(path(API_PATH)).respond_with(Paged { count: 3 }));

    let session = stub.session();
    let pages = session
        .get_continued(params! { "action" => "query" })
        .map(|doc| doc.map(|doc| doc["query"]["page"].clone()))
        .collect::<Result<Vec<_>, Error>>()
        .unwrap();

    assert_eq!(pages, [json!(0), json!(1), json!(2)]);
    assert_eq!(stub.requests().len(), 3);
}

#[test]
fn continuation_is_lazy() {
    let stub = Stub::start();
    stub.mount(Mock::given(path(API_PATH)).respond_with(Paged { count: 5 }));

    let session = stub.session();
    let mut pages = session.post_continued(params! { "action" => "query" });
    assert_eq!(stub.requests().len(), 0);

    pages.next().unwrap().unwrap();
    assert_eq!(stub.requests().len(), 1);
}

#[test]
fn api_error() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(path(API_PATH)).respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"error": {"code": "nosuchrevid", "info": "There is no revision with ID 123523."}}),
        )),
    );

    let session = stub.session();
    let err = session
        .post(params! { "action" => "query", "revids" => vec![123523] })
        .unwrap_err();

    assert_eq!(err.api_code(), Some("nosuchrevid"));
}

struct Fixed;

impl Prompt for Fixed {
    fn credentials(&mut self, _for_what: &str) -> anyhow::Result<(String, String)> {
        Ok(("alice".to_string(), "hunter2".to_string()))
    }

    fn interaction(&mut self, _challenge: &Challenge) -> anyhow::Result<Vec<(String, String)>> {
        anyhow::bail!("no challenge expected")
    }
}

#[test]
fn login_and_logout() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(body_string_contains("meta=tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"tokens": {"logintoken": "l+\\", "csrftoken": "c+\\"}}
            }))),
    );
    stub.mount(
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(body_string_contains("action=clientlogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clientlogin": {"status": "PASS", "username": "Alice"}
            }))),
    );
    stub.mount(
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(body_string_contains("action=logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({}))),
    );

    let session = stub.session();
    let username = cli::login_blocking(&session, &mut Fixed, "test wiki").unwrap();

    assert_eq!(username, "Alice");
    assert!(session.is_authenticated());

    session.logout().unwrap();
    assert!(!session.is_authenticated());
}
