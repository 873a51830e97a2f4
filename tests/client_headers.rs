//! Header and query merging: client defaults, per-call overrides, removal.

use edgen::{Edgen, RequestOptions};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn version_body() -> serde_json::Value {
    json!({"major": 0, "minor": 1, "patch": 0, "build": ""})
}

/// Matches only when the named header is absent from the request.
#[derive(Debug, Clone, Copy)]
struct HeaderAbsent(&'static str);

impl wiremock::Match for HeaderAbsent {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key(self.0)
    }
}

#[tokio::test]
async fn bearer_auth_org_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("edgen-organization", "acme"))
        .and(header("x-env", "prod"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .with_organization("acme")
        .with_default_header("x-env", "prod")
        .build()
        .unwrap();

    client.misc().version().await.unwrap();
}

#[tokio::test]
async fn a_missing_api_key_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(HeaderAbsent("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;

    // An empty key (the out-of-the-box local-server setup) disables auth.
    let client = Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("")
        .build()
        .unwrap();
    client.misc().version().await.unwrap();
}

#[tokio::test]
async fn per_call_overrides_replace_and_remove_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header("x-env", "staging"))
        .and(HeaderAbsent("edgen-organization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .with_organization("acme")
        .with_default_header("x-env", "prod")
        .build()
        .unwrap();

    client
        .misc()
        .version_with_options(
            RequestOptions::new()
                .with_header("x-env", "staging")
                .without_header("edgen-organization"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn default_and_per_call_query_parameters_merge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(query_param("deployment", "green"))
        .and(query_param("trace", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .with_default_query("deployment", "blue")
        .build()
        .unwrap();

    // The per-call value replaces the same-named default.
    client
        .misc()
        .version_with_options(
            RequestOptions::new()
                .with_query("deployment", "green")
                .with_query("trace", "1"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn the_user_agent_identifies_the_crate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header(
            "user-agent",
            concat!("edgen-rs/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .build()
        .unwrap();
    client.misc().version().await.unwrap();
}
