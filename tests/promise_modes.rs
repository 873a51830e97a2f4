//! Observation modes of deferred results: parsed value, raw response, both.

use edgen::types::chat::{ChatCompletionCreateParams, ChatCompletionMessageParam};
use edgen::types::misc::VersionInfo;
use edgen::{Edgen, EdgenError};
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> Edgen {
    Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .build()
        .unwrap()
}

async fn mount_version(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req_7")
                .set_body_json(json!({"major": 1, "minor": 2, "patch": 3, "build": "rc1"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn value_and_raw_observe_byte_identical_data() {
    let server = MockServer::start().await;
    mount_version(&server).await;

    let (version, raw) = test_client(&server)
        .misc()
        .version()
        .with_raw_response()
        .await
        .unwrap();

    assert_eq!(raw.status().as_u16(), 200);
    assert_eq!(raw.headers()["x-request-id"], "req_7");
    assert!(!raw.is_live_stream());

    // The raw bytes re-parse into exactly the value the promise produced.
    let reparsed: VersionInfo = serde_json::from_slice(raw.bytes().unwrap()).unwrap();
    assert_eq!(reparsed, version);
    assert_eq!(version.to_string(), "1.2.3-rc1");

    // Both observation modes shared one execution.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn each_promise_issues_exactly_one_request() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    let client = test_client(&server);

    let _value = client.misc().version().await.unwrap();
    let _raw = client.misc().version().into_raw_response().await.unwrap();
    let _both = client.misc().version().with_raw_response().await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn a_2xx_with_invalid_json_is_a_decode_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server).misc().version().await.unwrap_err();
    assert!(matches!(err, EdgenError::Decode { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn raw_response_is_still_available_when_parsing_would_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("opaque payload"))
        .mount(&server)
        .await;

    let raw = test_client(&server)
        .misc()
        .version()
        .into_raw_response()
        .await
        .unwrap();
    assert_eq!(raw.bytes().unwrap(), b"opaque payload");
}

#[tokio::test]
async fn stream_promise_exposes_handshake_metadata_with_a_live_body() {
    let server = MockServer::start().await;
    let sse = "data: {\"id\":\"c1\",\"choices\":[{\"delta\":{\"content\":\"hi\"},\"finish_reason\":null,\"index\":0}],\"created\":1,\"model\":\"default\",\"object\":\"chat.completion.chunk\"}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let params = ChatCompletionCreateParams::new(
        "default",
        vec![ChatCompletionMessageParam::user("hello")],
    );
    let (mut stream, raw) = test_client(&server)
        .chat()
        .completions()
        .create_stream(params)
        .with_raw_response()
        .await
        .unwrap();

    assert_eq!(raw.status().as_u16(), 200);
    assert!(raw.is_live_stream());
    assert!(raw.bytes().is_none());

    // The body still belongs to the stream.
    let chunk = stream.next().await.unwrap().unwrap();
    assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("hi"));
    assert!(stream.next().await.is_none());

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
