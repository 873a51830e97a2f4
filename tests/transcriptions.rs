//! Multipart transcription uploads, including retry byte-identity.

use std::time::Duration;

use edgen::types::audio::{AudioResponseFormat, TranscriptionCreateParams};
use edgen::{Edgen, RetryPolicy, Uploadable};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> Edgen {
    Edgen::builder()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .with_retry_policy(
            RetryPolicy::new()
                .with_initial_delay(Duration::from_millis(1))
                .with_jitter(false),
        )
        .build()
        .unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn form_carries_the_file_part_and_every_set_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hello there"})))
        .mount(&server)
        .await;

    let params = TranscriptionCreateParams::new(
        Uploadable::from_bytes("frost.mp3", b"ID3\x03audio-bytes".to_vec()),
        "whisper-1",
    )
    .with_language("en")
    .with_prompt("poetry reading")
    .with_response_format(AudioResponseFormat::Json)
    .with_temperature(0.0);

    let transcription = test_client(&server)
        .audio()
        .transcriptions()
        .create(params)
        .await
        .unwrap();
    assert_eq!(transcription.text, "hello there");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    assert!(contains(body, b"name=\"file\""));
    assert!(contains(body, b"filename=\"frost.mp3\""));
    assert!(contains(body, b"ID3\x03audio-bytes"));
    assert!(contains(body, b"name=\"model\"") && contains(body, b"whisper-1"));
    assert!(contains(body, b"name=\"language\""));
    assert!(contains(body, b"name=\"prompt\"") && contains(body, b"poetry reading"));
    assert!(contains(body, b"name=\"response_format\"") && contains(body, b"json"));
    assert!(contains(body, b"name=\"temperature\"") && contains(body, b"0"));
}

#[tokio::test]
async fn unset_optional_fields_stay_off_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "ok"})))
        .mount(&server)
        .await;

    let params = TranscriptionCreateParams::new(
        Uploadable::from_bytes("clip.ogg", b"OggS".to_vec()),
        "whisper-1",
    );
    test_client(&server)
        .audio()
        .transcriptions()
        .create(params)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = &requests[0].body;
    assert!(!contains(body, b"name=\"language\""));
    assert!(!contains(body, b"name=\"prompt\""));
    assert!(!contains(body, b"name=\"response_format\""));
    assert!(!contains(body, b"name=\"temperature\""));
}

#[tokio::test]
async fn retried_uploads_resend_identical_file_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "second try"})))
        .mount(&server)
        .await;

    let file_bytes = b"RIFF----WAVEfmt deterministic-payload".to_vec();
    let params = TranscriptionCreateParams::new(
        Uploadable::from_bytes("take.wav", file_bytes.clone()),
        "whisper-1",
    );

    let transcription = test_client(&server)
        .audio()
        .transcriptions()
        .create(params)
        .await
        .unwrap();
    assert_eq!(transcription.text, "second try");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    // The multipart boundary is regenerated per attempt, but the file part
    // must carry identical bytes and filename both times.
    for request in &requests {
        assert!(contains(&request.body, &file_bytes));
        assert!(contains(&request.body, b"filename=\"take.wav\""));
    }
}

#[tokio::test]
async fn uploads_from_disk_are_buffered_up_front() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "from disk"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path_on_disk = dir.path().join("note.m4a");
    tokio::fs::write(&path_on_disk, b"m4a-payload").await.unwrap();

    let file = Uploadable::from_path(&path_on_disk).await.unwrap();
    // The source can disappear once the upload is constructed.
    tokio::fs::remove_file(&path_on_disk).await.unwrap();

    let transcription = test_client(&server)
        .audio()
        .transcriptions()
        .create(TranscriptionCreateParams::new(file, "whisper-1"))
        .await
        .unwrap();
    assert_eq!(transcription.text, "from disk");

    let requests = server.received_requests().await.unwrap();
    assert!(contains(&requests[0].body, b"m4a-payload"));
    assert!(contains(&requests[0].body, b"filename=\"note.m4a\""));
}
