//! Mock HTTP tests for SoraClient.
//!
//! These tests cover:
//! - Request formatting (path, headers, JSON body)
//! - Submission error handling
//! - Polling through queued/running states to a terminal status
//! - Swallowing of transient polling errors
//! - Polling timeout and exact status matching

use std::time::Duration;

use sora_node::sora::{
    encode_image, GenerationRequest, ImageTensor, PollOptions, SoraClient, SoraError, TaskHandle, TaskStatus,
    VideoSeconds, VideoSize, PLACEHOLDER_API_KEY,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_poll() -> PollOptions {
    PollOptions {
        timeout: Duration::from_secs(5),
        interval: Duration::from_millis(10),
    }
}

fn client(server: &MockServer) -> SoraClient {
    SoraClient::with_base_url("test-api-key".to_string(), server.uri()).unwrap()
}

fn handle(id: &str) -> TaskHandle {
    TaskHandle { id: id.to_string() }
}

async fn mount_status(server: &MockServer, id: &str, body: serde_json::Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/videos/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

// === Submission ===

#[tokio::test]
async fn test_submit_sends_bearer_auth_and_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({
            "model": "sora-2",
            "prompt": "cat",
            "seconds": "4",
            "size": "1280x720"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc123"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GenerationRequest::new("cat")
        .with_seconds(VideoSeconds::Four)
        .with_size(VideoSize::Landscape1280x720);
    let result = client(&mock_server).submit(&request).await;

    assert_eq!(result.unwrap(), handle("abc123"));
}

#[tokio::test]
async fn test_submit_includes_input_reference() {
    let mock_server = MockServer::start().await;
    let data_uri = encode_image(&ImageTensor::new(vec![1, 1, 3], vec![0.2, 0.4, 0.6])).unwrap();

    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(body_json(serde_json::json!({
            "model": "sora-2",
            "prompt": "cat",
            "seconds": "12",
            "size": "720x1280",
            "input_reference": &data_uri
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "with-image"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GenerationRequest::new("cat")
        .with_seconds(VideoSeconds::Twelve)
        .with_size(VideoSize::Portrait720x1280)
        .with_reference_image(data_uri.clone());
    let result = client(&mock_server).submit(&request).await;

    assert_eq!(result.unwrap().id, "with-image");
}

#[tokio::test]
async fn test_submit_non_success_status_returns_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).submit(&GenerationRequest::new("cat")).await;

    match result {
        Err(SoraError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_without_id_returns_missing_task_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"object": "video"})))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).submit(&GenerationRequest::new("cat")).await;

    match result {
        Err(SoraError::MissingTaskId { body }) => assert!(body.contains("video")),
        other => panic!("Expected MissingTaskId, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_empty_prompt_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).submit(&GenerationRequest::new("   ")).await;
    assert!(matches!(result, Err(SoraError::EmptyPrompt)));
}

#[tokio::test]
async fn test_placeholder_or_empty_key_never_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = SoraClient::with_base_url(PLACEHOLDER_API_KEY.to_string(), mock_server.uri());
    assert!(matches!(result, Err(SoraError::PlaceholderApiKey)));

    let result = SoraClient::with_base_url(String::new(), mock_server.uri());
    assert!(matches!(result, Err(SoraError::MissingApiKey)));
}

// === Status checks ===

#[tokio::test]
async fn test_poll_status_sends_authorized_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).poll_status(&handle("abc123")).await;
    assert_eq!(result.unwrap(), TaskStatus::Queued);
}

#[tokio::test]
async fn test_poll_status_non_success_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .poll_status(&handle("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, SoraError::Api { status: 503, .. }));
    assert!(err.is_transient());
}

// === Polling ===

#[tokio::test]
async fn test_poll_walks_through_states_to_completion() {
    let mock_server = MockServer::start().await;

    mount_status(&mock_server, "abc123", serde_json::json!({"status": "queued"}), Some(1)).await;
    mount_status(&mock_server, "abc123", serde_json::json!({"status": "in_progress"}), Some(2)).await;
    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({
            "status": "completed",
            "task_result": {"videos": [{"url": "https://x/v.mp4"}]}
        }),
        None,
    )
    .await;

    let result = client(&mock_server).poll(&handle("abc123"), fast_poll()).await;

    assert_eq!(result.unwrap(), "https://x/v.mp4");
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_poll_failed_task_returns_task_error() {
    let mock_server = MockServer::start().await;

    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({"status": "failed", "error": {"message": "quota exceeded"}}),
        None,
    )
    .await;

    let result = client(&mock_server).poll(&handle("abc123"), fast_poll()).await;

    match result {
        Err(SoraError::TaskFailed { status, message }) => {
            assert_eq!(status, "failed");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("Expected TaskFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_cancelled_task_returns_task_error() {
    let mock_server = MockServer::start().await;

    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({"status": "cancelled", "error": {"message": "cancelled by user"}}),
        None,
    )
    .await;

    let result = client(&mock_server).poll(&handle("abc123"), fast_poll()).await;

    assert!(matches!(
        result,
        Err(SoraError::TaskFailed { status: "cancelled", ref message }) if message == "cancelled by user"
    ));
}

#[tokio::test]
async fn test_poll_completed_without_url_stops_with_response_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "completed", "task_result": {"videos": []}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).poll(&handle("abc123"), fast_poll()).await;
    assert!(matches!(result, Err(SoraError::MissingVideoUrl)));
}

#[tokio::test]
async fn test_poll_swallows_transient_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({
            "status": "completed",
            "task_result": {"videos": [{"url": "https://x/after-errors.mp4"}]}
        }),
        None,
    )
    .await;

    let result = client(&mock_server).poll(&handle("abc123"), fast_poll()).await;

    assert_eq!(result.unwrap(), "https://x/after-errors.mp4");
}

#[tokio::test]
async fn test_poll_times_out_without_terminal_status() {
    let mock_server = MockServer::start().await;

    mount_status(&mock_server, "slow", serde_json::json!({"status": "in_progress"}), None).await;

    let options = PollOptions {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(20),
    };
    let result = client(&mock_server).poll(&handle("slow"), options).await;

    match result {
        Err(SoraError::Timeout { timeout }) => assert_eq!(timeout, Duration::from_millis(200)),
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_times_out_when_server_unreachable() {
    // Nothing listens on port 1; every status check fails to connect.
    let client = SoraClient::with_base_url("test-api-key".to_string(), "http://127.0.0.1:1".to_string()).unwrap();

    let options = PollOptions {
        timeout: Duration::from_millis(300),
        interval: Duration::from_millis(50),
    };
    let result = client.poll(&handle("abc123"), options).await;

    assert!(matches!(result, Err(SoraError::Timeout { .. })));
}

#[tokio::test]
async fn test_poll_treats_non_lowercase_status_as_pending() {
    let mock_server = MockServer::start().await;

    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({
            "status": "COMPLETED",
            "task_result": {"videos": [{"url": "https://x/v.mp4"}]}
        }),
        None,
    )
    .await;

    let options = PollOptions {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(20),
    };
    let result = client(&mock_server).poll(&handle("abc123"), options).await;

    assert!(matches!(result, Err(SoraError::Timeout { .. })));
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.len() > 1);
}

#[tokio::test]
async fn test_poll_capitalized_failed_does_not_stop_polling() {
    let mock_server = MockServer::start().await;

    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({"status": "Failed", "error": {"message": "quota exceeded"}}),
        None,
    )
    .await;

    let options = PollOptions {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(20),
    };
    let result = client(&mock_server).poll(&handle("abc123"), options).await;

    assert!(matches!(result, Err(SoraError::Timeout { .. })));
}

#[tokio::test]
async fn test_poll_zero_timeout_still_checks_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = PollOptions {
        timeout: Duration::ZERO,
        interval: Duration::from_millis(10),
    };
    let result = client(&mock_server).poll(&handle("abc123"), options).await;

    assert!(matches!(result, Err(SoraError::Timeout { timeout }) if timeout == Duration::ZERO));
}

#[tokio::test]
async fn test_poll_zero_timeout_returns_ready_video() {
    let mock_server = MockServer::start().await;

    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({
            "status": "completed",
            "task_result": {"videos": [{"url": "https://x/v.mp4"}]}
        }),
        None,
    )
    .await;

    let options = PollOptions {
        timeout: Duration::ZERO,
        interval: Duration::from_millis(10),
    };
    let result = client(&mock_server).poll(&handle("abc123"), options).await;

    assert_eq!(result.unwrap(), "https://x/v.mp4");
}

#[tokio::test]
async fn test_poll_zero_interval_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = PollOptions {
        timeout: Duration::from_secs(5),
        interval: Duration::ZERO,
    };
    let result = client(&mock_server).poll(&handle("abc123"), options).await;

    assert!(matches!(result, Err(SoraError::InvalidParameter { name: "interval", .. })));
}

// === End to end ===

#[tokio::test]
async fn test_generate_returns_video_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc123"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_status(
        &mock_server,
        "abc123",
        serde_json::json!({
            "status": "completed",
            "task_result": {"videos": [{"url": "https://x/v.mp4"}]}
        }),
        None,
    )
    .await;

    let request = GenerationRequest::new("cat");
    let url = client(&mock_server).generate(&request, fast_poll()).await.unwrap();

    assert_eq!(url, "https://x/v.mp4");
}
