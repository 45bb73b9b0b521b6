use super::support::{GatewayTestServer, TEST_API_KEY, TEST_TOKEN};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn valid_body() -> Value {
    json!({
        "title": "National Robotics Workshop",
        "objective": "hands-on exposure to embedded systems",
        "description": "Two-day workshop with lab sessions."
    })
}

fn upstream_success(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn missing_bearer_is_401_and_no_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(upstream_success("never"))
        .expect(0)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("authorization"));
}

#[tokio::test]
async fn unauthenticated_malformed_body_is_still_401() {
    // Auth is checked before the body is parsed: a broken payload without a
    // bearer token must come back 401, not 400.
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;

    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_malformed_body_is_400() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;

    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
}

#[tokio::test]
async fn invalid_bearer_is_401() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;

    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", "Bearer wrong-token")
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn each_missing_field_is_400() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    let client = reqwest::Client::new();

    for field in ["title", "objective", "description"] {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove(field);

        let resp = client
            .post(server.url("/generate"))
            .header("Authorization", format!("Bearer {TEST_TOKEN}"))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "field: {field}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains(field));
    }
}

#[tokio::test]
async fn happy_path_returns_generated_objective() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", TEST_API_KEY))
        .respond_with(upstream_success("X"))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["objective"], "X");
}

#[tokio::test]
async fn upstream_prompt_carries_safety_settings_and_fields() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(upstream_success("ok"))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();

    let settings = sent["safetySettings"].as_array().unwrap();
    assert_eq!(settings.len(), 4);
    for s in settings {
        assert_eq!(s["threshold"], "BLOCK_ONLY_HIGH");
    }

    let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("National Robotics Workshop"));
    assert!(prompt.contains("hands-on exposure to embedded systems"));
}

#[tokio::test]
async fn empty_candidates_is_500_extraction_failure() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("could not extract text")
    );
}

#[tokio::test]
async fn upstream_failure_is_500_with_wrapped_status() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;
    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("503"));
    assert!(message.contains("model overloaded"));
}

#[tokio::test]
async fn missing_server_api_key_is_500() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), None).await;

    let resp = reqwest::Client::new()
        .post(server.url("/generate"))
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .json(&valid_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn cors_preflight_succeeds_with_permissive_headers() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri(), Some(TEST_API_KEY)).await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, server.url("/generate"))
        .header("Origin", "https://portal.example.edu")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert!(
        resp.headers()
            .contains_key("access-control-allow-origin")
    );
    assert_eq!(resp.content_length().unwrap_or(0), 0);
}
