//! Integration tests for the HTTP server, health endpoint, CSP report
//! intake, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use gatehouse::config::{Profile, SecurityHeadersConfig};
use gatehouse::health::HealthResponse;
use gatehouse::middleware::security_headers::SecurityHeaders;
use gatehouse::server::{self, AppState};

async fn start_test_server(
    config: SecurityHeadersConfig,
    profile: Profile,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let policy = SecurityHeaders::from_config(&config, profile).unwrap();
    let state = Arc::new(AppState::new(profile, policy));
    let router = server::build_router(state, 1024);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

async fn start_default_server() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    start_test_server(SecurityHeadersConfig::default(), Profile::Development).await
}

fn is_lower_hex_32(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (addr, shutdown) = start_default_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let request_id = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(is_lower_hex_32(&request_id));
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.profile, "development");
    assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_accepts_trailing_slash() {
    let (addr, shutdown) = start_default_server().await;

    let resp = reqwest::get(format!("http://{addr}/health/")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_version_matches_crate() {
    let (addr, shutdown) = start_default_server().await;

    let url = format!("http://{addr}/health");
    let health: HealthResponse = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_route_still_gets_headers() {
    let (addr, shutdown) = start_default_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/nonexistent"))
        .header("x-request-id", "probe-404")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["x-request-id"], "probe-404");
    assert!(resp.headers().contains_key("referrer-policy"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn production_profile_tightens_referrer_policy() {
    let (addr, shutdown) =
        start_test_server(SecurityHeadersConfig::default(), Profile::Production).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.headers()["referrer-policy"], "same-origin");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn legacy_csp_report_is_accepted() {
    let (addr, shutdown) = start_default_server().await;

    let body = r#"{"csp-report":{"document-uri":"https://example.com/","violated-directive":"script-src 'self'","blocked-uri":"inline"}}"#;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/csp-report/"))
        .header("content-type", "application/csp-report")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn reporting_api_batch_is_accepted() {
    let (addr, shutdown) = start_default_server().await;

    let body = r#"[{"type":"csp-violation","body":{"documentURL":"https://example.com/","effectiveDirective":"img-src","blockedURL":"https://cdn.example.net/a.png"}}]"#;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/csp-report"))
        .header("content-type", "application/reports+json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn malformed_csp_report_is_rejected() {
    let (addr, shutdown) = start_default_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/csp-report/"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn oversized_report_hits_body_limit() {
    let (addr, shutdown) = start_default_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/csp-report/"))
        .body(vec![b' '; 4096])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown.send(());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_keep_their_own_ids() {
    let (addr, shutdown) = start_default_server().await;
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = format!("http://{addr}/health");
        handles.push(tokio::spawn(async move {
            let id = format!("req-{i}");
            let resp = client
                .get(url)
                .header("x-request-id", &id)
                .send()
                .await
                .unwrap();
            (id, resp.headers()["x-request-id"].to_str().unwrap().to_string())
        }));
    }

    for handle in handles {
        let (sent, echoed) = handle.await.unwrap();
        assert_eq!(sent, echoed);
    }

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_default_server().await;

    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
