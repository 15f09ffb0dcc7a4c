//! `gatehouse health` — check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the response as formatted text or raw JSON. The response's
//! `X-Request-ID` is printed so the probe can be found in server logs.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::GatehouseError;
use crate::health::HealthResponse;
use crate::middleware::request_id::{RequestId, X_REQUEST_ID};

pub async fn execute(args: HealthArgs) -> Result<(), GatehouseError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse().map_err(
            |e: hyper::http::uri::InvalidUri| GatehouseError::UriParse {
                source: Box::new(e),
            },
        )?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let probe_id = RequestId::generate();
    let req = hyper::Request::builder()
        .uri(uri)
        .header(&X_REQUEST_ID, probe_id.as_str())
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| GatehouseError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| GatehouseError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| GatehouseError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let request_id = response
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| GatehouseError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(GatehouseError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => {
            let uptime = format_uptime(health.uptime_seconds);
            println!("\u{2713} gatehouse is {} ({})", health.status, args.url);
            println!("  version:    {} ({})", health.version, health.commit);
            println!("  profile:    {}", health.profile);
            println!("  uptime:     {uptime}");
            println!("  timestamp:  {}", health.timestamp);
            println!("  request id: {request_id}");
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
