//! Request correlation: one `X-Request-ID` per request.
//!
//! [`request_id_middleware`] adopts the client's `X-Request-ID` verbatim
//! when it is non-empty and generates a fresh id otherwise. The id is then:
//!
//! - stored as an axum extension so handlers can read it with
//!   `Extension<RequestId>`,
//! - bound in a task-local cell for the duration of the downstream future,
//!   which is what [`current`] and the log formatters read,
//! - recorded on a `request` tracing span,
//! - set on the response unless the handler already set one.
//!
//! The task-local binding belongs to the request's future, not to a thread
//! or a global, so requests polled concurrently on the same worker never
//! see each other's id. Work moved onto a separate `tokio::spawn` does not
//! inherit it; wrap that work in [`scope`] explicitly.

use std::future::Future;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Rendered in place of a request id when none is in scope.
pub const PLACEHOLDER: &str = "-";

tokio::task_local! {
    static CURRENT: RequestId;
}

/// Opaque correlation id for one request/response cycle.
///
/// Keeps the exact header bytes for the response alongside a printable
/// rendering for logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    header: HeaderValue,
    text: String,
}

impl RequestId {
    /// 128 random bits as 32 lowercase hex characters.
    #[must_use]
    pub fn generate() -> Self {
        let text = Uuid::new_v4().simple().to_string();
        // Lowercase hex is always a legal header value.
        let header = HeaderValue::from_str(&text)
            .unwrap_or_else(|_| HeaderValue::from_static(PLACEHOLDER));
        Self { header, text }
    }

    /// Adopt the inbound `X-Request-ID` verbatim.
    ///
    /// Returns `None` only when the header is missing or empty. No format
    /// policy is applied: the bytes are echoed back unchanged, and values
    /// that are not visible ASCII are escaped for [`as_str`](Self::as_str).
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(&X_REQUEST_ID)
            .filter(|v| !v.is_empty())
            .cloned()
            .map(Self::from)
    }

    /// Printable rendering used in logs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Exact value written to the response header.
    #[must_use]
    pub const fn header_value(&self) -> &HeaderValue {
        &self.header
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<HeaderValue> for RequestId {
    fn from(header: HeaderValue) -> Self {
        let text = match header.to_str() {
            Ok(text) => text.to_owned(),
            Err(_) => header.as_bytes().escape_ascii().to_string(),
        };
        Self { header, text }
    }
}

/// The id bound to the running request, if any.
#[must_use]
pub fn current() -> Option<RequestId> {
    CURRENT.try_with(Clone::clone).ok()
}

/// The id bound to the running request, or [`PLACEHOLDER`].
#[must_use]
pub fn current_or_placeholder() -> String {
    CURRENT
        .try_with(|id| id.text.clone())
        .unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// Run `future` with `id` bound as the current request id.
///
/// The binding is dropped when the future completes, panics, or is
/// cancelled.
pub fn scope<F: Future>(id: RequestId, future: F) -> impl Future<Output = F::Output> {
    CURRENT.scope(id, future)
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers()).unwrap_or_else(RequestId::generate);

    req.extensions_mut().insert(request_id.clone());

    let header_value = request_id.header_value().clone();

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = scope(request_id, next.run(req).instrument(span)).await;

    response
        .headers_mut()
        .entry(X_REQUEST_ID.clone())
        .or_insert(header_value);

    response
}
