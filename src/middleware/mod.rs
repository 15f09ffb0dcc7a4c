//! Tower middleware layers applied to every route.
//!
//! [`apply`] wraps a router, from outermost to innermost, in:
//!
//! 1. [`request_id`]: resolves the correlation id and binds it for the
//!    rest of the stack, so everything below logs with it.
//! 2. `TraceLayer`: request/response tracing events.
//! 3. [`security_headers`]: set-if-absent defensive response headers,
//!    present only when switched on.
//! 4. `RequestBodyLimitLayer`: caps inbound bodies.

pub mod request_id;
pub mod security_headers;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use security_headers::SecurityHeaders;

pub fn apply<S>(router: Router<S>, policy: &SecurityHeaders, max_body: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(request_id::request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .option_layer(policy.baseline_layer())
            .option_layer(policy.csp_layer())
            .layer(RequestBodyLimitLayer::new(max_body)),
    )
}
