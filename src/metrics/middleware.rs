use std::{panic::AssertUnwindSafe, time::Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use futures::FutureExt;
use tracing::{error, warn};

use super::aggregator::MetricsAggregator;

pub const SERVER_TIMING: &str = "server-timing";

/// Times the downstream service and records `(route, status, seconds)`.
///
/// A panic downstream is recorded as a 500 and then resumed as-is.
pub async fn track_metrics(
    State(metrics): State<MetricsAggregator>,
    req: Request,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let start = Instant::now();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(mut response) => {
            let seconds = start.elapsed().as_secs_f64();
            metrics.record(&path, response.status().as_u16(), seconds);
            match HeaderValue::from_str(&format!("total;dur={}", seconds)) {
                Ok(v) => {
                    response.headers_mut().insert(SERVER_TIMING, v);
                }
                Err(e) => warn!(error = %e, "server-timing header rejected"),
            }
            response
        }
        Err(panic) => {
            let seconds = start.elapsed().as_secs_f64();
            metrics.record(&path, StatusCode::INTERNAL_SERVER_ERROR.as_u16(), seconds);
            error!(%path, seconds, "handler panicked");
            std::panic::resume_unwind(panic)
        }
    }
}
