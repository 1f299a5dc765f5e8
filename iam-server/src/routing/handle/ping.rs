use axum::response::IntoResponse;

use crate::net;

/// unauthenticated liveness probe
pub async fn get() -> impl IntoResponse {
    net::Json::new(iam_lib::json::Wrapper::new("pong").with_timestamp_now())
}
