use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::net;
use crate::state::ArcShared;

pub mod handle;


const REQUEST_TIMEOUT_SECS: u64 = 90;

/// the full rest surface. split out of `main` so the request-level
/// tests drive the same router the binary serves
pub fn router(state: ArcShared) -> Router {
    Router::new()
        .route("/ping", get(handle::ping::get))
        .route(
            "/users",
            get(handle::users::get)
                .post(handle::users::post)
        )
        .route(
            "/users/:user_id",
            get(handle::users::user_id::get)
                .delete(handle::users::user_id::delete)
        )
        .route(
            "/users/:user_id/sessions",
            get(handle::users::user_id::sessions::get)
                .post(handle::users::user_id::sessions::post)
        )
        .route(
            "/users/:user_id/sessions/:session_id",
            get(handle::users::user_id::sessions::session_id::get)
                .put(handle::users::user_id::sessions::session_id::put)
                .delete(handle::users::user_id::sessions::session_id::delete)
        )
        .route(
            "/users/:user_id/policies/:policy_id",
            post(handle::users::user_id::policies::post)
                .delete(handle::users::user_id::policies::delete)
        )
        .route(
            "/groups",
            get(handle::groups::get)
                .post(handle::groups::post)
        )
        .route(
            "/groups/:group_id",
            get(handle::groups::group_id::get)
                .delete(handle::groups::group_id::delete)
        )
        .route(
            "/groups/:group_id/policies/:policy_id",
            post(handle::groups::group_id::policies::post)
                .delete(handle::groups::group_id::policies::delete)
        )
        .route(
            "/policies",
            get(handle::policies::get)
                .post(handle::policies::post)
        )
        .route(
            "/policies/:policy_id",
            get(handle::policies::policy_id::get)
                .put(handle::policies::policy_id::put)
                .delete(handle::policies::policy_id::delete)
        )
        .route(
            "/memberships/:user_id/:group_id",
            post(handle::memberships::post)
                .delete(handle::memberships::delete)
        )
        .layer(ServiceBuilder::new()
            .layer(TraceLayer::new_for_http()
                .make_span_with(net::layer::trace::make_span_with)
                .on_response(net::layer::trace::on_response)
                .on_failure(net::layer::trace::on_failure))
            .layer(HandleErrorLayer::new(net::error::handle_error))
            .layer(net::layer::timeout::TimeoutLayer::new(Duration::new(REQUEST_TIMEOUT_SECS, 0)))
        )
        .with_state(state)
}
