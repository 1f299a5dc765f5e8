use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_lib::ids::{SessionUid, UserIdentifier};
use iam_lib::json::Wrapper;
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;

#[derive(Deserialize)]
pub struct PathParams {
    user_id: String,
    session_id: SessionUid,
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id, session_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let uid = state.store()
        .get_user_uid(&UserIdentifier::parse(&user_id))
        .await?;

    let session = state.store()
        .get_session_by_id(&uid, &session_id)
        .await?;

    Ok(net::Json::new(Wrapper::new(super::schema_session(session))))
}

/// refresh. stamps a fresh expiry from the configured ttl
pub async fn put(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id, session_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let uid = state.store()
        .get_user_uid(&UserIdentifier::parse(&user_id))
        .await?;

    let session = state.store()
        .refresh_session(&uid, &session_id)
        .await?;

    Ok(net::Json::new(Wrapper::new(super::schema_session(session))))
}

pub async fn delete(
    State(state): State<ArcShared>,
    auth: Auth,
    Path(PathParams { user_id, session_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let uid = state.store()
        .get_user_uid(&UserIdentifier::parse(&user_id))
        .await?;

    state.store().delete_session(&uid, &session_id).await?;

    let own = auth.session.as_ref().is_some_and(|session| session.sid == session_id);

    if own {
        tracing::info!(sid = %session_id, "caller deleted the session authenticating this request");
    }

    Ok(StatusCode::NO_CONTENT)
}
