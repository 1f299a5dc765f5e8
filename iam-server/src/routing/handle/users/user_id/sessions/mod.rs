use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use iam_api::sessions as schema;
use iam_lib::ids::UserIdentifier;
use iam_lib::json::{ListWrapper, Wrapper};
use iam_lib::query::Pagination;
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;
use crate::storage::types;

pub mod session_id;

#[derive(Deserialize)]
pub struct PathParams {
    user_id: String
}

pub(super) fn schema_session(session: types::Session) -> schema::Session {
    schema::Session {
        sid: session.sid,
        user: session.user,
        expires_at: session.expires,
    }
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id }): Path<PathParams>,
    Query(pagination): Query<Pagination>,
) -> error::Result<impl IntoResponse> {
    let uid = state.store()
        .get_user_uid(&UserIdentifier::parse(&user_id))
        .await?;

    let sessions = state.store()
        .list_user_sessions(&uid, pagination.offset(), pagination.limit())
        .await?;

    let list: Vec<schema::Session> = sessions.into_iter()
        .map(schema_session)
        .collect();

    Ok(net::Json::new(ListWrapper::with_vec(list)))
}

pub async fn post(
    State(state): State<ArcShared>,
    auth: Auth,
    Path(PathParams { user_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let uid = state.store()
        .get_user_uid(&UserIdentifier::parse(&user_id))
        .await?;

    let session = state.store().create_session(&uid).await?;

    tracing::info!(
        initiator = %auth.user.uid,
        owner = %session.user,
        "session created"
    );

    // the only response that ever carries the bearer token
    Ok(net::Json::new(Wrapper::new(schema::CreatedSession {
        sid: session.sid,
        user: session.user,
        token: session.token,
        expires_at: session.expires,
    })))
}
