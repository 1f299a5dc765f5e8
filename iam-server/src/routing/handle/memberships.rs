use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_lib::ids::{GroupIdentifier, UserIdentifier};
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;

#[derive(Deserialize)]
pub struct PathParams {
    user_id: String,
    group_id: String,
}

pub async fn post(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id, group_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    state.store()
        .create_membership(
            &UserIdentifier::parse(&user_id),
            &GroupIdentifier::parse(&group_id)
        )
        .await?;

    Ok(net::Json::empty())
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id, group_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    state.store()
        .delete_membership(
            &UserIdentifier::parse(&user_id),
            &GroupIdentifier::parse(&group_id)
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
