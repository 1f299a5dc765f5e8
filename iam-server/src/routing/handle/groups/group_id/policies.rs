use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_lib::ids::{GroupIdentifier, PolicyIdentifier};
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;

#[derive(Deserialize)]
pub struct PathParams {
    group_id: String,
    policy_id: String,
}

pub async fn post(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { group_id, policy_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    state.store()
        .create_group_policy_attachment(
            &GroupIdentifier::parse(&group_id),
            &PolicyIdentifier::parse(&policy_id)
        )
        .await?;

    Ok(net::Json::empty())
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { group_id, policy_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    state.store()
        .delete_group_policy_attachment(
            &GroupIdentifier::parse(&group_id),
            &PolicyIdentifier::parse(&policy_id)
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
