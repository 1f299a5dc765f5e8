use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_lib::ids::GroupIdentifier;
use iam_lib::json::Wrapper;
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;

pub mod policies;

#[derive(Deserialize)]
pub struct PathParams {
    group_id: String
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { group_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = GroupIdentifier::parse(&group_id);

    let group = state.store().get_group(&ident).await?;

    Ok(net::Json::new(Wrapper::new(super::schema_group(group))))
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { group_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = GroupIdentifier::parse(&group_id);

    state.store().delete_group(&ident).await?;

    Ok(StatusCode::NO_CONTENT)
}
