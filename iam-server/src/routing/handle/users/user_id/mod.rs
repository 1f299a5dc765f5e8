use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_lib::ids::UserIdentifier;
use iam_lib::json::Wrapper;
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;

pub mod policies;
pub mod sessions;

#[derive(Deserialize)]
pub struct PathParams {
    user_id: String
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = UserIdentifier::parse(&user_id);

    let user = state.store().get_user(&ident).await?;

    Ok(net::Json::new(Wrapper::new(super::schema_user(user))))
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { user_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = UserIdentifier::parse(&user_id);

    state.store().delete_user(&ident).await?;

    Ok(StatusCode::NO_CONTENT)
}
