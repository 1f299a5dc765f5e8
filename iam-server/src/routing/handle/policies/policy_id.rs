use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use iam_api::Validator;
use iam_api::policies as schema;
use iam_lib::ids::PolicyIdentifier;
use iam_lib::json::Wrapper;
use serde::Deserialize;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;
use crate::storage::types;

#[derive(Deserialize)]
pub struct PathParams {
    policy_id: String
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { policy_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = PolicyIdentifier::parse(&policy_id);

    let policy = state.store().get_policy(&ident).await?;

    Ok(net::Json::new(Wrapper::new(super::schema_policy(policy))))
}

pub async fn put(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { policy_id }): Path<PathParams>,
    axum::Json(json): axum::Json<schema::UpdatePolicy>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    if !json.has_work() {
        return Err(error::Error::api((
            error::GeneralKind::NoWork,
            "requested update with no changes"
        )));
    }

    let ident = PolicyIdentifier::parse(&policy_id);

    let updated = state.store()
        .update_policy(&ident, types::PolicyUpdate {
            name: json.name,
            hostname: json.hostname,
            rules: json.rules,
        })
        .await?;

    Ok(net::Json::new(Wrapper::new(super::schema_policy(updated))))
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Auth,
    Path(PathParams { policy_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let ident = PolicyIdentifier::parse(&policy_id);

    state.store().delete_policy(&ident).await?;

    Ok(StatusCode::NO_CONTENT)
}
