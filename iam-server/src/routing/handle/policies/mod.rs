use axum::extract::{Query, State};
use axum::response::IntoResponse;
use iam_api::Validator;
use iam_api::policies as schema;
use iam_lib::json::{ListWrapper, Wrapper};
use iam_lib::query::Pagination;
use uuid::Uuid;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;
use crate::storage::types;

pub mod policy_id;

pub(super) fn schema_policy(policy: types::Policy) -> schema::Policy {
    schema::Policy {
        pid: policy.pid,
        name: policy.name,
        hostname: policy.hostname,
        rules: policy.rules,
    }
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Query(pagination): Query<Pagination>,
) -> error::Result<impl IntoResponse> {
    let policies = state.store()
        .list_policies(pagination.offset(), pagination.limit())
        .await?;

    let list: Vec<schema::ListItem> = policies.into_iter()
        .map(|policy| schema::ListItem {
            pid: policy.pid,
            name: policy.name,
        })
        .collect();

    Ok(net::Json::new(ListWrapper::with_vec(list)))
}

pub async fn post(
    State(state): State<ArcShared>,
    _auth: Auth,
    axum::Json(json): axum::Json<schema::CreatePolicy>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let created = state.store()
        .create_policy(types::Policy {
            pid: Uuid::new_v4(),
            name: json.name,
            hostname: json.hostname,
            rules: json.rules,
        })
        .await?;

    Ok(net::Json::new(Wrapper::new(schema_policy(created))))
}
