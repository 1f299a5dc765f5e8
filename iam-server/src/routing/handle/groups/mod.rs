use axum::extract::{Query, State};
use axum::response::IntoResponse;
use iam_api::Validator;
use iam_api::groups as schema;
use iam_lib::json::{ListWrapper, Wrapper};
use iam_lib::query::Pagination;
use uuid::Uuid;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;
use crate::storage::types;

pub mod group_id;

pub(super) fn schema_group(group: types::Group) -> schema::Group {
    schema::Group {
        gid: group.gid,
        name: group.name,
        users: group.users,
        policies: group.policies,
    }
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Query(pagination): Query<Pagination>,
) -> error::Result<impl IntoResponse> {
    let groups = state.store()
        .list_groups(pagination.offset(), pagination.limit())
        .await?;

    let list: Vec<schema::ListItem> = groups.into_iter()
        .map(|group| schema::ListItem {
            gid: group.gid,
            name: group.name,
        })
        .collect();

    Ok(net::Json::new(ListWrapper::with_vec(list)))
}

pub async fn post(
    State(state): State<ArcShared>,
    _auth: Auth,
    axum::Json(json): axum::Json<schema::CreateGroup>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let created = state.store()
        .create_group(types::NewGroup {
            gid: Uuid::new_v4(),
            name: json.name,
        })
        .await?;

    Ok(net::Json::new(Wrapper::new(schema_group(created))))
}
