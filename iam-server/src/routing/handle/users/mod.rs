use axum::extract::{Query, State};
use axum::response::IntoResponse;
use iam_api::Validator;
use iam_api::users as schema;
use iam_lib::json::{ListWrapper, Wrapper};
use iam_lib::query::Pagination;
use iam_lib::sec::authn::PublicKey;
use uuid::Uuid;

use crate::net;
use crate::net::error;
use crate::sec::authz::Auth;
use crate::state::ArcShared;
use crate::storage::types;

pub mod user_id;

pub(super) fn schema_user(user: types::User) -> schema::User {
    schema::User {
        uid: user.uid,
        email: user.email,
        groups: user.groups,
        policies: user.policies,
        public_keys: user.public_keys.into_iter()
            .map(|entry| schema::PublicKey {
                key: entry.key.to_base64(),
                description: entry.description,
            })
            .collect(),
    }
}

pub async fn get(
    State(state): State<ArcShared>,
    _auth: Auth,
    Query(pagination): Query<Pagination>,
) -> error::Result<impl IntoResponse> {
    let users = state.store()
        .list_users(pagination.offset(), pagination.limit())
        .await?;

    let list: Vec<schema::ListItem> = users.into_iter()
        .map(|user| schema::ListItem {
            uid: user.uid,
            email: user.email,
        })
        .collect();

    Ok(net::Json::new(ListWrapper::with_vec(list)))
}

pub async fn post(
    State(state): State<ArcShared>,
    _auth: Auth,
    axum::Json(json): axum::Json<schema::CreateUser>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let mut public_keys = Vec::with_capacity(json.public_keys.len());

    for entry in json.public_keys {
        let key = PublicKey::from_base64(&entry.key)
            .map_err(|_| error::Error::api((
                error::GeneralKind::ValidationFailed,
                "public key is not base64 of 32 bytes"
            )))?;

        public_keys.push(types::UserPublicKey {
            key,
            description: entry.description,
        });
    }

    let created = state.store()
        .create_user(types::NewUser {
            uid: Uuid::new_v4(),
            email: json.email,
            public_keys,
        })
        .await?;

    Ok(net::Json::new(Wrapper::new(schema_user(created))))
}
