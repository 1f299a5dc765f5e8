use std::future::Future;
use std::pin::Pin;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use iam_lib::sec::authz::{Action, evaluate};

use crate::net::error;
use crate::sec::authn;
use crate::state::ArcShared;
use crate::storage::types;

/// authenticated and authorized request context. extracting this runs
/// the whole pipeline: signature verification, optional session load,
/// policy aggregation and the allow/deny decision
pub struct Auth {
    pub user: types::User,
    pub session: Option<types::Session>,
    pub policies: Vec<types::Policy>,
}

pub async fn authorize(state: &ArcShared, parts: &Parts) -> error::Result<Auth> {
    let verified = authn::lookup(
        state.sec(),
        state.store().as_ref(),
        parts
    ).await?;

    let policies = state.store()
        .list_policies_for_user(&verified.user.uid, state.sec().hostname())
        .await?;

    let action = Action::from_method(parts.method.as_str());
    let resource = parts.uri.path();

    let rules = policies.iter().flat_map(|policy| policy.rules.iter());

    if !evaluate(rules, action, resource) {
        tracing::debug!(
            uid = %verified.user.uid,
            resource,
            "no policy allows the request"
        );

        return Err(error::Error::api((
            error::AuthKind::PermissionDenied,
            "request is not allowed by any attached policy"
        )));
    }

    let auth = Auth {
        user: verified.user,
        session: verified.session,
        policies,
    };

    tracing::debug!(
        uid = %auth.user.uid,
        policies = auth.policies.len(),
        "request authorized"
    );

    Ok(auth)
}

impl FromRequestParts<ArcShared> for Auth {
    type Rejection = error::Error;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 ArcShared,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait
    {
        Box::pin(async move {
            authorize(state, parts).await
        })
    }
}
