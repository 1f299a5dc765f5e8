use chrono::{DateTime, Utc};
use iam_lib::ids;
use iam_lib::sec::authn::PublicKey;
use iam_lib::sec::authz::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPublicKey {
    pub key: PublicKey,
    pub description: String,
}

/// user as read from the store. `groups` and `policies` are derived
/// from the membership and attachment relations in the same snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: ids::UserUid,
    pub email: Option<String>,
    pub public_keys: Vec<UserPublicKey>,
    pub groups: Vec<ids::GroupUid>,
    pub policies: Vec<ids::PolicyUid>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: ids::UserUid,
    pub email: Option<String>,
    pub public_keys: Vec<UserPublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub gid: ids::GroupUid,
    pub name: Option<String>,
    pub users: Vec<ids::UserUid>,
    pub policies: Vec<ids::PolicyUid>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub gid: ids::GroupUid,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub pid: ids::PolicyUid,
    pub name: Option<String>,
    pub hostname: String,
    pub rules: Vec<Rule>,
}

/// partial policy update. absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct PolicyUpdate {
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub sid: ids::SessionUid,
    pub user: ids::UserUid,
    pub token: String,
    pub expires: DateTime<Utc>,
}
