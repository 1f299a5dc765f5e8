use async_trait::async_trait;
use iam_lib::ids::{
    UserIdentifier,
    GroupIdentifier,
    PolicyIdentifier,
    UserUid,
    SessionUid,
};
use iam_lib::query::{Limit, Offset};

pub mod types;
pub mod memory;

use types::{
    User,
    NewUser,
    Group,
    NewGroup,
    Policy,
    PolicyUpdate,
    Session,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Group,
    Policy,
    Session,
    Membership,
    Attachment,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::User => f.write_str("user"),
            Entity::Group => f.write_str("group"),
            Entity::Policy => f.write_str("policy"),
            Entity::Session => f.write_str("session"),
            Entity::Membership => f.write_str("membership"),
            Entity::Attachment => f.write_str("attachment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} was not found: {1}")]
    NotFound(Entity, String),

    #[error("{0} already exists: {1}")]
    AlreadyExists(Entity, String),

    #[error("failed to generate a unique session token")]
    TokenExists,

    #[error("storage state was poisoned")]
    Poisoned,

    #[error(transparent)]
    Rand(#[from] rand::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// the storage contract the rest of the server depends on. handlers
/// only ever see `Arc<dyn Store>`, concrete stores are injected at
/// startup
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    async fn get_user(&self, id: &UserIdentifier) -> Result<User>;

    /// resolves any identifier variant to the backing uuid
    async fn get_user_uid(&self, id: &UserIdentifier) -> Result<UserUid>;

    async fn list_users(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<User>>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn delete_user(&self, id: &UserIdentifier) -> Result<()>;

    async fn get_group(&self, id: &GroupIdentifier) -> Result<Group>;

    async fn list_groups(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<Group>>;

    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    async fn delete_group(&self, id: &GroupIdentifier) -> Result<()>;

    async fn get_policy(&self, id: &PolicyIdentifier) -> Result<Policy>;

    async fn list_policies(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<Policy>>;

    async fn create_policy(&self, policy: Policy) -> Result<Policy>;

    async fn update_policy(&self, id: &PolicyIdentifier, update: PolicyUpdate) -> Result<Policy>;

    async fn delete_policy(&self, id: &PolicyIdentifier) -> Result<()>;

    /// all policies attached to the user directly or through any of its
    /// groups, filtered to the given hostname, deduplicated
    async fn list_policies_for_user(&self, uid: &UserUid, host: &str) -> Result<Vec<Policy>>;

    async fn create_membership(&self, user: &UserIdentifier, group: &GroupIdentifier) -> Result<()>;

    async fn delete_membership(&self, user: &UserIdentifier, group: &GroupIdentifier) -> Result<()>;

    async fn create_user_policy_attachment(&self, user: &UserIdentifier, policy: &PolicyIdentifier) -> Result<()>;

    async fn delete_user_policy_attachment(&self, user: &UserIdentifier, policy: &PolicyIdentifier) -> Result<()>;

    async fn create_group_policy_attachment(&self, group: &GroupIdentifier, policy: &PolicyIdentifier) -> Result<()>;

    async fn delete_group_policy_attachment(&self, group: &GroupIdentifier, policy: &PolicyIdentifier) -> Result<()>;

    async fn create_session(&self, uid: &UserUid) -> Result<Session>;

    async fn get_session_by_id(&self, uid: &UserUid, sid: &SessionUid) -> Result<Session>;

    async fn get_session_by_token(&self, uid: &UserUid, token: &str) -> Result<Session>;

    async fn refresh_session(&self, uid: &UserUid, sid: &SessionUid) -> Result<Session>;

    async fn delete_session(&self, uid: &UserUid, sid: &SessionUid) -> Result<()>;

    async fn list_user_sessions(&self, uid: &UserUid, offset: Offset, limit: Option<Limit>) -> Result<Vec<Session>>;
}
