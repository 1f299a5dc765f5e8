use chrono::{DateTime, Utc};
use iam_lib::ids;
use serde::{Serialize, Deserialize};

/// listing and lookup form. the bearer token is never echoed back
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub sid: ids::SessionUid,
    pub user: ids::UserUid,
    pub expires_at: DateTime<Utc>,
}

/// returned exactly once, from session creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSession {
    pub sid: ids::SessionUid,
    pub user: ids::UserUid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
