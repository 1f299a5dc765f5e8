use http::StatusCode;
use serde::{Serialize, Deserialize};
use serde::de;
use strum::{AsRefStr as StrumAsRefStr};

/// authentication failure reasons stay internal: every 401 serializes
/// to the same wire kind so callers cannot probe which check failed
#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum AuthKind {
    InvalidHeaders,
    InvalidHost,
    InvalidSignature,
    UserNotFound,

    PermissionDenied,
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&AuthKind> for StatusCode {
    fn from(kind: &AuthKind) -> Self {
        match kind {
            AuthKind::InvalidHeaders |
            AuthKind::InvalidHost |
            AuthKind::InvalidSignature |
            AuthKind::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthKind::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum UserKind {
    NotFound,
    EmailExists,
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&UserKind> for StatusCode {
    fn from(kind: &UserKind) -> Self {
        match kind {
            UserKind::NotFound => StatusCode::NOT_FOUND,
            UserKind::EmailExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GroupKind {
    NotFound,
    NameExists,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GroupKind> for StatusCode {
    fn from(kind: &GroupKind) -> Self {
        match kind {
            GroupKind::NotFound => StatusCode::NOT_FOUND,
            GroupKind::NameExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum PolicyKind {
    NotFound,
    NameExists,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&PolicyKind> for StatusCode {
    fn from(kind: &PolicyKind) -> Self {
        match kind {
            PolicyKind::NotFound => StatusCode::NOT_FOUND,
            PolicyKind::NameExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum SessionKind {
    NotFound,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&SessionKind> for StatusCode {
    fn from(kind: &SessionKind) -> Self {
        match kind {
            SessionKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GeneralKind {
    InternalFailure,
    Timeout,

    AlreadyExists,
    NotFound,

    NoWork,

    ValidationFailed,
    InvalidData,
    InvalidHeaderValue,
}

impl std::fmt::Display for GeneralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GeneralKind> for StatusCode {
    fn from(kind: &GeneralKind) -> StatusCode {
        match kind {
            GeneralKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            GeneralKind::Timeout => StatusCode::REQUEST_TIMEOUT,
            GeneralKind::AlreadyExists => StatusCode::CONFLICT,
            GeneralKind::NotFound => StatusCode::NOT_FOUND,
            GeneralKind::NoWork |
            GeneralKind::ValidationFailed |
            GeneralKind::InvalidData |
            GeneralKind::InvalidHeaderValue => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    General(GeneralKind),
    Auth(AuthKind),
    User(UserKind),
    Group(GroupKind),
    Policy(PolicyKind),
    Session(SessionKind),
}

impl ApiErrorKind {
    /// flat wire name of the kind. the error body carries this string,
    /// not the enum structure
    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorKind::General(v) => v.as_ref(),
            ApiErrorKind::Auth(v) => match v {
                AuthKind::PermissionDenied => "NotAuthorized",
                _ => "AuthenticationFailed",
            },
            ApiErrorKind::User(v) => match v {
                UserKind::NotFound => "UserNotFound",
                UserKind::EmailExists => "EmailExists",
            },
            ApiErrorKind::Group(v) => match v {
                GroupKind::NotFound => "GroupNotFound",
                GroupKind::NameExists => "GroupNameExists",
            },
            ApiErrorKind::Policy(v) => match v {
                PolicyKind::NotFound => "PolicyNotFound",
                PolicyKind::NameExists => "PolicyNameExists",
            },
            ApiErrorKind::Session(v) => match v {
                SessionKind::NotFound => "SessionNotFound",
            },
        }
    }

    pub fn from_str(given: &str) -> Option<Self> {
        let rtn = match given {
            "InternalFailure" => GeneralKind::InternalFailure.into(),
            "Timeout" => GeneralKind::Timeout.into(),
            "AlreadyExists" => GeneralKind::AlreadyExists.into(),
            "NotFound" => GeneralKind::NotFound.into(),
            "NoWork" => GeneralKind::NoWork.into(),
            "ValidationFailed" => GeneralKind::ValidationFailed.into(),
            "InvalidData" => GeneralKind::InvalidData.into(),
            "InvalidHeaderValue" => GeneralKind::InvalidHeaderValue.into(),
            "AuthenticationFailed" => AuthKind::InvalidHeaders.into(),
            "NotAuthorized" => AuthKind::PermissionDenied.into(),
            "UserNotFound" => UserKind::NotFound.into(),
            "EmailExists" => UserKind::EmailExists.into(),
            "GroupNotFound" => GroupKind::NotFound.into(),
            "GroupNameExists" => GroupKind::NameExists.into(),
            "PolicyNotFound" => PolicyKind::NotFound.into(),
            "PolicyNameExists" => PolicyKind::NameExists.into(),
            "SessionNotFound" => SessionKind::NotFound.into(),
            _ => return None,
        };

        Some(rtn)
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApiErrorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiErrorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>
    {
        let given = String::deserialize(deserializer)?;

        ApiErrorKind::from_str(&given)
            .ok_or_else(|| de::Error::custom(format!("unknown error kind: {}", given)))
    }
}

impl From<GeneralKind> for ApiErrorKind {
    fn from(v: GeneralKind) -> Self {
        ApiErrorKind::General(v)
    }
}

impl From<AuthKind> for ApiErrorKind {
    fn from(v: AuthKind) -> Self {
        ApiErrorKind::Auth(v)
    }
}

impl From<UserKind> for ApiErrorKind {
    fn from(v: UserKind) -> Self {
        ApiErrorKind::User(v)
    }
}

impl From<GroupKind> for ApiErrorKind {
    fn from(v: GroupKind) -> Self {
        ApiErrorKind::Group(v)
    }
}

impl From<PolicyKind> for ApiErrorKind {
    fn from(v: PolicyKind) -> Self {
        ApiErrorKind::Policy(v)
    }
}

impl From<SessionKind> for ApiErrorKind {
    fn from(v: SessionKind) -> Self {
        ApiErrorKind::Session(v)
    }
}

impl From<&ApiErrorKind> for StatusCode {
    fn from(kind: &ApiErrorKind) -> Self {
        match kind {
            ApiErrorKind::General(v) => v.into(),
            ApiErrorKind::Auth(v) => v.into(),
            ApiErrorKind::User(v) => v.into(),
            ApiErrorKind::Group(v) => v.into(),
            ApiErrorKind::Policy(v) => v.into(),
            ApiErrorKind::Session(v) => v.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Detail {
    Keys(Vec<String>),
}

impl Detail {
    pub fn with_key<K>(key: K) -> Self
    where
        K: Into<String>
    {
        Detail::Keys(vec![key.into()])
    }

    pub fn mult_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>
    {
        Detail::Keys(keys.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detail::Keys(list) => {
                let mut iter = list.iter();

                if let Some(first) = iter.next() {
                    write!(f, "{}", first)?;

                    for key in iter {
                        write!(f, ",{}", key)?;
                    }
                }
            },
        }

        Ok(())
    }
}

/// the wire error body: `{"error": <kind>, "message": <text>}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "error")]
    kind: ApiErrorKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<Detail>,

    #[serde(rename = "message", default, skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl ApiError {
    pub fn new() -> Self {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::InternalFailure),
            detail: None,
            msg: None
        }
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.kind = kind.into();
        self
    }

    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_message<M>(mut self, msg: M) -> Self
    where
        M: Into<String>
    {
        self.msg = Some(msg.into());
        self
    }

    pub fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

impl Default for ApiError {
    fn default() -> Self {
        ApiError::new()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }

        if let Some(msg) = &self.msg {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl<K> From<K> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from(kind: K) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: None
        }
    }
}

impl<K, M> From<(K, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>,
{
    fn from((kind, msg): (K, M)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: Some(msg.into())
        }
    }
}

impl<K> From<(K, Detail)> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from((kind, detail): (K, Detail)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: Some(detail),
            msg: None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn wire_body_field_names() {
        let err = ApiError::from((
            AuthKind::InvalidSignature,
            "signature verification failed"
        ));

        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["error"], "AuthenticationFailed");
        assert_eq!(json["message"], "signature verification failed");
    }

    #[test]
    pub fn auth_reasons_share_one_wire_kind() {
        let reasons = [
            AuthKind::InvalidHeaders,
            AuthKind::InvalidHost,
            AuthKind::InvalidSignature,
            AuthKind::UserNotFound,
        ];

        for reason in reasons {
            assert_eq!(ApiErrorKind::from(reason).as_str(), "AuthenticationFailed");
        }

        assert_eq!(ApiErrorKind::from(AuthKind::PermissionDenied).as_str(), "NotAuthorized");
    }

    #[test]
    pub fn kind_round_trip() {
        let kinds = [
            ApiErrorKind::from(GeneralKind::AlreadyExists),
            ApiErrorKind::from(AuthKind::UserNotFound),
            ApiErrorKind::from(UserKind::NotFound),
            ApiErrorKind::from(GroupKind::NameExists),
            ApiErrorKind::from(PolicyKind::NotFound),
            ApiErrorKind::from(SessionKind::NotFound),
        ];

        for kind in kinds {
            let parsed = ApiErrorKind::from_str(kind.as_str())
                .expect("kind did not parse back");

            let status_given = StatusCode::from(&kind);
            let status_parsed = StatusCode::from(&parsed);

            assert_eq!(status_given, status_parsed, "{}", kind);
        }
    }

    #[test]
    pub fn status_mapping() {
        assert_eq!(StatusCode::from(&ApiErrorKind::from(AuthKind::InvalidHost)), StatusCode::UNAUTHORIZED);
        assert_eq!(StatusCode::from(&ApiErrorKind::from(AuthKind::PermissionDenied)), StatusCode::FORBIDDEN);
        assert_eq!(StatusCode::from(&ApiErrorKind::from(UserKind::NotFound)), StatusCode::NOT_FOUND);
        assert_eq!(StatusCode::from(&ApiErrorKind::from(GeneralKind::AlreadyExists)), StatusCode::CONFLICT);
    }
}
