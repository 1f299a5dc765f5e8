use axum::http::header::HeaderMap;
use axum::http::request::Parts;
use iam_lib::ids::UserIdentifier;
use iam_lib::sec::authn::{PublicKey, Signature, StringToSign, strip_port};
use uuid::Uuid;

use crate::net::error;
use crate::sec::state::Sec;
use crate::storage::{Entity, Store, StoreError};
use crate::storage::types;

/// scheme tag the authorization header must carry
pub const SIGNATURE_SCHEME: &str = "Signature ";

pub const SESSION_TOKEN_HEADER: &str = "session-token";

/// everything pulled off the wire before any storage work happens. the
/// canonical string is rebuilt from the raw request parts, nothing is
/// percent-decoded or re-encoded
#[derive(Debug)]
pub struct SignedRequest {
    pub user: UserIdentifier,
    pub public_key: PublicKey,
    pub signature: Signature,
    pub request_id: Uuid,
    pub host: String,
    pub session_token: Option<String>,
    pub string_to_sign: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing required header: {0}")]
    MissingHeader(String),

    #[error("malformed header value: {0}")]
    MalformedHeader(String),
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ParseError> {
    let Some(value) = headers.get(name) else {
        return Err(ParseError::MissingHeader(name.to_owned()));
    };

    value.to_str().map_err(|_| ParseError::MalformedHeader(name.to_owned()))
}

fn header_str_opt<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ParseError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    value.to_str()
        .map(Some)
        .map_err(|_| ParseError::MalformedHeader(name.to_owned()))
}

pub fn parse(sec: &Sec, parts: &Parts) -> Result<SignedRequest, ParseError> {
    let headers = &parts.headers;

    let authorization = header_str(headers, "authorization")?;

    let Some(signature_b64) = authorization.strip_prefix(SIGNATURE_SCHEME) else {
        return Err(ParseError::MalformedHeader(String::from("authorization")));
    };

    let signature = Signature::from_base64(signature_b64)
        .map_err(|_| ParseError::MalformedHeader(String::from("authorization")))?;

    let host = strip_port(header_str(headers, "host")?).to_owned();

    let user = UserIdentifier::parse(header_str(headers, &sec.header_name("user-id"))?);

    let public_key_name = sec.header_name("public-key");
    let public_key = PublicKey::from_base64(header_str(headers, &public_key_name)?)
        .map_err(|_| ParseError::MalformedHeader(public_key_name))?;

    let request_id_name = sec.header_name("request-id");
    let request_id_text = header_str(headers, &request_id_name)?;
    let request_id = Uuid::parse_str(request_id_text)
        .map_err(|_| ParseError::MalformedHeader(request_id_name))?;

    let session_token = header_str_opt(headers, SESSION_TOKEN_HEADER)?
        .map(str::to_owned);

    // the signed string carries the request id exactly as sent, not the
    // re-serialized uuid
    let string_to_sign = StringToSign {
        method: parts.method.as_str(),
        host: &host,
        path: parts.uri.path(),
        query: parts.uri.query().unwrap_or(""),
        request_id: request_id_text,
        session_token: session_token.as_deref(),
    }.to_bytes();

    Ok(SignedRequest {
        user,
        public_key,
        signature,
        request_id,
        host,
        session_token,
        string_to_sign,
    })
}

/// authenticated caller plus the session named by the request, when a
/// token was presented
#[derive(Debug)]
pub struct Verified {
    pub user: types::User,
    pub session: Option<types::Session>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Headers(#[from] ParseError),

    #[error("request host does not match the configured host")]
    InvalidHost,

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("request id was already used")]
    ReplayedRequestId,

    #[error("user was not found")]
    UserNotFound,

    #[error("session was not found")]
    SessionNotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(Entity::User, _) => LookupError::UserNotFound,
            StoreError::NotFound(Entity::Session, _) => LookupError::SessionNotFound,
            err => LookupError::Store(err),
        }
    }
}

impl From<LookupError> for error::Error {
    fn from(err: LookupError) -> Self {
        // host, signature and unknown-user failures all surface with
        // the same message. the precise reason only reaches the logs
        match err {
            LookupError::Headers(err) => error::Error::api((
                error::AuthKind::InvalidHeaders,
                err.to_string()
            )),
            LookupError::ReplayedRequestId => error::Error::api((
                error::AuthKind::InvalidHeaders,
                "request id was already used"
            )),
            LookupError::InvalidHost => error::Error::api((
                error::AuthKind::InvalidHost,
                "request signature was rejected"
            )),
            LookupError::InvalidSignature => error::Error::api((
                error::AuthKind::InvalidSignature,
                "request signature was rejected"
            )),
            LookupError::UserNotFound => error::Error::api((
                error::AuthKind::UserNotFound,
                "request signature was rejected"
            )),
            LookupError::SessionNotFound => error::Error::api((
                error::SessionKind::NotFound,
                "session was not found"
            )),
            LookupError::Store(err) => err.into(),
        }
    }
}

pub async fn lookup(
    sec: &Sec,
    store: &dyn Store,
    parts: &Parts
) -> Result<Verified, LookupError> {
    let signed = parse(sec, parts)?;

    if signed.host != sec.hostname() {
        tracing::debug!(
            host = %signed.host,
            "request host does not match the configured host"
        );

        return Err(LookupError::InvalidHost);
    }

    let user = store.get_user(&signed.user).await?;

    let registered = user.public_keys.iter()
        .any(|entry| entry.key == signed.public_key);

    if !registered {
        tracing::debug!(uid = %user.uid, "supplied public key is not registered");

        return Err(LookupError::InvalidSignature);
    }

    if !signed.public_key.verify(&signed.string_to_sign, &signed.signature) {
        tracing::debug!(uid = %user.uid, "signature did not verify");

        return Err(LookupError::InvalidSignature);
    }

    if !sec.check_replay(user.uid, signed.request_id) {
        tracing::debug!(uid = %user.uid, "request id replayed inside the window");

        return Err(LookupError::ReplayedRequestId);
    }

    let session = if let Some(token) = &signed.session_token {
        Some(store.get_session_by_token(&user.uid, token).await?)
    } else {
        None
    };

    Ok(Verified { user, session })
}
