use axum::body::Full;
use axum::http::StatusCode;
use axum::http::header::HeaderMap;
use axum::response::{Response, IntoResponse};
use bytes::{BufMut, BytesMut};
use tracing::Level;

pub use iam_api::error::{
    ApiError,
    ApiErrorKind,
    Detail,
    GeneralKind,
    AuthKind,
    UserKind,
    GroupKind,
    PolicyKind,
    SessionKind,
};

use crate::storage::{Entity, StoreError};

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

pub fn error_json_response(status: StatusCode, error: ApiError) -> Response {
    let buf = {
        let mut buf = BytesMut::with_capacity(128).writer();
        serde_json::to_writer(&mut buf, &error).unwrap();

        buf.into_inner().freeze()
    };

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("content-length", buf.len())
        .body(Full::new(buf))
        .unwrap()
        .into_response()
}

/// terminal handler for errors escaping the middleware stack
pub async fn handle_error<E>(
    _headers: HeaderMap,
    error: E
) -> Response
where
    E: Into<Error>
{
    let error = error.into();

    if let Some(err) = error.src.as_ref() {
        tracing::event!(
            Level::ERROR,
            "unhandled error when processing request: {:#?}",
            err
        );
    }

    error_json_response(error.status, error.inner)
}

#[derive(Debug)]
pub struct Error {
    status: StatusCode,
    inner: ApiError,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new() -> Self {
        let inner = ApiError::from(GeneralKind::InternalFailure);
        let status = inner.kind().into();

        Error {
            status,
            inner,
            src: None,
        }
    }

    pub fn api<T>(value: T) -> Self
    where
        T: Into<ApiError>
    {
        let err = value.into();
        let status = err.kind().into();

        Error {
            status,
            inner: err,
            src: None
        }
    }

    pub fn source<S>(mut self, src: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.kind())?;

        if let Some(msg) = self.inner.message() {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Some(err) = self.src.as_ref() {
            tracing::event!(
                Level::ERROR,
                "unhandled error when processing request: {:#?}",
                err
            );
        }

        error_json_response(self.status, self.inner)
    }
}

impl From<ApiError> for Error {
    fn from(api_err: ApiError) -> Self {
        let status = api_err.kind().into();

        Error {
            status,
            inner: api_err,
            src: None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity, ident) => {
                let message = format!("{} was not found: {}", entity, ident);

                match entity {
                    Entity::User => Error::api((UserKind::NotFound, message)),
                    Entity::Group => Error::api((GroupKind::NotFound, message)),
                    Entity::Policy => Error::api((PolicyKind::NotFound, message)),
                    Entity::Session => Error::api((SessionKind::NotFound, message)),
                    Entity::Membership |
                    Entity::Attachment => Error::api((GeneralKind::NotFound, message)),
                }
            },
            StoreError::AlreadyExists(entity, ident) => {
                let message = format!("{} already exists: {}", entity, ident);

                match entity {
                    Entity::User => Error::api((UserKind::EmailExists, message)),
                    Entity::Group => Error::api((GroupKind::NameExists, message)),
                    Entity::Policy => Error::api((PolicyKind::NameExists, message)),
                    Entity::Session |
                    Entity::Membership |
                    Entity::Attachment => Error::api((GeneralKind::AlreadyExists, message)),
                }
            },
            err => Error::new().source(err),
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_infallible: std::convert::Infallible) -> Self {
        // this should not happen
        Error::new()
            .source("Infallible. how did this happen")
    }
}

macro_rules! simple_from {
    ($e:path) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .source(err)
            }
        }
    };
}

simple_from!(std::io::Error);

simple_from!(axum::Error);
simple_from!(axum::http::Error);

simple_from!(serde_json::Error);

simple_from!(rand::Error);
