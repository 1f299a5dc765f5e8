use axum::body::Full;
use axum::http::response::Builder;
use axum::response::{Response, IntoResponse};
use bytes::{BufMut, BytesMut};
use serde::Serialize;

pub mod error;
pub mod layer;

pub struct Json<T> {
    builder: Builder,
    root: T
}

impl<T> Json<T> {
    pub fn new(root: T) -> Self {
        Self {
            builder: Builder::new(),
            root
        }
    }
}

impl Json<iam_lib::json::Wrapper<()>> {
    pub fn empty() -> Self {
        Self {
            builder: Builder::new(),
            root: iam_lib::json::Wrapper::new(()),
        }
    }
}

impl<T> Json<T>
where
    T: Serialize
{
    fn create_response(self) -> error::Result<Response> {
        let buf_froze = {
            let mut buf = BytesMut::with_capacity(128).writer();
            serde_json::to_writer(&mut buf, &self.root)?;

            buf.into_inner().freeze()
        };

        Ok(self.builder.header("content-type", "application/json")
            .body(Full::new(buf_froze))?
            .into_response())
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize
{
    fn into_response(self) -> Response {
        match self.create_response() {
            Ok(res) => res,
            Err(err) => err.into_response(),
        }
    }
}
