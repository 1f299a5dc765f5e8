pub mod timeout;

pub mod trace {
    use std::time::Duration;

    use axum::body::BoxBody;
    use axum::http::{Request, Response};
    use hyper::Body;
    use tower_http::classify::ServerErrorsFailureClass;
    use tracing::Span;

    pub fn make_span_with(request: &Request<Body>) -> Span {
        tracing::info_span!(
            "REQ",
            v = ?request.version(),
            m = %request.method(),
            u = %request.uri(),
            s = tracing::field::Empty
        )
    }

    pub fn on_response(response: &Response<BoxBody>, latency: Duration, span: &Span) {
        span.record("s", tracing::field::display(response.status()));

        tracing::info!("{:#?}", latency)
    }

    pub fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
        tracing::error!("{} {:#?}", error, latency)
    }
}
