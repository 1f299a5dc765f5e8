use clap::Parser;
use tracing_subscriber::{FmtSubscriber, EnvFilter};

mod error;
mod config;
mod net;
mod sec;
mod state;
mod storage;
mod routing;

fn main() {
    use tokio::runtime::Builder;

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .expect("failed to initialize global tracing subscriber");

    let args = config::CliArgs::parse();

    let rt = match Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .max_blocking_threads(4)
        .build() {
        Ok(rt) => rt,
        Err(err) => {
            panic!("failed to start tokio runtime. {}", err);
        }
    };

    tracing::event!(
        tracing::Level::INFO,
        "started tokio runtime"
    );

    if let Err(err) = rt.block_on(init(args)) {
        match err.into_parts() {
            (kind, Some(msg), Some(err)) => {
                tracing::event!(
                    tracing::Level::ERROR,
                    "{}: {}\n{}",
                    kind,
                    msg,
                    err
                );
            },
            (kind, Some(msg), None) => {
                tracing::event!(
                    tracing::Level::ERROR,
                    "{}: {}",
                    kind,
                    msg
                );
            },
            (kind, None, Some(err)) => {
                tracing::event!(
                    tracing::Level::ERROR,
                    "{}: {}",
                    kind,
                    err
                );
            },
            (kind, None, None) => {
                tracing::event!(
                    tracing::Level::ERROR,
                    "{}",
                    kind
                );
            }
        }
    }
}

async fn init(args: config::CliArgs) -> error::Result<()> {
    let config::Config { socket, state } = config::get_config(args)?;

    let router = routing::router(std::sync::Arc::new(state));

    let server = hyper::Server::try_bind(&socket)
        .map_err(|error| error::Error::new()
            .message(format!("failed to bind to socket address: {:#?}", socket))
            .source(error)
        )?
        .serve(router.into_make_service());

    tracing::event!(
        tracing::Level::INFO,
        addr = %server.local_addr(),
        "server listening",
    );

    if let Err(err) = server.await {
        Err(error::Error::new()
            .message("server error")
            .source(err))
    } else {
        Ok(())
    }
}
