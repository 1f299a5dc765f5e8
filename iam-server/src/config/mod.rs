use std::net::{SocketAddr, IpAddr};
use std::str::FromStr;

use clap::Parser;

use crate::error;
use crate::state;

/// shared prefix for the environment variables the server reads
pub const ENV_PREFIX: &str = "IAM";

#[derive(Debug)]
pub struct Config {
    pub socket: SocketAddr,
    pub state: state::Shared,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// ip address to bind the server to
    #[arg(short, long)]
    pub ip: Option<String>,

    /// port for the server to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// public hostname requests must be signed against
    #[arg(long)]
    pub host: Option<String>,

    /// prefix for the authentication headers
    #[arg(long)]
    pub header_prefix: Option<String>,

    /// session time to live in seconds
    #[arg(long)]
    pub session_ttl: Option<u64>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

fn env_parsed<T>(name: &str) -> error::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display
{
    let Some(value) = env_var(name) else {
        return Ok(None);
    };

    match value.parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => Err(error::Error::new()
            .kind("InvalidEnv")
            .message(format!("{}_{} could not be parsed: {}", ENV_PREFIX, name, err)))
    }
}

pub fn get_config(arg: CliArgs) -> error::Result<Config> {
    // TLS termination is not built in. refuse the variables rather than
    // silently serving plaintext with them set
    if env_var("TLS_CERT").is_some() || env_var("TLS_KEY").is_some() {
        return Err(error::Error::new()
            .kind("TlsUnsupported")
            .message(format!(
                "{0}_TLS_CERT / {0}_TLS_KEY are set but the server only binds plain http. terminate tls at the fronting proxy",
                ENV_PREFIX
            )));
    }

    let mut state_builder = state::Shared::builder();

    {
        let sec = state_builder.sec();

        if let Some(host) = env_var("HOST") {
            sec.set_hostname(host);
        }

        if let Some(host) = &arg.host {
            sec.set_hostname(host.clone());
        }

        if let Some(prefix) = env_var("HEADER_PREFIX") {
            sec.set_header_prefix(prefix);
        }

        if let Some(prefix) = &arg.header_prefix {
            sec.set_header_prefix(prefix.clone());
        }

        if let Some(ttl) = env_parsed::<u64>("SESSION_TTL")? {
            sec.set_session_ttl(ttl);
        }

        if let Some(ttl) = arg.session_ttl {
            sec.set_session_ttl(ttl);
        }
    }

    let port = if let Some(port) = arg.port {
        port
    } else {
        env_parsed::<u16>("PORT")?.unwrap_or(0)
    };

    let ip = if let Some(ip) = &arg.ip {
        IpAddr::from_str(ip)
            .map_err(|_| error::Error::new()
                .kind("InvalidIp")
                .message("invalid ip address provided"))?
    } else {
        IpAddr::from([0, 0, 0, 0])
    };

    tracing::debug!("shared state builder {:#?}", state_builder);

    let rtn = Config {
        state: state_builder.build()?,
        socket: SocketAddr::new(ip, port),
    };

    Ok(rtn)
}
