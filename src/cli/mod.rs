//! CLI argument parsing

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use api_dispatcher::{
    ClientConfig, DispatchConfig, HttpVersion, OutputFormat, ProxyConfig, ReportOrder, ServerConfig, SslVerify,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "api-dispatcher")]
#[command(author, version, about = "Dispatch batches of HTTP requests concurrently", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Enable debug logging for every request
    #[arg(short, long, global = true, env = "API_DISPATCHER_VERBOSE")]
    pub verbose: bool,

    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch the batch in a file and print each outcome
    Run {
        /// Path to the batch file
        #[arg(short, long, env = "API_DISPATCHER_CONFIG")]
        config: PathBuf,
    },
    /// Accept batches over HTTP and stream outcomes back
    Serve {
        /// Listen address
        #[arg(long, default_value = api_dispatcher::server::DEFAULT_ADDR, env = "API_DISPATCHER_ADDR")]
        addr: String,

        /// Largest accepted batch body, in bytes
        #[arg(long, default_value_t = api_dispatcher::server::DEFAULT_MAX_BODY_BYTES, env = "API_DISPATCHER_MAX_BODY_BYTES")]
        max_body_bytes: usize,
    },
}

#[derive(Args, Debug)]
pub struct Options {
    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30.0, env = "API_DISPATCHER_TIMEOUT")]
    pub timeout: f64,

    /// Maximum requests in flight at once (unbounded when unset)
    #[arg(long, global = true, env = "API_DISPATCHER_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<NonZeroUsize>,

    /// Order in which outcomes are reported
    #[arg(long, global = true, value_enum, default_value_t = ReportOrder::Arrival, env = "API_DISPATCHER_ORDER")]
    pub order: ReportOrder,

    /// Outcome line format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, env = "API_DISPATCHER_FORMAT")]
    pub format: OutputFormat,

    /// HTTP version for outbound requests: auto, http1, http2 or http2-prior-knowledge (case-insensitive)
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(HttpVersion),
        default_value_t = HttpVersion::Auto,
        env = "API_DISPATCHER_HTTP_VERSION"
    )]
    pub http_version: HttpVersion,

    /// Proxy for all outbound requests
    #[arg(long, global = true, env = "API_DISPATCHER_PROXY")]
    pub proxy: Option<String>,

    /// Proxy for http:// targets
    #[arg(long, global = true, env = "API_DISPATCHER_PROXY_HTTP")]
    pub proxy_http: Option<String>,

    /// Proxy for https:// targets
    #[arg(long, global = true, env = "API_DISPATCHER_PROXY_HTTPS")]
    pub proxy_https: Option<String>,

    /// Proxy username
    #[arg(long, global = true, env = "API_DISPATCHER_PROXY_USER")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, global = true, env = "API_DISPATCHER_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    /// Hosts that bypass the proxy (comma separated)
    #[arg(long, global = true, value_delimiter = ',', env = "API_DISPATCHER_NO_PROXY")]
    pub no_proxy: Vec<String>,

    /// Skip TLS certificate verification of targets
    #[arg(long, global = true, env = "API_DISPATCHER_INSECURE")]
    pub insecure: bool,
}

impl Options {
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        if self.timeout.is_nan() || self.timeout <= 0.0 {
            anyhow::bail!("--timeout must be a positive number of seconds, got {}", self.timeout);
        }
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("--timeout {} is out of range", self.timeout))?;
        let proxy = ProxyConfig {
            http: self.proxy_http.clone(),
            https: self.proxy_https.clone(),
            all: self.proxy.clone(),
            no_proxy: (!self.no_proxy.is_empty()).then(|| self.no_proxy.clone()),
            username: self.proxy_user.clone(),
            password: self.proxy_password.clone(),
        };
        Ok(ClientConfig::default()
            .with_timeout(timeout)
            .with_http_version(self.http_version)
            .with_proxy(proxy)
            .with_ssl_verify(SslVerify::new(!self.insecure)))
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::default()
            .with_max_in_flight(self.max_in_flight)
            .with_order(self.order)
    }

    pub fn server_config(&self, addr: String, max_body_bytes: usize) -> ServerConfig {
        ServerConfig {
            addr,
            max_body_bytes,
            format: self.format,
        }
    }
}
