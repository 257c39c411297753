// src/network/mod.rs
pub mod http_version;
pub mod proxy_config;
pub mod ssl_verify;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;

pub use http_version::HttpVersion;
pub use proxy_config::ProxyConfig;
pub use ssl_verify::SslVerify;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the shared HTTP client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub http_version: HttpVersion,
    pub proxy: ProxyConfig,
    pub ssl_verify: SslVerify,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            http_version: HttpVersion::Auto,
            proxy: ProxyConfig::default(),
            ssl_verify: SslVerify::default(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_http_version(mut self, http_version: HttpVersion) -> Self {
        self.http_version = http_version;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_ssl_verify(mut self, ssl_verify: SslVerify) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    /// Build the one client that every request of the process shares.
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .user_agent(self.user_agent.as_str());

        builder = self.http_version.apply_to_builder(builder);
        builder = self.ssl_verify.apply_to_builder(builder);
        builder = self.proxy.apply_to_builder(builder)?;

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_builds() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.ssl_verify.get());
        assert!(config.user_agent.starts_with("api-dispatcher/"));
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn customised_client_builds() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_http_version(HttpVersion::Http1Only)
            .with_ssl_verify(SslVerify::new(false))
            .with_proxy(ProxyConfig::from_url("http://127.0.0.1:3128"));
        assert!(config.build_client().is_ok());
    }
}
