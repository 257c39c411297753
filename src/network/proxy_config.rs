use reqwest::{ClientBuilder, NoProxy, Proxy};
use url::Url;

use crate::error::Result;

/// Outbound proxy settings shared by every request of a client.
///
/// `all` takes precedence over the scheme-specific `http`/`https` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
    pub no_proxy: Option<Vec<String>>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn from_url(proxy_url: impl Into<String>) -> Self {
        Self {
            all: Some(proxy_url.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_none() && self.http.is_none() && self.https.is_none()
    }

    pub(crate) fn apply_to_builder(&self, mut builder: ClientBuilder) -> Result<ClientBuilder> {
        if let Some(all) = &self.all {
            builder = builder.proxy(self.finish(Proxy::all(self.validate(all)?)?));
        } else {
            if let Some(http) = &self.http {
                builder = builder.proxy(self.finish(Proxy::http(self.validate(http)?)?));
            }
            if let Some(https) = &self.https {
                builder = builder.proxy(self.finish(Proxy::https(self.validate(https)?)?));
            }
        }
        Ok(builder)
    }

    fn validate(&self, proxy_url: &str) -> Result<Url> {
        Ok(Url::parse(proxy_url)?)
    }

    fn finish(&self, mut proxy: Proxy) -> Proxy {
        if let Some(user) = &self.username {
            proxy = proxy.basic_auth(user, self.password.as_deref().unwrap_or(""));
        }
        if let Some(hosts) = &self.no_proxy {
            proxy = proxy.no_proxy(NoProxy::from_string(&hosts.join(",")));
        }
        proxy
    }
}
