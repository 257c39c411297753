use reqwest::ClientBuilder;

/// Whether TLS certificates of targets are verified. On by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SslVerify(bool);

impl SslVerify {
    pub fn new(verify: bool) -> Self {
        SslVerify(verify)
    }

    pub fn get(&self) -> bool {
        self.0
    }

    pub(crate) fn apply_to_builder(&self, builder: ClientBuilder) -> ClientBuilder {
        if self.0 {
            builder
        } else {
            builder.danger_accept_invalid_certs(true)
        }
    }
}

impl Default for SslVerify {
    fn default() -> Self {
        SslVerify(true)
    }
}
