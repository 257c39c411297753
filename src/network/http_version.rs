use std::fmt;
use std::str::FromStr;

use reqwest::ClientBuilder;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HttpVersion {
    /// Negotiate the best HTTP version
    #[default]
    Auto,
    /// HTTP/1.1 only
    Http1Only,
    /// Prefer HTTP/2, fall back to HTTP/1.1
    Http2,
    /// HTTP/2 without fallback; the server must speak it
    Http2PriorKnowledge,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Auto => "AUTO",
            HttpVersion::Http1Only => "HTTP1_ONLY",
            HttpVersion::Http2 => "HTTP2",
            HttpVersion::Http2PriorKnowledge => "HTTP2_PRIOR_KNOWLEDGE",
        }
    }

    pub(crate) fn apply_to_builder(&self, builder: ClientBuilder) -> ClientBuilder {
        match self {
            HttpVersion::Auto | HttpVersion::Http2 => builder,
            HttpVersion::Http1Only => builder.http1_only(),
            HttpVersion::Http2PriorKnowledge => builder.http2_prior_knowledge(),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHttpVersionError(String);

impl fmt::Display for ParseHttpVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid HTTP version '{}'; expected AUTO, HTTP1_ONLY, HTTP2 or HTTP2_PRIOR_KNOWLEDGE",
            self.0
        )
    }
}

impl std::error::Error for ParseHttpVersionError {}

impl FromStr for HttpVersion {
    type Err = ParseHttpVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "AUTO" | "" => Ok(HttpVersion::Auto),
            "HTTP1" | "HTTP1.1" | "HTTP1_ONLY" => Ok(HttpVersion::Http1Only),
            "HTTP2" => Ok(HttpVersion::Http2),
            "HTTP2_PRIOR_KNOWLEDGE" | "FORCE_HTTP2" | "HTTP2_ONLY" => Ok(HttpVersion::Http2PriorKnowledge),
            _ => Err(ParseHttpVersionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("".parse::<HttpVersion>().unwrap(), HttpVersion::Auto);
        assert_eq!("http1.1".parse::<HttpVersion>().unwrap(), HttpVersion::Http1Only);
        assert_eq!("Http2".parse::<HttpVersion>().unwrap(), HttpVersion::Http2);
        assert_eq!(
            "http2-prior-knowledge".parse::<HttpVersion>().unwrap(),
            HttpVersion::Http2PriorKnowledge
        );
        assert_eq!("FORCE_HTTP2".parse::<HttpVersion>().unwrap(), HttpVersion::Http2PriorKnowledge);
    }

    #[test]
    fn rejects_unknown_versions() {
        let err = "http3".parse::<HttpVersion>().unwrap_err();
        assert!(err.to_string().contains("http3"));
    }

    #[test]
    fn display_round_trips() {
        for version in [
            HttpVersion::Auto,
            HttpVersion::Http1Only,
            HttpVersion::Http2,
            HttpVersion::Http2PriorKnowledge,
        ] {
            assert_eq!(version.to_string().parse::<HttpVersion>().unwrap(), version);
        }
    }
}
