use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use url::Url;

use crate::error::{error_chain, ExecuteError};
use crate::request::{Outcome, RequestDescriptor};

/// A request that passed construction and header application, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    /// Insert every header, replacing any earlier value under the same name.
    pub fn apply_headers<'a, I>(&mut self, headers: I) -> Result<(), ExecuteError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in headers {
            let h_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ExecuteError::HeaderApplication(format!("invalid header name {:?}: {}", name, e)))?;
            let h_val = HeaderValue::from_str(value)
                .map_err(|e| ExecuteError::HeaderApplication(format!("invalid value for header {}: {}", name, e)))?;
            self.headers.insert(h_name, h_val);
        }
        Ok(())
    }
}

/// A fully-read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Capability to put one prepared request on the wire and read the whole
/// response.
///
/// Implementations are shared by every in-flight execution of a batch and
/// must be safe for concurrent use. Errors must come back as
/// `ExecuteError::Transmission` or `ExecuteError::ResponseRead`.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, Result<Reply, ExecuteError>>;
}

/// Transport over a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, Result<Reply, ExecuteError>> {
        Box::pin(async move {
            let mut request_builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                request_builder = request_builder.body(body);
            }
            if let Some(timeout) = request.timeout {
                request_builder = request_builder.timeout(timeout);
            }

            let res = request_builder
                .send()
                .await
                .map_err(|e| ExecuteError::Transmission(error_chain(&e)))?;
            let status = res.status().as_u16();
            let body = res
                .text()
                .await
                .map_err(|e| ExecuteError::ResponseRead(error_chain(&e)))?;

            Ok(Reply { status, body })
        })
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Turn a descriptor into a request ready for the transport.
///
/// Covers the request-construction and header-application stages; nothing
/// here touches the network.
pub fn prepare(req: &RequestDescriptor) -> Result<PreparedRequest, ExecuteError> {
    let method_str = if req.method.is_empty() {
        "GET".to_string()
    } else {
        req.method.to_uppercase()
    };
    let method = Method::from_bytes(method_str.as_bytes())
        .map_err(|e| ExecuteError::Construction(format!("invalid method {:?}: {}", req.method, e)))?;

    let url = Url::parse(&req.target)
        .map_err(|e| ExecuteError::Construction(format!("parse {:?}: {}", req.target, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExecuteError::Construction(format!(
            "unsupported protocol scheme {:?}",
            url.scheme()
        )));
    }

    let timeout = match req.timeout {
        Some(secs) if secs > 0.0 => Some(
            Duration::try_from_secs_f64(secs)
                .map_err(|e| ExecuteError::Construction(format!("invalid timeout {}: {}", secs, e)))?,
        ),
        Some(secs) => {
            return Err(ExecuteError::Construction(format!("invalid timeout {}", secs)));
        }
        None => None,
    };

    let mut headers = HeaderMap::new();
    let body = match &req.body {
        Some(fields) if carries_body(&method) => {
            let payload = serde_json::to_vec(fields)
                .map_err(|e| ExecuteError::Construction(format!("serialize body: {}", e)))?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(payload)
        }
        _ => None,
    };

    let mut prepared = PreparedRequest {
        method,
        url,
        headers,
        body,
        timeout,
    };
    prepared.apply_headers(&req.headers)?;
    Ok(prepared)
}

/// Execute one descriptor. Every failure comes back as `Outcome::Failure`.
pub async fn execute_single_request(req: &RequestDescriptor, transport: &dyn Transport) -> Outcome {
    let prepared = match prepare(req) {
        Ok(prepared) => prepared,
        Err(e) => return Outcome::failure(req.target.as_str(), e),
    };

    match transport.send(prepared).await {
        Ok(reply) => Outcome::Success {
            target: req.target.clone(),
            status: reply.status,
            body: reply.body,
        },
        Err(e) => Outcome::failure(req.target.as_str(), e),
    }
}
