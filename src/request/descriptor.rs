use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One request awaiting dispatch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestDescriptor {
    #[serde(rename = "url")]
    pub target: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON object sent as the payload of body-bearing methods.
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
    /// Per-request timeout in seconds; the client default applies when unset.
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl RequestDescriptor {
    pub fn new(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

/// Requests submitted together, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub requests: Vec<RequestDescriptor>,
}

impl Batch {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read and decode a batch file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::ReadBatch {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl From<Vec<RequestDescriptor>> for Batch {
    fn from(requests: Vec<RequestDescriptor>) -> Self {
        Self { requests }
    }
}
