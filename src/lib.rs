//! Concurrent dispatch of HTTP request batches.
//!
//! A batch of independent request descriptors is fanned out, one task per
//! request, and every outcome (response or staged failure) is fanned back
//! into a single stream that ends after exactly one outcome per request.
//!
//! ```ignore
//! use std::sync::Arc;
//! use api_dispatcher::{Batch, ClientConfig, DispatchConfig, Dispatcher, ReqwestTransport};
//!
//! let client = ClientConfig::default().build_client()?;
//! let dispatcher = Dispatcher::new(Arc::new(ReqwestTransport::new(client)), &DispatchConfig::default());
//! let batch = Batch::from_path("requests.json").await?;
//! let mut outcomes = dispatcher.dispatch(&batch.requests);
//! while let Some(dispatched) = outcomes.next().await {
//!     println!("{}", dispatched);
//! }
//! ```

pub mod debug;
pub mod error;
pub mod network;
pub mod report;
pub mod request;
pub mod server;
pub mod utils;

pub use error::{Error, ExecuteError, Result, Stage};
pub use network::{ClientConfig, HttpVersion, ProxyConfig, SslVerify};
pub use report::{render, write_report, OutputFormat};
pub use request::{
    Batch, DispatchConfig, Dispatched, Dispatcher, Outcome, OutcomeStream, ReportOrder, RequestDescriptor,
    ReqwestTransport, Transport,
};
pub use server::ServerConfig;
