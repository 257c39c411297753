// request/mod.rs

pub mod concurrency;
pub mod config;
pub mod descriptor;
pub mod executor;
pub mod outcome;

pub use concurrency::{Dispatcher, InSubmissionOrder, OutcomeStream};
pub use config::{DispatchConfig, ReportOrder};
pub use descriptor::{Batch, RequestDescriptor};
pub use executor::{execute_single_request, prepare, PreparedRequest, Reply, ReqwestTransport, Transport};
pub use outcome::{Dispatched, Outcome};
