use std::num::NonZeroUsize;

use clap::ValueEnum;

/// Order in which outcomes are handed to the sink.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ReportOrder {
    /// As each request completes
    #[default]
    Arrival,
    /// In batch order, each outcome released once all earlier ones are out
    Submission,
}

#[derive(Clone, Debug, Default)]
pub struct DispatchConfig {
    /// Cap on concurrently executing requests; `None` starts all at once.
    pub max_in_flight: Option<NonZeroUsize>,
    pub order: ReportOrder,
}

impl DispatchConfig {
    pub fn with_max_in_flight(mut self, max_in_flight: Option<NonZeroUsize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_order(mut self, order: ReportOrder) -> Self {
        self.order = order;
        self
    }
}
