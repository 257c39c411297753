use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Instant, SystemTime};

use futures::stream::{BoxStream, Stream, StreamExt};
use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};

use crate::debug::log_outcome;
use crate::error::ExecuteError;
use crate::request::config::{DispatchConfig, ReportOrder};
use crate::request::executor::{execute_single_request, Transport};
use crate::request::{Dispatched, Outcome, RequestDescriptor};

/// Fans a batch out to one task per descriptor and fans the outcomes back
/// into a single stream.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    limit: Option<Arc<Semaphore>>,
    order: ReportOrder,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, config: &DispatchConfig) -> Self {
        let limit = config
            .max_in_flight
            .map(|n| Arc::new(Semaphore::new(n.get().min(Semaphore::MAX_PERMITS))));
        Self {
            transport,
            limit,
            order: config.order,
        }
    }

    /// Start every descriptor of `batch` and return the stream of their
    /// outcomes, in completion order.
    ///
    /// The stream yields exactly `batch.len()` items and then ends. Must be
    /// called from within a tokio runtime.
    pub fn dispatch(&self, batch: &[RequestDescriptor]) -> OutcomeStream {
        let (tx, rx) = mpsc::channel(batch.len().max(1));

        for (index, req) in batch.iter().enumerate() {
            let req = req.clone();
            let tx = tx.clone();
            let transport = Arc::clone(&self.transport);
            let limit = self.limit.clone();

            tokio::spawn(async move {
                // Held until the outcome is built; the semaphore is never closed.
                let _permit = match &limit {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };

                let started = SystemTime::now();
                let clock = Instant::now();
                let outcome = AssertUnwindSafe(execute_single_request(&req, transport.as_ref()))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Outcome::failure(
                            req.target.as_str(),
                            ExecuteError::Transmission(format!("request task panicked: {}", panic_message(&*panic))),
                        )
                    });
                let dispatched = Dispatched {
                    index,
                    outcome,
                    started,
                    elapsed: clock.elapsed(),
                };
                log_outcome(&req.method, &dispatched);

                if tx.send(dispatched).await.is_err() {
                    tracing::debug!(index, url = %req.target, "outcome receiver dropped");
                }
            });
        }

        OutcomeStream {
            rx,
            remaining: batch.len(),
        }
    }

    /// Like [`Dispatcher::dispatch`], re-sequenced according to the
    /// configured [`ReportOrder`].
    pub fn dispatch_reported(&self, batch: &[RequestDescriptor]) -> BoxStream<'static, Dispatched> {
        let stream = self.dispatch(batch);
        match self.order {
            ReportOrder::Arrival => stream.boxed(),
            ReportOrder::Submission => stream.in_submission_order().boxed(),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Outcomes of one dispatch, as they complete.
///
/// Counts what it has delivered and ends after the last expected outcome.
#[derive(Debug)]
pub struct OutcomeStream {
    rx: mpsc::Receiver<Dispatched>,
    remaining: usize,
}

impl OutcomeStream {
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn in_submission_order(self) -> InSubmissionOrder {
        InSubmissionOrder {
            inner: self,
            pending: BTreeMap::new(),
            next: 0,
        }
    }
}

impl Stream for OutcomeStream {
    type Item = Dispatched;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            this.rx.close();
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(dispatched)) => {
                this.remaining -= 1;
                Poll::Ready(Some(dispatched))
            }
            Poll::Ready(None) => {
                tracing::warn!(missing = this.remaining, "dispatch tasks ended without reporting");
                this.remaining = 0;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Releases outcomes by index, each as soon as every earlier one is out.
#[derive(Debug)]
pub struct InSubmissionOrder {
    inner: OutcomeStream,
    pending: BTreeMap<usize, Dispatched>,
    next: usize,
}

impl Stream for InSubmissionOrder {
    type Item = Dispatched;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(dispatched) = this.pending.remove(&this.next) {
                this.next += 1;
                return Poll::Ready(Some(dispatched));
            }
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(dispatched)) => {
                    this.pending.insert(dispatched.index, dispatched);
                }
                Poll::Ready(None) => {
                    return Poll::Ready(this.pending.pop_first().map(|(_, d)| d));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
