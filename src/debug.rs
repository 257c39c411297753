use crate::request::{Dispatched, Outcome};

const PREVIEW_CHARS: usize = 200;

fn preview(body: &str) -> &str {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Per-request trace line. Successes log at debug, failures at warn.
pub fn log_outcome(method: &str, dispatched: &Dispatched) {
    let elapsed_ms = dispatched.elapsed.as_millis() as u64;
    match &dispatched.outcome {
        Outcome::Success { target, status, body } => {
            tracing::debug!(
                index = dispatched.index,
                method,
                url = %target,
                status,
                elapsed_ms,
                body_len = body.len(),
                body = preview(body),
                "response received"
            );
        }
        Outcome::Failure { target, stage, message } => {
            tracing::warn!(
                index = dispatched.index,
                method,
                url = %target,
                stage = %stage,
                elapsed_ms,
                error = %message,
                "request failed"
            );
        }
    }
}
