use std::fmt;
use std::time::{Duration, SystemTime};

use serde_json::{Map, Value};

use crate::error::{ExecuteError, Stage};
use crate::utils::format_datetime;

/// Terminal result of executing one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        target: String,
        status: u16,
        body: String,
    },
    Failure {
        target: String,
        stage: Stage,
        message: String,
    },
}

impl Outcome {
    pub fn failure(target: impl Into<String>, err: ExecuteError) -> Self {
        Outcome::Failure {
            target: target.into(),
            stage: err.stage(),
            message: err.into_message(),
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Outcome::Success { target, .. } | Outcome::Failure { target, .. } => target,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { target, body, .. } => write!(f, "Response from {}: {}", target, body),
            Outcome::Failure {
                target,
                stage,
                message,
            } => write!(f, "Error {} for {}: {}", stage, target, message),
        }
    }
}

/// An outcome as delivered by the dispatch stream.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Position of the descriptor in its batch.
    pub index: usize,
    pub outcome: Outcome,
    pub started: SystemTime,
    pub elapsed: Duration,
}

impl Dispatched {
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("index".to_string(), Value::from(self.index));
        obj.insert("url".to_string(), Value::String(self.outcome.target().to_string()));
        match &self.outcome {
            Outcome::Success { status, body, .. } => {
                obj.insert("status".to_string(), Value::from(*status));
                obj.insert("response".to_string(), Value::String(body.clone()));
            }
            Outcome::Failure { stage, message, .. } => {
                obj.insert("stage".to_string(), Value::String(stage.to_string()));
                obj.insert("error".to_string(), Value::String(message.clone()));
            }
        }
        let finished = self.started + self.elapsed;
        obj.insert(
            "request_time".to_string(),
            Value::String(format!("{} -> {}", format_datetime(self.started), format_datetime(finished))),
        );
        obj.insert(
            "process_time".to_string(),
            Value::String(format!("{:.4}", self.elapsed.as_secs_f64())),
        );
        Value::Object(obj)
    }
}

impl fmt::Display for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.outcome.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_line() {
        let outcome = Outcome::Success {
            target: "https://example.test/ok".to_string(),
            status: 200,
            body: "hello".to_string(),
        };
        assert_eq!(outcome.to_string(), "Response from https://example.test/ok: hello");
        assert!(outcome.is_success());
    }

    #[test]
    fn failure_line() {
        let outcome = Outcome::failure(
            "https://example.test/down",
            ExecuteError::Transmission("connection refused".to_string()),
        );
        assert_eq!(
            outcome.to_string(),
            "Error transmission for https://example.test/down: connection refused"
        );
        assert_eq!(outcome.target(), "https://example.test/down");
    }

    #[test]
    fn json_record_for_failure() {
        let dispatched = Dispatched {
            index: 3,
            outcome: Outcome::failure("::", ExecuteError::Construction("relative URL without a base".into())),
            started: SystemTime::now(),
            elapsed: Duration::from_millis(1500),
        };
        let json = dispatched.to_json();
        assert_eq!(json["index"], 3);
        assert_eq!(json["url"], "::");
        assert_eq!(json["stage"], "request-construction");
        assert_eq!(json["error"], "relative URL without a base");
        assert_eq!(json["process_time"], "1.5000");
        assert!(json.get("status").is_none());
        assert!(json["request_time"].as_str().unwrap().contains(" -> "));
    }

    #[test]
    fn json_record_for_success() {
        let dispatched = Dispatched {
            index: 0,
            outcome: Outcome::Success {
                target: "http://a.test".into(),
                status: 404,
                body: "nope".into(),
            },
            started: SystemTime::now(),
            elapsed: Duration::ZERO,
        };
        let json = dispatched.to_json();
        assert_eq!(json["status"], 404);
        assert_eq!(json["response"], "nope");
        assert!(json.get("stage").is_none());
    }
}
