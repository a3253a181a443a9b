use serde::{Deserialize, Serialize};

/// Outcome classification for the legacy service envelope.
///
/// `ActionRequired` signals that the caller must complete a step (for
/// example, set up their encryption key) before the operation can proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Success,
    Error,
    ActionRequired,
}

/// Translated error carried alongside a non-success result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    pub code: String,
    pub message: String,
}

impl RequestError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Tri-state result envelope returned by the first-generation services.
///
/// Newer services raise typed errors instead; this envelope survives on the
/// endpoints whose clients depend on its wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResult<T> {
    pub result: ResultType,
    pub payload: Option<T>,
    pub error: Option<RequestError>,
    pub total_count: Option<i64>,
}

impl<T> RequestResult<T> {
    #[must_use]
    pub fn success(payload: T) -> Self {
        Self {
            result: ResultType::Success,
            payload: Some(payload),
            error: None,
            total_count: None,
        }
    }

    #[must_use]
    pub fn error(error: RequestError) -> Self {
        Self {
            result: ResultType::Error,
            payload: None,
            error: Some(error),
            total_count: None,
        }
    }

    #[must_use]
    pub fn action_required(error: RequestError) -> Self {
        Self {
            result: ResultType::ActionRequired,
            payload: None,
            error: Some(error),
            total_count: None,
        }
    }

    #[must_use]
    pub fn with_total_count(mut self, count: i64) -> Self {
        self.total_count = Some(count);
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.result, ResultType::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_payload() {
        let result = RequestResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.payload, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn action_required_carries_error() {
        let result: RequestResult<()> =
            RequestResult::action_required(RequestError::new("missing_key", "Profile has no key"));
        assert!(!result.is_success());
        assert_eq!(result.result, ResultType::ActionRequired);
        assert_eq!(
            result.error.map(|e| e.code),
            Some("missing_key".to_string())
        );
    }
}
