use reqwest::StatusCode;
use thiserror::Error;

/// A per-location fetch failure. These are caught inside the assembler and
/// downgraded to [`FetchWarning`]s; one location failing never aborts the
/// assembly of the others.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {location} failed: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Open-Meteo returned status {status} for {location}: {body}")]
    Status {
        location: String,
        status: StatusCode,
        body: String,
    },

    #[error("malformed forecast payload for {location}: {reason}")]
    MalformedPayload { location: String, reason: String },
}

impl FetchError {
    /// The location this failure is tagged with.
    pub fn location(&self) -> &str {
        match self {
            FetchError::Transport { location, .. }
            | FetchError::Status { location, .. }
            | FetchError::MalformedPayload { location, .. } => location,
        }
    }
}

/// Soft warning recorded when a location is skipped during one assembly
/// cycle. Kept on the assembled bundle so callers can report which
/// locations are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWarning {
    pub location: String,
    pub message: String,
}

impl From<FetchError> for FetchWarning {
    fn from(err: FetchError) -> Self {
        Self {
            location: err.location().to_string(),
            message: err.to_string(),
        }
    }
}

/// Input outside the declared domain of a binning function. Raised instead
/// of silently clamping so boundary behavior stays pinned by tests.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("value {value} is outside the supported range {min}..={max}")]
pub struct ValueRangeError {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_carries_location_and_cause() {
        let err = FetchError::Status {
            location: "Niort".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.location(), "Niort");

        let warning = FetchWarning::from(err);
        assert_eq!(warning.location, "Niort");
        assert!(warning.message.contains("503"));
        assert!(warning.message.contains("upstream down"));
    }

    #[test]
    fn range_error_names_the_bounds() {
        let err = ValueRangeError { value: -1.0, min: -0.1, max: 100.0 };
        let msg = err.to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("100"));
    }
}
