use thiserror::Error;

/// Errors raised by the flood-monitoring client.
///
/// Every variant is local to one fetch attempt. Callers working through
/// several stations catch these per station and carry on (see
/// [`crate::batch`]).
#[derive(Debug, Error)]
pub enum FloodError {
    #[error("network request failed for {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {code}")]
    HttpStatus { url: String, code: u16 },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("station id {0} not found, ensure the id is correct")]
    StationNotFound(String),

    #[error("station {station} does not measure {measure}, valid station measures are {available:?}")]
    MeasureNotAtStation {
        station: String,
        measure: String,
        available: Vec<String>,
    },

    #[error("measure {0} is not valid, use one of level, flow, wind, temperature")]
    UnknownMeasure(String),

    #[error("no readings found for {measure} at station {station}")]
    EmptyReadings { station: String, measure: String },

    #[error("invalid date '{input}', expected {expected}")]
    InvalidDate { input: String, expected: &'static str },

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FloodError>;
