use thiserror::Error;

/// # Summary
/// Market data errors: transport, decoding and missing data.
///
/// # Invariants
/// - Always a transport-class failure for the scanner: logged, subject skipped,
///   no alert state touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarketError {
    // connection failure, timeout or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),
    // provider throttled the request (HTTP 429)
    #[error("Rate limited by provider")]
    RateLimited,
    // response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
    // subject unknown to the provider
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Unknown error: {0}")]
    Unknown(String),
}
