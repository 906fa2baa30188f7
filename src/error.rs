use thiserror::Error;

/// Failure to obtain a payload from an exchange endpoint.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("body from {url} is not valid json: {reason}")]
    Decode { url: String, reason: String },
}

/// Malformed payload or record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected} payload(s), got {got}")]
    MissingPayload { expected: usize, got: usize },
    #[error("payload has no `{0}` list")]
    MissingList(&'static str),
    #[error("record has no `{0}` field")]
    MissingField(&'static str),
    #[error("field `{field}` is not a number: {raw}")]
    NotNumeric { field: &'static str, raw: String },
    #[error("`{0}` is absent from the order book listing")]
    UnmatchedSymbol(String),
}

/// Numeric sanity failures. These only shrink result sets and are never
/// surfaced to callers as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("price {0} out of range")]
    PriceOutOfRange(f64),
    #[error("crossed book: bid {bid} >= ask {ask}")]
    Crossed { bid: f64, ask: f64 },
    #[error("spread {spread_percent:.3}% exceeds 1%")]
    SpreadTooWide { spread_percent: f64 },
}

/// Outcome of a single rejected record inside an otherwise usable payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Invalid configuration or scan input. Rejects a cycle before any fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a number, got {raw}")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("unknown exchange `{0}`")]
    UnknownExchange(String),
    #[error("exchange `{0}` is configured twice")]
    DuplicateExchange(String),
    #[error("no adapter registered for exchange `{0}`")]
    NoAdapter(String),
    #[error("endpoint `{endpoint}` of {exchange} is not a valid url: {reason}")]
    BadEndpoint { exchange: String, endpoint: String, reason: String },
    #[error("{exchange} needs {expected} endpoint(s), {got} configured")]
    EndpointCount { exchange: String, expected: usize, got: usize },
    #[error("invalid quote currency list: {0}")]
    BadQuoteCurrencies(String),
    #[error("fee for {exchange} must be a finite non-negative percent, got {fee}")]
    BadFee { exchange: String, fee: f64 },
    #[error("cannot read config file {path}: {reason}")]
    File { path: String, reason: String },
}
