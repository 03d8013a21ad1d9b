use thiserror::Error;

/// Failure of a single call against the reservation API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {source}")]
    Unreachable {
        #[source]
        source: reqwest::Error,
        cold_start: bool,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body could not be read as the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn unreachable(source: reqwest::Error) -> Self {
        let cold_start = source.is_connect() || source.is_timeout();
        Self::Unreachable { source, cold_start }
    }

    /// True when the server could not be reached at all, the usual shape of a
    /// backend that is still spinning up.
    pub fn is_cold_start(&self) -> bool {
        matches!(self, Self::Unreachable { cold_start: true, .. })
    }
}

/// Field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Location,
    CheckIn,
    CheckOut,
    Guests,
    FirstName,
    LastName,
    Email,
    PromoCode,
}

/// A client-side validation failure, carrying the translation key of its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field:?}: {key}")]
pub struct FieldError {
    pub field: Field,
    pub key: &'static str,
}

impl FieldError {
    pub fn new(field: Field, key: &'static str) -> Self {
        Self { field, key }
    }
}

/// Rejection of a booking flow operation. The flow's state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("another request is already in flight")]
    Busy,

    #[error("operation `{operation}` is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] FieldError),

    #[error("no offer at index {0}")]
    NoSuchOffer(usize),
}
