use thiserror::Error;

/// Structured error types for the event calendar
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    /// An event date string that does not parse to a calendar date
    #[error("Invalid date: '{input}' is not a recognised ISO-8601 date or date-time")]
    InvalidDate { input: String },

    /// One of the upstream event feeds could not be retrieved
    #[error("Source fetch error: {source_name} events unavailable: {message}")]
    SourceFetch { source_name: String, message: String },

    /// Response bodies that are not the expected JSON
    #[error("Parsing error: Failed to parse {format}: {message}")]
    Parsing { format: String, message: String },

    /// Network connectivity errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-success responses from the events API
    #[error("API error: request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Timeout errors
    #[error("Timeout error: {operation} timed out")]
    Timeout { operation: String },

    /// Requested record does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

/// Result type alias using CalendarError
pub type CalendarResult<T> = std::result::Result<T, CalendarError>;

impl CalendarError {
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate { input: input.into() }
    }

    pub fn source_fetch(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFetch {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Convert reqwest::Error to CalendarError
impl From<reqwest::Error> for CalendarError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                operation: "HTTP request".to_string(),
            }
        } else if error.is_connect() {
            Self::Network {
                message: format!("Connection failed: {}", error),
            }
        } else if error.is_decode() {
            Self::Parsing {
                format: "JSON".to_string(),
                message: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Api {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::Network {
                message: error.to_string(),
            }
        }
    }
}
