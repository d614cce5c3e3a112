//! HTTP utility functions for consistent error handling across API calls

use reqwest::{Response, StatusCode};
use tracing::warn;

use crate::errors::{CalendarError, CalendarResult};

/// Turn non-success responses into errors, logging the body for debugging
pub async fn handle_api_response(response: Response, context: &str) -> CalendarResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    warn!("Events API error for {}: {} - {}", context, status, error_text);

    if status == StatusCode::NOT_FOUND {
        return Err(CalendarError::NotFound {
            resource: context.to_string(),
        });
    }

    Err(CalendarError::Api {
        status: status.as_u16(),
        message: error_text,
    })
}

/// Parse JSON response with consistent error handling
pub async fn parse_json_response<T>(response: Response, context: &str) -> CalendarResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| CalendarError::Parsing {
        format: format!("{} JSON", context),
        message: e.to_string(),
    })
}
