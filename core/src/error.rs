//! Error types for the partner API client.
//!
//! # Design
//! Only credential validation is fatal: `AuthError` is returned from
//! `authenticate` before any request is made. Every other failure is an
//! `ApiError` value that ends up in the `Error` variant of an
//! [`Envelope`](crate::envelope::Envelope), so callers get one uniform result
//! shape from every endpoint operation. `TransportError` is what a
//! `Transport` reports when no HTTP response was obtained at all.

use serde_json::Value;
use thiserror::Error;

/// Fatal precondition failure while authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email or password was blank after trimming.
    #[error("One or more required parameters was not supplied. Both email and password required!")]
    MissingCredentials,
}

/// Recoverable failure carried inside an error envelope.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// `search` was called without any parameters.
    #[error("Search parameters missing.")]
    MissingSearchParams,

    /// `search` got a parameter outside the resource's whitelist.
    #[error("Incorrect parameter in search.")]
    InvalidSearchParam { param: String },

    /// Page below 1, or beyond the `total_pages` the API reported.
    #[error("requested page does not exist")]
    InvalidPage,

    /// Unexpected or null top-level key, or malformed pagination data.
    #[error("empty response")]
    EmptyResponse,

    /// No usable body came back.
    #[error("transport failure")]
    TransportFailure,

    /// The body carried an explicit `errors` field; kept verbatim.
    #[error("{0}")]
    Upstream(Value),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The operation does not exist for this resource.
    #[error("{operation} is not supported for {resource}")]
    Unsupported {
        operation: &'static str,
        resource: &'static str,
    },
}

impl ApiError {
    /// The message as exposed in an error envelope: the raw payload for
    /// upstream errors, the display string for everything else.
    pub fn message(&self) -> Value {
        match self {
            ApiError::Upstream(payload) => payload.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// The transport could not produce an HTTP response (connection refused,
/// timeout, unreadable body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_match_the_api_wording() {
        assert_eq!(ApiError::MissingSearchParams.to_string(), "Search parameters missing.");
        assert_eq!(
            ApiError::InvalidSearchParam { param: "bogus".to_string() }.to_string(),
            "Incorrect parameter in search."
        );
        assert_eq!(ApiError::InvalidPage.to_string(), "requested page does not exist");
        assert_eq!(ApiError::EmptyResponse.to_string(), "empty response");
        assert_eq!(ApiError::TransportFailure.to_string(), "transport failure");
    }

    #[test]
    fn upstream_message_is_the_raw_payload() {
        let payload = json!({"name": ["can't be blank"]});
        assert_eq!(ApiError::Upstream(payload.clone()).message(), payload);
    }

    #[test]
    fn plain_message_is_a_json_string() {
        assert_eq!(ApiError::EmptyResponse.message(), json!("empty response"));
    }
}
