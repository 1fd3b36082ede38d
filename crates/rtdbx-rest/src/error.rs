//! Transport errors of the REST client

use rtdbx_core::{RxError, RxErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("invalid database URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("database URL '{0}' cannot carry a path")]
    OpaqueUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<RestError> for RxError {
    fn from(err: RestError) -> Self {
        let kind = match &err {
            RestError::InvalidUrl { .. } | RestError::OpaqueUrl(_) => RxErrorKind::InvalidInput,
            RestError::Transport(_) | RestError::Status { .. } => RxErrorKind::ExternalService,
            RestError::Decode(_) => RxErrorKind::Serialization,
        };
        RxError::new(kind).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_external_service() {
        let err: RxError = RestError::Status {
            status: 401,
            message: "Permission denied".to_string(),
        }
        .into();

        assert_eq!(err.kind(), RxErrorKind::ExternalService);
        assert!(err.message().contains("Permission denied"));
    }

    #[test]
    fn test_bad_url_maps_to_invalid_input() {
        let err: RxError = RestError::OpaqueUrl("mailto:x@y".to_string()).into();
        assert_eq!(err.kind(), RxErrorKind::InvalidInput);
    }
}
