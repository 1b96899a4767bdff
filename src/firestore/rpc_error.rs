use reqwest::StatusCode;
use serde::Deserialize;

use crate::firestore::error::{
    deadline_exceeded, internal_error, invalid_argument, not_found, permission_denied,
    resource_exhausted, unauthenticated, unavailable, FirestoreError,
};

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Maps a failed REST response to a typed error. The canonical `error.status` string in the
/// body wins over the HTTP status when both are present.
pub fn map_http_error(status: StatusCode, body: &str) -> FirestoreError {
    classify(status, body).with_http_status(status.as_u16())
}

fn classify(status: StatusCode, body: &str) -> FirestoreError {
    let payload = extract_error_payload(body);
    let message = payload
        .as_ref()
        .and_then(|payload| payload.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("HTTP error").to_string());

    if let Some(canonical) = payload.as_ref().and_then(|payload| payload.status.as_deref()) {
        if let Some(err) = map_canonical_status(canonical, &message) {
            return err;
        }
    }

    match status {
        StatusCode::UNAUTHORIZED => unauthenticated(message),
        StatusCode::FORBIDDEN => permission_denied(message),
        StatusCode::NOT_FOUND => not_found(message),
        StatusCode::TOO_MANY_REQUESTS => resource_exhausted(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => unavailable(message),
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => deadline_exceeded(message),
        StatusCode::OK => internal_error("Received HTTP 200 while handling error"),
        status if status.is_client_error() => invalid_argument(message),
        _ => internal_error(message),
    }
}

fn map_canonical_status(status: &str, message: &str) -> Option<FirestoreError> {
    let message = message.to_string();
    let err = match status {
        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" | "ALREADY_EXISTS" => {
            invalid_argument(message)
        }
        "UNAUTHENTICATED" => unauthenticated(message),
        "PERMISSION_DENIED" => permission_denied(message),
        "NOT_FOUND" => not_found(message),
        "RESOURCE_EXHAUSTED" => resource_exhausted(message),
        "UNAVAILABLE" => unavailable(message),
        "DEADLINE_EXCEEDED" => deadline_exceeded(message),
        "CANCELLED" | "DATA_LOSS" | "UNKNOWN" | "INTERNAL" => internal_error(message),
        _ => return None,
    };
    Some(err)
}

fn extract_error_payload(body: &str) -> Option<GoogleError> {
    serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::error::FirestoreErrorCode;

    #[test]
    fn payload_status_overrides_http_status() {
        let body = r#"{"error":{"code":400,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code, FirestoreErrorCode::PermissionDenied);
        assert_eq!(err.message(), "Missing or insufficient permissions.");
        assert_eq!(err.http_status(), Some(400));
    }

    #[test]
    fn falls_back_to_http_status_without_payload() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.code, FirestoreErrorCode::Unavailable);
        assert_eq!(err.message(), "Service Unavailable");

        let err = map_http_error(StatusCode::CONFLICT, "not json");
        assert_eq!(err.code, FirestoreErrorCode::InvalidArgument);
    }
}
