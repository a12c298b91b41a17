use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body.
///
/// Only `name`, `message` and `resource` reach the client. The context is
/// logged and the status is used for the response line.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// The error name/type identifier
    pub name: &'static str,
    /// User-friendly error message safe for client display
    pub message: String,
    /// The resource that the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<&'static str>,

    /// Internal context for debugging, not exposed to the client
    #[serde(skip)]
    pub context: Option<String>,
    /// HTTP status code
    #[serde(skip)]
    pub status: StatusCode,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        tracing::warn!(
            status = %self.status,
            name = self.name,
            message = %self.message,
            resource = ?self.resource,
            context = ?self.context,
            "HTTP error response"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_and_status_stay_out_of_the_body() -> anyhow::Result<()> {
        let response = ErrorResponse {
            name: "not_found",
            message: "Blob not found".to_owned(),
            resource: Some("blob"),
            context: Some("photos/cat.png".to_owned()),
            status: StatusCode::NOT_FOUND,
        };

        let json = serde_json::to_value(&response)?;

        assert_eq!(json["name"], "not_found");
        assert_eq!(json["resource"], "blob");
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
        assert!(!json.to_string().contains("photos/cat.png"));
        Ok(())
    }

    #[test]
    fn missing_resource_is_omitted() -> anyhow::Result<()> {
        let response = ErrorResponse {
            name: "internal_server_error",
            message: "Internal server error.".to_owned(),
            resource: None,
            context: None,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };

        let json = serde_json::to_value(&response)?;
        assert!(json.get("resource").is_none());
        Ok(())
    }
}
