//! Handler failure type and its status family.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// A failed handler outcome.
///
/// The `kind` picks the status line and the default wording. The message
/// and resource are shown to the client, the context only reaches the logs.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless returned"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    resource: Option<&'static str>,
    context: Option<String>,
}

impl Error {
    /// Creates an error of `kind` with the default wording.
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }

    /// Replaces the client-facing message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the kind of resource the failure concerns, such as `blob`.
    pub fn with_resource(mut self, resource: &'static str) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Adds detail for the logs. Repeated calls are joined with `; `.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(earlier) => format!("{earlier}; {context}"),
            None => context,
        });
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Client-facing message, falling back to the default of the kind.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(self.kind.summary())
    }

    pub fn resource(&self) -> Option<&'static str> {
        self.resource
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.kind.status_code().as_u16(),
            self.kind,
            self.message()
        )?;
        match &self.context {
            Some(context) => write!(f, " ({context})"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.message().to_owned();
        ErrorResponse {
            name: self.kind.name(),
            message,
            resource: self.resource,
            context: self.context,
            status: self.kind.status_code(),
        }
        .into_response()
    }
}

/// Result of a fallible handler.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Status families the viewer answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, the submitted settings or query could not be used.
    BadRequest,
    /// 404, unknown route, session or blob.
    NotFound,
    /// 408, the request outlived its time budget.
    RequestTimeout,
    /// 500
    InternalServerError,
    /// 502, storage answered with a failure.
    BadGateway,
    /// 504, storage did not answer in time.
    GatewayTimeout,
}

impl ErrorKind {
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Stable snake_case identifier put in the `name` field of error bodies.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::RequestTimeout => "request_timeout",
            Self::InternalServerError => "internal_server_error",
            Self::BadGateway => "bad_gateway",
            Self::GatewayTimeout => "gateway_timeout",
        }
    }

    /// Wording used when no message was attached.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request data.",
            Self::NotFound => "Resource not found.",
            Self::RequestTimeout => "Request timed out.",
            Self::InternalServerError => "Internal server error.",
            Self::BadGateway => "Storage service error.",
            Self::GatewayTimeout => "Storage service timed out.",
        }
    }

    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }

    pub fn with_resource(self, resource: &'static str) -> Error {
        Error::new(self).with_resource(resource)
    }

    pub fn with_context(self, context: impl Into<String>) -> Error {
        Error::new(self).with_context(context)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}
