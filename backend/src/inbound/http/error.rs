//! Rendering of domain errors as HTTP responses.
//!
//! Status codes follow [`ErrorCode`]. Internal failures reach the client as
//! a bare "Internal server error" carrying only the trace id; the full
//! message is logged server-side.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

const fn http_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload a client is allowed to see.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

fn log_server_failure(error: &Error) {
    match error.code() {
        ErrorCode::InternalError => {
            error!(message = error.message(), trace_id = ?error.trace_id(), "internal error");
        }
        ErrorCode::ServiceUnavailable | ErrorCode::Timeout => {
            warn!(
                code = ?error.code(),
                message = error.message(),
                trace_id = ?error.trace_id(),
                "request failed upstream"
            );
        }
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        http_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_server_failure(self);
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        response.json(public_view(self))
    }
}

/// Extractor rejections (4xx) keep their message as `invalid_request`;
/// anything else is treated as internal.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            debug!(%status, error = %err, "request rejected before reaching the handler");
            return Self::invalid_request(err.to_string());
        }
        error!(%status, error = %err, "actix error promoted to domain error");
        Self::internal(REDACTED_MESSAGE)
    }
}
