//! Converts a panic inside request handling into a 500 envelope.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::AppError;

/// Response for a caught panic. Carries the panic text only when
/// `expose_details` is set.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %message, "request handler panicked");

    AppError::Internal {
        details: expose_details.then_some(message),
    }
    .into_response()
}
