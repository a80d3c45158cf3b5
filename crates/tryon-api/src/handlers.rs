//! Request handlers.

pub mod health;
pub mod overlay;
pub mod tryon;

pub use health::*;
pub use overlay::*;
pub use tryon::*;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// Parse a JSON body, treating an empty body as `{}`.
///
/// Handlers take raw bytes so that a missing body or content type is
/// reported as a missing field rather than a 415.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid request body"))
}
