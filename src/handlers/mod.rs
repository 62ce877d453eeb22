// Two access tiers, matching the route table: public endpoints acquire
// tokens, everything under the protected tier sits behind the auth
// middleware.
pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

/// Normalize body-extraction failures into the standard envelope.
pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}
