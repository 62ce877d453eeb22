use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{ success: true, message, data? }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status: StatusCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with a message and no data payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match self.data {
            None => None,
            Some(data) => match serde_json::to_value(&data) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return crate::error::ApiError::internal("Failed to format response")
                        .into_response();
                }
            },
        };

        let mut envelope = json!({
            "success": true,
            "message": self.message,
        });
        if let Some(value) = data_value {
            envelope["data"] = value;
        }

        (self.status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data() {
        let resp = ApiResponse::success("Board retrieved successfully", json!({"id": 1}));
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.data.is_some());
    }

    #[test]
    fn created_uses_201() {
        let resp = ApiResponse::created("Board created successfully", json!({}));
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    #[test]
    fn message_only_omits_data() {
        let resp = ApiResponse::message_only("Logout successful");
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.data.is_none());
    }
}
