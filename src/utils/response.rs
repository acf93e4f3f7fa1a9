use actix_web::HttpResponse;
use serde::Serialize;

/// Uniform body returned by every endpoint: `{ success, message, data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn empty(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(message, data))
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(message, data))
}

pub fn ok_empty(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::empty(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success("Clubs fetched", vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "Clubs fetched", "data": [1, 2] }));

        let body = serde_json::to_value(ApiResponse::empty("Club deleted")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "Club deleted", "data": null }));
    }
}
