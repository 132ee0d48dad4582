// src/common/response.rs

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Envelope used by every successful response: `{ success, message, data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Self::with_message(data, "OK")
    }

    pub fn with_message(data: T, message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
            data,
        })
    }

    pub fn created(data: T, message: &str) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::with_message(data, message))
    }
}
