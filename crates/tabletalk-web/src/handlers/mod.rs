//! HTTP handlers and the shared JSON envelope.

pub mod health;
pub mod insights;
pub mod interactions;
pub mod preferences;
pub mod recommendations;

use serde::Serialize;

/// `{ success: true, data, meta?, message? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T, M = ()> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, meta: None, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data, meta: None, message: Some(message.into()) }
    }
}

impl<T, M> ApiResponse<T, M> {
    pub fn with_meta(data: T, meta: M) -> Self {
        Self { success: true, data, meta: Some(meta), message: None }
    }
}
