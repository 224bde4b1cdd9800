use serde::{Deserialize, Serialize};

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Public part of a freshly registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Response for the register endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUserView,
}

/// Session issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
