//! Authentication models

use serde::{Deserialize, Serialize};

/// Envelope the backend wraps every response in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable status message
    #[serde(default)]
    pub message: Option<String>,

    /// Response payload
    pub data: T,
}

/// `data` of a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub token: Option<String>,
}

/// Email/password credentials
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity-provider credential exchanged for a session token
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// New account details
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Profile of the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub profile_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
}
