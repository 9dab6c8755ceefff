//! Authentication API trait

use async_trait::async_trait;
use serde_json::Value;

use crate::client::models::{
    ApiResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, TokenPayload, UserProfile,
};
use crate::client::MolaClient;
use crate::error::{ApiError, Result};

/// Authentication operations.
///
/// Sign-in calls only return the raw token; storing it is the session
/// context's job.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email and password for a session token
    async fn login(&self, credentials: &LoginRequest) -> Result<String>;

    /// Exchange an identity-provider ID token for a session token
    async fn google_login(&self, id_token: &str) -> Result<String>;

    /// Create an account; the user signs in afterwards
    async fn register(&self, request: &RegisterRequest) -> Result<Option<String>>;

    /// Ask the backend to email a reset token
    async fn forgot_password(&self, email: &str) -> Result<Option<String>>;

    /// Set a new password using an emailed reset token
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<Option<String>>;

    /// Profile of the signed-in user
    async fn profile(&self) -> Result<UserProfile>;
}

fn token_from(response: ApiResponse<TokenPayload>) -> Result<String> {
    response
        .data
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::MissingToken.into())
}

#[async_trait]
impl AuthApi for MolaClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<String> {
        let response: ApiResponse<TokenPayload> = self.post("/login", credentials, false).await?;
        token_from(response)
    }

    async fn google_login(&self, id_token: &str) -> Result<String> {
        let request = GoogleLoginRequest {
            id_token: id_token.to_string(),
        };
        let response: ApiResponse<TokenPayload> =
            self.post("/login/google", &request, false).await?;
        token_from(response)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<String>> {
        let response: ApiResponse<Value> = self.post("/register", request, false).await?;
        Ok(response.message)
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        let response: ApiResponse<Value> =
            self.post("/forgot-password", &request, false).await?;
        Ok(response.message)
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<Option<String>> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        let response: ApiResponse<Value> = self.post("/reset-password", &request, false).await?;
        Ok(response.message)
    }

    async fn profile(&self) -> Result<UserProfile> {
        #[derive(serde::Deserialize)]
        struct ProfileData {
            user: UserProfile,
        }

        let response: ApiResponse<ProfileData> = self.get("/users/profile", true).await?;
        Ok(response.data.user)
    }
}
