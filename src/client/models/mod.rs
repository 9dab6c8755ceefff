//! Request and response models for the MOLA API

mod auth;

pub use auth::{
    ApiResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, TokenPayload, UserProfile,
};
