//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - sign-in, registration and account recovery

mod auth;

pub use auth::AuthApi;
