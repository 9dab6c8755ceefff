//! MOLA API client
//!
//! [`MolaClient`] is the request dispatcher every screen goes through. The
//! typed endpoint traits in [`api`] sit on top of it.

pub mod api;
pub mod models;
pub mod mola;

pub use api::AuthApi;
pub use mola::{DEFAULT_API_BASE_URL, MolaClient};
