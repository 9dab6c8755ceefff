//! MOLA storefront session and API access layer
//!
//! - [`token`] decodes and validates session tokens
//! - [`storage`] persists the token and role and announces changes
//! - [`session`] derives the authentication state and owns all writes
//! - [`client`] dispatches requests against the backend API

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod storage;
pub mod token;

pub use client::{AuthApi, MolaClient};
pub use error::{Error, Result};
pub use session::{AuthState, Navigator, SessionContext};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use token::{Claims, Role};
