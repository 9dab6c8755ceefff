//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod auth;
pub mod context;
pub mod init;
pub mod request;
pub mod status;

pub use args::OutputFormat;
pub use context::CommandContext;

/// MOLA CLI - session and API companion for the MOLA storefront
#[derive(Parser, Debug)]
#[command(name = "mola")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "MOLA_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "MOLA_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override session file location
    #[arg(long, global = true, env = "MOLA_SESSION", hide_env = true)]
    pub session: Option<String>,

    /// Override the backend API base URL
    #[arg(long, global = true, env = "MOLA_API_BASE_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "MOLA_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize MOLA configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long, short = 'e')]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "MOLA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in with a Google ID token obtained from the identity provider
    LoginGoogle {
        /// ID token returned by the provider's sign-in flow
        #[arg(long)]
        id_token: String,
    },

    /// Create a new account
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(long, short = 'e')]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long, env = "MOLA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Request a password reset token by email
    ForgotPassword {
        /// Account email
        #[arg(long, short = 'e')]
        email: String,
    },

    /// Set a new password with an emailed reset token
    ResetPassword {
        /// Reset token from the email
        #[arg(long)]
        token: String,

        /// New password (prompted when omitted)
        #[arg(long, env = "MOLA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the signed-in user's profile
    Profile,

    /// Sign out and clear the stored session
    Logout,

    /// Send a GET request to the API
    Get {
        /// Path relative to the API base URL, e.g. /products
        path: String,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Send a POST request to the API
    Post {
        /// Path relative to the API base URL
        path: String,

        #[command(flatten)]
        body: BodyArgs,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Send a PUT request to the API
    Put {
        /// Path relative to the API base URL
        path: String,

        #[command(flatten)]
        body: BodyArgs,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Send a DELETE request to the API
    Delete {
        /// Path relative to the API base URL
        path: String,

        #[command(flatten)]
        auth: AuthArgs,
    },
}

/// Authentication flag shared by the raw request commands
#[derive(Debug, Clone, clap::Args, Default)]
pub struct AuthArgs {
    /// Do not attach the stored session token
    #[arg(long)]
    pub no_auth: bool,
}

impl AuthArgs {
    pub fn with_auth(&self) -> bool {
        !self.no_auth
    }
}

/// Request body for POST/PUT
#[derive(Debug, Clone, clap::Args, Default)]
pub struct BodyArgs {
    /// JSON body (use @file to read from a file)
    #[arg(long, short = 'd', conflicts_with_all = ["field", "file"])]
    pub data: Option<String>,

    /// Multipart text field as name=value (repeatable)
    #[arg(long = "field", short = 'F')]
    pub field: Vec<String>,

    /// Multipart file field as name=path (repeatable)
    #[arg(long = "file")]
    pub file: Vec<String>,
}

impl BodyArgs {
    pub fn is_multipart(&self) -> bool {
        !self.field.is_empty() || !self.file.is_empty()
    }
}
