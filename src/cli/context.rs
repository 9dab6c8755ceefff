//! Command execution context
//!
//! Builds the session context once per invocation and hands out the
//! dispatcher, so that command handlers receive both by injection instead of
//! reaching for storage themselves.

use std::sync::Arc;

use colored::Colorize;
use tokio::task::JoinHandle;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::MolaClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::{Navigator, SessionContext};
use crate::storage::{FileStorage, SessionStorage};

/// Context for command execution containing config, session, and runtime
/// options. The dispatcher is built on demand by [`CommandContext::client`].
pub struct CommandContext {
    /// Loaded configuration (defaults when no file exists)
    pub config: Config,
    /// Session state holder over the session file
    pub session: Arc<SessionContext>,
    /// Resolved output format
    pub format: OutputFormat,
    /// Session file backing this context
    pub storage: FileStorage,
    api_url: Option<String>,
    resync: JoinHandle<()>,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// Constructing the session runs the initial sync, so an expired or
    /// malformed stored token is discarded before any command runs. The
    /// session then follows storage notifications until the context is
    /// dropped. The base URL is not checked here, so session-only commands
    /// keep working over a bad one. Must be called inside a tokio runtime.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_or_default(opts.config_ref())?;
        let format = opts.resolve_format(&config);

        let storage = FileStorage::new(FileStorage::resolve_path(opts.session_ref(&config))?);
        let session = Arc::new(SessionContext::new(Arc::new(storage.clone()))?);
        let resync = session.spawn_resync();

        Ok(Self {
            config,
            session,
            format,
            storage,
            api_url: opts.api_url_ref().map(str::to_string),
            resync,
        })
    }

    /// Base URL this invocation resolves to, before validation.
    pub fn configured_base_url(&self) -> &str {
        self.config.configured_base_url(self.api_url.as_deref())
    }

    /// Request dispatcher reading the same session file.
    ///
    /// Fails when the resolved base URL is not an http(s) URL.
    pub fn client(&self) -> Result<MolaClient> {
        let base_url = self.config.api_base_url(self.api_url.as_deref())?;
        let shared: Arc<dyn SessionStorage> = Arc::new(self.storage.clone());
        MolaClient::with_base_url(shared, &base_url)
    }
}

impl Drop for CommandContext {
    fn drop(&mut self) {
        self.resync.abort();
    }
}

/// Navigator for a terminal: there is no page to change, so the redirect is
/// reported to the user instead.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        eprintln!("{} {}", "→".dimmed(), route.dimmed());
    }
}
