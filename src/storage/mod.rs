//! Persistence slots for the session token and role
//!
//! The storefront keeps two string values between runs: the raw session
//! token and the role it was issued for. Backends implement
//! [`SessionStorage`]; every mutation is broadcast as a [`StorageEvent`] to
//! all handles sharing the backend, which is how a second session context
//! (another tab, another task) learns that the first one signed out.

use tokio::sync::broadcast;

use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key holding the raw session token
pub const TOKEN_KEY: &str = "token";

/// Key holding the role string
pub const ROLE_KEY: &str = "role";

/// Capacity of the change-notification channel. Slow subscribers that fall
/// further behind than this see a lag and resync once.
const EVENT_CAPACITY: usize = 64;

/// Notification that a key changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that was set or removed
    pub key: String,
}

impl StorageEvent {
    /// Whether this change can affect the authentication state.
    pub fn touches_session(&self) -> bool {
        self.key == TOKEN_KEY || self.key == ROLE_KEY
    }
}

/// Synchronous key/value persistence with change notifications
pub trait SessionStorage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value and notify subscribers
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value and notify subscribers. Removing a missing key is not
    /// an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Subscribe to change notifications
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

pub(crate) fn event_channel() -> broadcast::Sender<StorageEvent> {
    let (tx, _) = broadcast::channel(EVENT_CAPACITY);
    tx
}

pub(crate) fn notify(tx: &broadcast::Sender<StorageEvent>, key: &str) {
    // No receivers is fine; nobody is listening yet
    let _ = tx.send(StorageEvent {
        key: key.to_string(),
    });
}
