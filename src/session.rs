//! Session state holder
//!
//! [`SessionContext`] derives the authentication state from the persisted
//! token and role, publishes it through a `watch` channel for views, and is
//! the only component that writes the persistence slots. Construct one per
//! application run and hand it to whatever needs it.

use std::fmt;
use std::sync::{Arc, Weak};

use log::{debug, warn};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::{Result, TokenError};
use crate::storage::{ROLE_KEY, SessionStorage, TOKEN_KEY};
use crate::token::{self, Claims, Role};

/// Route the user is sent to after signing out
pub const LOGIN_ROUTE: &str = "/loginpage";

/// Derived authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Role),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::Authenticated(role) => Some(*role),
            AuthState::Unauthenticated => None,
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Unauthenticated => f.write_str("unauthenticated"),
            AuthState::Authenticated(role) => write!(f, "authenticated({role})"),
        }
    }
}

/// The signed-in user as views see it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub role: Role,
}

/// Routing collaborator used for the sign-out redirect
pub trait Navigator {
    fn navigate(&self, route: &str);
}

/// Explicitly constructed session context
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<AuthState>,
}

impl SessionContext {
    /// Create a context and compute the initial state from storage.
    ///
    /// A malformed or expired token found here is removed from storage.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        let session = Self { storage, state };
        session.sync()?;
        Ok(session)
    }

    /// Storage handle this context reads from
    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        Arc::clone(&self.storage)
    }

    /// Current authentication state
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<SessionUser> {
        self.state().role().map(|role| SessionUser { role })
    }

    /// Claims of the stored token, if it is currently valid. Read-only.
    pub fn claims(&self) -> Result<Option<Claims>> {
        let token = self.storage.get(TOKEN_KEY)?;
        Ok(token.and_then(|t| token::decode(&t).ok()))
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Force the published state, e.g. right after a login response and
    /// before the next resync.
    pub fn set_state(&self, next: AuthState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!("Session state {} -> {}", prev, next);
        }
    }

    /// Re-read storage and recompute the state.
    pub fn sync(&self) -> Result<AuthState> {
        let next = self.evaluate()?;
        self.set_state(next);
        Ok(next)
    }

    fn evaluate(&self) -> Result<AuthState> {
        let Some(raw) = self.storage.get(TOKEN_KEY)? else {
            return Ok(AuthState::Unauthenticated);
        };

        // Placeholders fail the segment check and are purged like any other
        // malformed value
        if let Err(err) = token::decode(&raw) {
            warn!("Discarding stored session token: {}", err);
            self.purge()?;
            return Ok(AuthState::Unauthenticated);
        }

        let role = self.storage.get(ROLE_KEY)?;
        Ok(match role.as_deref().and_then(Role::parse) {
            Some(role) => AuthState::Authenticated(role),
            None => AuthState::Unauthenticated,
        })
    }

    fn purge(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(ROLE_KEY)?;
        Ok(())
    }

    /// Store a token issued by the backend and mark the session
    /// authenticated.
    ///
    /// This is the single entry point for every sign-in path (password,
    /// registration confirmation, identity provider). Storage is left
    /// untouched when the token is rejected.
    pub fn establish(&self, raw: &str) -> Result<Claims> {
        let claims = token::decode(raw)?;
        let role = claims
            .recognized_role()
            .ok_or_else(|| TokenError::UnrecognizedRole(claims.role.clone()))?;

        self.storage.set(TOKEN_KEY, raw)?;
        self.storage.set(ROLE_KEY, role.as_str())?;
        self.set_state(AuthState::Authenticated(role));

        Ok(claims)
    }

    /// Sign out: clear storage, recompute, then send the user to the login
    /// route. Safe to call repeatedly.
    pub fn logout(&self, navigator: &dyn Navigator) -> Result<()> {
        self.purge()?;
        self.sync()?;
        navigator.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// Clear storage and state without navigating.
    pub fn reset(&self) -> Result<()> {
        self.purge()?;
        self.set_state(AuthState::Unauthenticated);
        Ok(())
    }

    /// Resync whenever another handle on the same storage changes the token
    /// or role.
    ///
    /// The task holds a weak reference and ends once the context is dropped
    /// (observed on the next notification) or the storage channel closes.
    pub fn spawn_resync(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.storage.subscribe();
        let session: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if !event.touches_session() => continue,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Missed {} storage notifications, resyncing", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                let Some(session) = session.upgrade() else {
                    break;
                };
                if let Err(err) = session.sync() {
                    warn!("Session resync failed: {}", err);
                }
            }
        })
    }
}
