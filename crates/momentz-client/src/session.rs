//! The single owner of the logged-in session.
//!
//! Readers get `Arc<Session>` snapshots; only [`SessionManager::establish`],
//! the expiry calls and [`SessionManager::logout`] ever change what is
//! current, and they replace it wholesale. Each login yields a new `Arc`, so
//! pointer identity tells one session apart from the next even when the
//! token text repeats.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use momentz_shared::UserId;
use momentz_store::{Database, StoreError, StoredSession};

/// Credential bundle for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
}

/// Which top-level view the client should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Login / register screen.
    Entry,
    /// Authenticated feed.
    Home,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    current: RwLock<Option<Arc<Session>>>,
    store: Option<Arc<Mutex<Database>>>,
    route: watch::Sender<Route>,
}

impl SessionManager {
    /// A manager that persists the session triple through `store`.
    pub fn new(store: Option<Arc<Mutex<Database>>>) -> Self {
        let (route, _) = watch::channel(Route::Entry);
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(None),
                store,
                route,
            }),
        }
    }

    /// A manager with no persistence (tests, one-shot commands).
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Load a persisted session, if a complete and well-formed one exists.
    pub fn restore(&self) -> Result<Option<Arc<Session>>, StoreError> {
        let Some(store) = &self.inner.store else {
            return Ok(None);
        };

        let stored = {
            let db = store.lock().unwrap_or_else(PoisonError::into_inner);
            db.load_session()?
        };
        let Some(stored) = stored else {
            return Ok(None);
        };

        let user_id = match stored.user_id.parse::<UserId>() {
            Ok(id) => id,
            Err(_) => {
                warn!(value = %stored.user_id, "Stored user id is not numeric, ignoring session");
                return Ok(None);
            }
        };

        let session = Arc::new(Session {
            token: stored.token,
            user_id,
            username: stored.username,
        });
        self.replace(Some(session.clone()));
        self.inner.route.send_replace(Route::Home);

        info!(username = %session.username, "Session restored");
        Ok(Some(session))
    }

    /// Make `session` current, persist it and move to the home view.
    pub fn establish(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);

        if let Some(store) = &self.inner.store {
            let mut db = store.lock().unwrap_or_else(PoisonError::into_inner);
            let stored = StoredSession {
                token: session.token.clone(),
                user_id: session.user_id.to_string(),
                username: session.username.clone(),
            };
            if let Err(e) = db.save_session(&stored) {
                warn!(error = %e, "Failed to persist session");
            }
        }

        self.replace(Some(session.clone()));
        self.inner.route.send_replace(Route::Home);

        info!(username = %session.username, user = %session.user_id, "Session established");
        session
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token.clone())
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Authentication expired: destroy everything and go to the entry view.
    ///
    /// Safe to call more than once.
    pub fn expire(&self) {
        let had_session = self.destroy();
        if had_session {
            warn!("Session expired, returning to entry view");
        }
    }

    /// Expire `issuer` only if it is still the current session.
    ///
    /// A 401 answering a request sent with an older token must not log out
    /// whoever is signed in now. Returns whether `issuer` was destroyed.
    pub fn expire_if(&self, issuer: &Arc<Session>) -> bool {
        let was_current = {
            let mut guard = self
                .inner
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                Some(current) if Arc::ptr_eq(current, issuer) => {
                    *guard = None;
                    true
                }
                _ => false,
            }
        };

        if !was_current {
            debug!(username = %issuer.username, "Expiry for a session that is no longer current, ignoring");
            return false;
        }

        self.forget();
        warn!(username = %issuer.username, "Session expired, returning to entry view");
        true
    }

    /// Explicit, confirmed logout.
    pub fn logout(&self) {
        if self.destroy() {
            info!("Logged out");
        }
    }

    pub(crate) fn route(&self) -> Route {
        *self.inner.route.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.inner.route.subscribe()
    }

    fn destroy(&self) -> bool {
        let previous = self.replace(None);
        self.forget();
        previous.is_some()
    }

    /// Clear the persisted triple and route to the entry view.
    fn forget(&self) {
        if let Some(store) = &self.inner.store {
            let mut db = store.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = db.clear_session() {
                warn!(error = %e, "Failed to clear persisted session");
            }
        }

        self.inner.route.send_replace(Route::Entry);
    }

    fn replace(&self, next: Option<Arc<Session>>) -> Option<Arc<Session>> {
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active", &self.is_active())
            .field("route", &self.route())
            .finish()
    }
}
