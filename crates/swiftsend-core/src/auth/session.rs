//! The owned session object.
//!
//! `Session` holds the access/refresh token pair, the authenticated user
//! profile, and the pending-verification record. It is constructed once,
//! hydrated from the persistent `TokenStore`, and injected into the layer
//! that issues network calls; there is no ambient global.

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use super::tokens::{
    StoredToken, TokenStore, ACCESS_TOKEN_TTL_MINUTES, REFRESH_TOKEN_TTL_DAYS,
};
use crate::models::{AuthUser, PendingVerification, TokenPair};

#[derive(Debug, Clone, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<AuthUser>,
    pending_verification: Option<PendingVerification>,
}

pub struct Session {
    store: TokenStore,
    state: Mutex<SessionState>,
}

impl Session {
    /// Hydrate a session from the persistent store. Expired entries are
    /// dropped on load, so an old access token never reaches the wire.
    pub fn new(store: TokenStore) -> Result<Self> {
        let (access, refresh) = store.load()?;
        let state = SessionState {
            access_token: access.map(|t| t.value),
            refresh_token: refresh.map(|t| t.value),
            user: None,
            pending_verification: None,
        };
        Ok(Self {
            store,
            state: Mutex::new(state),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.state().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().access_token.is_some()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state().user.clone()
    }

    pub fn set_user(&self, user: AuthUser) {
        self.state().user = Some(user);
    }

    pub fn pending_verification(&self) -> Option<PendingVerification> {
        self.state().pending_verification.clone()
    }

    pub fn set_pending_verification(&self, record: PendingVerification) {
        self.state().pending_verification = Some(record);
    }

    pub fn clear_pending_verification(&self) {
        self.state().pending_verification = None;
    }

    /// Install a full token pair, persisting and updating memory under one
    /// lock so concurrent readers never observe a half-written pair. Missing
    /// expiry timestamps fall back to the default TTLs.
    pub fn set_tokens(&self, pair: &TokenPair) -> Result<()> {
        let now = Utc::now();
        let access_expires = pair
            .access_token_expires_at
            .unwrap_or(now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES));
        let refresh_expires = pair
            .refresh_token_expires_at
            .unwrap_or(now + Duration::days(REFRESH_TOKEN_TTL_DAYS));

        let mut state = self.state();
        self.store.save_pair(
            StoredToken::new(pair.access_token.clone(), access_expires),
            StoredToken::new(pair.refresh_token.clone(), refresh_expires),
        )?;
        state.access_token = Some(pair.access_token.clone());
        state.refresh_token = Some(pair.refresh_token.clone());
        Ok(())
    }

    /// Replace only the access token after a refresh. The refresh token is
    /// left untouched in both storage and memory.
    pub fn set_access_token(
        &self,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let expires_at =
            expires_at.unwrap_or_else(|| Utc::now() + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES));
        let mut state = self.state();
        self.store
            .save_access(StoredToken::new(token.to_string(), expires_at))?;
        state.access_token = Some(token.to_string());
        Ok(())
    }

    /// Tear the session down: both tokens, the user profile, and the
    /// pending-verification record go together, in memory and on disk.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state();
        *state = SessionState::default();
        self.store.clear()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means another thread panicked mid-update;
        // the state itself is still a coherent snapshot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
