//! Single-use, expiring credentials for sensitive account actions
//!
//! A token binds an opaque random id to a `(purpose, subject)` pair, e.g. a
//! password reset for one email address. Lookups are scoped by purpose so a
//! token issued for one flow can never be redeemed in another.
//!
//! ## Lifecycle
//!
//! ```text
//! create_token ─► get_token (any number of times, until expiry) ─► pop_token
//! ```
//!
//! Expired entries are purged lazily: when they are looked up, and all at
//! once whenever a new token is issued. Tokens live in memory only and are
//! lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};
use uuid::Uuid;

/// Purpose of password-reset tokens
pub const PASSWORD_RESET: &str = "pwreset";

/// Lifetime of password-reset tokens (the reset email promises 60 minutes)
pub const PASSWORD_RESET_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct TokenEntry {
    purpose: String,
    subject: String,
    expires_at: DateTime<Utc>,
}

impl TokenEntry {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory token registry
///
/// All access goes through one mutex; contention is low and no operation
/// holds it across an await point.
#[derive(Debug, Default)]
pub struct AuthTokenService {
    tokens: Mutex<HashMap<String, TokenEntry>>,
}

impl AuthTokenService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token valid for `lifetime` from now
    pub fn create_token(&self, purpose: &str, subject: &str, lifetime: Duration) -> String {
        self.create_token_at(purpose, subject, lifetime, Utc::now())
    }

    /// Return the subject of a live token issued for `purpose`
    pub fn get_token(&self, purpose: &str, token: &str) -> Option<String> {
        self.get_token_at(purpose, token, Utc::now())
    }

    /// Remove a token; removing an unknown or already removed token is a no-op
    pub fn pop_token(&self, purpose: &str, token: &str) {
        let mut tokens = self.lock();
        if tokens.get(token).is_some_and(|entry| entry.purpose == purpose) {
            tokens.remove(token);
            debug!("consumed {purpose} token");
        }
    }

    /// [`create_token`](Self::create_token) with an explicit clock
    pub fn create_token_at(
        &self,
        purpose: &str,
        subject: &str,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let expires_at = TimeDelta::from_std(lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut tokens = self.lock();
        let purged = sweep_expired(&mut tokens, now);
        if purged > 0 {
            trace!("purged {purged} expired tokens");
        }

        tokens.insert(
            id.clone(),
            TokenEntry {
                purpose: purpose.to_string(),
                subject: subject.to_string(),
                expires_at,
            },
        );

        debug!("issued {purpose} token expiring at {expires_at}");
        id
    }

    /// [`get_token`](Self::get_token) with an explicit clock
    pub fn get_token_at(&self, purpose: &str, token: &str, now: DateTime<Utc>) -> Option<String> {
        let mut tokens = self.lock();
        let entry = tokens.get(token)?;

        if entry.purpose != purpose {
            return None;
        }

        if !entry.is_valid_at(now) {
            trace!("dropping expired {purpose} token");
            tokens.remove(token);
            return None;
        }

        Some(entry.subject.clone())
    }

    /// Drop every token that expired before `now`, returning how many went
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        sweep_expired(&mut self.lock(), now)
    }

    /// Number of stored tokens, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, TokenEntry>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sweep_expired(tokens: &mut HashMap<String, TokenEntry>, now: DateTime<Utc>) -> usize {
    let before = tokens.len();
    tokens.retain(|_, entry| entry.is_valid_at(now));
    before - tokens.len()
}
