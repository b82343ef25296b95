//! Environment session entity.
//!
//! The single process-wide period of client activity. Timer handles are owned
//! by the application layer; this type only carries the data the invariants
//! are stated over.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

/// Largest accepted session time-to-live (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// The tracked environment session.
///
/// `created_at` is set iff `connection_count > 0`, and `connection_count`
/// always equals the number of distinct clients in `active_connections`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Distinct clients seen since the last reset
    pub connection_count: u32,

    /// First connection after a reset
    pub created_at: Option<DateTime<Utc>>,

    /// Recomputed on every connection event
    pub expires_at: Option<DateTime<Utc>>,

    /// Client identifiers (IP addresses) seen since the last reset
    pub active_connections: HashSet<String>,
}

impl Session {
    /// Check if a session exists.
    pub fn is_active(&self) -> bool {
        self.created_at.is_some()
    }

    /// Check if the client has connected since the last reset.
    pub fn has_client(&self, client_id: &str) -> bool {
        self.active_connections.contains(client_id)
    }

    /// Record a client connection, creating the session if needed.
    ///
    /// Returns `true` when the client was not already active.
    pub fn register(&mut self, client_id: &str, now: DateTime<Utc>) -> bool {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }

        let is_new = self.active_connections.insert(client_id.to_owned());
        if is_new {
            self.connection_count = self.connection_count.saturating_add(1);
        }
        is_new
    }

    /// Push the expiry out to `now + ttl` and return it.
    pub fn extend(&mut self, now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        let expires_at = now + ttl;
        self.expires_at = Some(expires_at);
        expires_at
    }

    /// Return every field to its empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
