//! 刷新令牌撤销表
//!
//! Entries are keyed by the refresh token's `jti` and remember the token's own
//! expiry, so they can be purged once the token could no longer be used anyway.

use dashmap::DashMap;
use shared::error::AppError;
use thiserror::Error;

use crate::store::{StorageError, Store};

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("revocation backend failed: {0}")]
    Backend(String),
}

impl From<StorageError> for RevocationError {
    fn from(err: StorageError) -> Self {
        RevocationError::Backend(err.to_string())
    }
}

impl From<RevocationError> for AppError {
    fn from(err: RevocationError) -> Self {
        tracing::error!(error = %err, "Revocation store failure");
        AppError::internal(err.to_string())
    }
}

/// Revocation backend shared across requests
pub trait RevocationStore: Send + Sync {
    fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError>;

    /// `expires_at`: unix seconds of the revoked token's own expiry.
    /// Returns `false` when the id was already revoked.
    fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, RevocationError>;

    /// Drop entries whose token has expired; returns how many were removed
    fn purge_expired(&self, now: i64) -> Result<usize, RevocationError>;
}

/// Process-local revocation set
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: DashMap<String, i64>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        Ok(self.entries.contains_key(jti))
    }

    fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, RevocationError> {
        Ok(self.entries.insert(jti.to_string(), expires_at).is_none())
    }

    fn purge_expired(&self, now: i64) -> Result<usize, RevocationError> {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(before - self.entries.len())
    }
}

/// Revocations persisted in the redb store; survives restarts
#[derive(Debug, Clone)]
pub struct RedbRevocationStore {
    store: Store,
}

impl RedbRevocationStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl RevocationStore for RedbRevocationStore {
    fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        Ok(self.store.is_revoked(jti)?)
    }

    fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, RevocationError> {
        Ok(self.store.revoke(jti, expires_at)?)
    }

    fn purge_expired(&self, now: i64) -> Result<usize, RevocationError> {
        Ok(self.store.purge_revocations(now)?)
    }
}
