//! Client-related types shared between server and client
//!
//! Request/response types used by the auth endpoints.

use crate::models::{Role, Scope, deserialize_roles};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Console to sign into; defaults to the primary role's console
    #[serde(default)]
    pub scope: Option<Scope>,
}

/// Token pair response data (login / refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Access-only response data (scope switch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub additional_roles: BTreeSet<Role>,
    pub active_scope: Option<Scope>,
}

/// Refresh request; the token may come from the `refresh_token` cookie instead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
}

/// Revoke / logout request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevokeRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Scope switch request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchScopeRequest {
    pub scope: Scope,
}
