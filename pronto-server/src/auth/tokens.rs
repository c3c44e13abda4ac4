//! 令牌生命周期
//!
//! login → (access, refresh)；refresh 轮换两枚令牌并撤销旧的刷新令牌；
//! logout / revoke 把刷新令牌写入撤销表。所有失败都拒绝，不降级。

use std::sync::Arc;

use shared::client::{AccessTokenResponse, TokenResponse, UserInfo};
use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, EmployeeCreate, Scope};
use thiserror::Error;

use super::jwt::{CurrentUser, JwtError, JwtService, RefreshClaims};
use super::password;
use super::policy::can_assume_scope;
use super::revocation::{RevocationError, RevocationStore};
use crate::security_log;
use crate::store::{StorageError, StorageResult, Store};

/// Identity lookups needed by the token lifecycle
pub trait EmployeeDirectory: Send + Sync {
    fn get_employee(&self, employee_id: u64) -> StorageResult<Option<Employee>>;

    fn find_by_email(&self, email: &str) -> StorageResult<Option<Employee>>;
}

impl EmployeeDirectory for Store {
    fn get_employee(&self, employee_id: u64) -> StorageResult<Option<Employee>> {
        self.get::<Employee>(employee_id)
    }

    fn find_by_email(&self, email: &str) -> StorageResult<Option<Employee>> {
        self.employee_by_email(email)
    }
}

/// Register a staff member with an argon2-hashed password
pub fn register_employee(store: &Store, req: EmployeeCreate) -> Result<Employee, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::required_field("email"));
    }
    if req.password.is_empty() {
        return Err(AppError::required_field("password"));
    }
    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    // 查重与写入同一事务，并发注册只会有一个成功
    let txn = store.begin_write()?;
    if store.email_taken_txn(&txn, &email)? {
        return Err(AppError::conflict(format!("employee {} already exists", email)));
    }
    let employee = Employee {
        id: store.next_id::<Employee>(&txn)?,
        email,
        display_name: req.display_name,
        password_hash,
        primary_role: req.primary_role,
        additional_roles: req.additional_roles,
        is_active: true,
    };
    store.put_employee(&txn, &employee)?;
    store.commit(txn)?;

    tracing::info!(employee_id = employee.id, role = %employee.primary_role, "Employee registered");
    Ok(employee)
}

/// Token lifecycle errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("employee is inactive or no longer exists")]
    IdentityInactive,

    #[error("scope '{0}' is not available to this employee")]
    ScopeNotAssumable(Scope),

    #[error("refresh_token is required")]
    RefreshTokenMissing,

    #[error("refresh token has been revoked")]
    Revoked,

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Revocation(#[from] RevocationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("password verification failed: {0}")]
    Password(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::invalid_credentials(),
            AuthError::IdentityInactive => AppError::new(ErrorCode::IdentityInactive),
            AuthError::ScopeNotAssumable(scope) => {
                AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("scope '{}' is not available to this employee", scope),
                )
                .with_detail("scope", scope.as_str())
            }
            AuthError::RefreshTokenMissing => AppError::required_field("refresh_token"),
            AuthError::Revoked => AppError::token_revoked(),
            AuthError::Jwt(JwtError::ExpiredToken) => AppError::token_expired(),
            AuthError::Jwt(e) => AppError::invalid_token(e.to_string()),
            AuthError::Revocation(e) => e.into(),
            AuthError::Storage(e) => e.into(),
            AuthError::Password(msg) => AppError::internal(msg),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_claims: RefreshClaims,
    pub employee: Employee,
    pub active_scope: Option<Scope>,
    pub expires_in: i64,
}

impl IssuedTokens {
    pub fn user_info(&self) -> UserInfo {
        user_info(&self.employee, self.active_scope)
    }

    pub fn to_response(&self) -> TokenResponse {
        TokenResponse {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: self.expires_in,
            user: self.user_info(),
        }
    }
}

fn user_info(employee: &Employee, active_scope: Option<Scope>) -> UserInfo {
    UserInfo {
        id: employee.id,
        display_name: employee.display_name.clone(),
        email: employee.email.clone(),
        role: employee.primary_role,
        additional_roles: employee.additional_roles.clone(),
        active_scope,
    }
}

/// Issues, rotates and revokes tokens
#[derive(Clone)]
pub struct TokenService {
    jwt: Arc<JwtService>,
    revocations: Arc<dyn RevocationStore>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        jwt: Arc<JwtService>,
        revocations: Arc<dyn RevocationStore>,
        directory: Arc<dyn EmployeeDirectory>,
    ) -> Self {
        Self {
            jwt,
            revocations,
            directory,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn revocations(&self) -> &dyn RevocationStore {
        self.revocations.as_ref()
    }

    /// Requested scope, or the primary role's console when absent
    fn resolve_scope(employee: &Employee, requested: Option<Scope>) -> AuthResult<Scope> {
        let scope = requested.unwrap_or_else(|| employee.primary_role.default_scope());
        if !can_assume_scope(employee, scope) {
            security_log!(
                "WARN",
                "scope_not_assumable",
                employee_id = employee.id,
                scope = scope.as_str()
            );
            return Err(AuthError::ScopeNotAssumable(scope));
        }
        Ok(scope)
    }

    fn issue_pair(&self, employee: Employee, scope: Scope) -> AuthResult<IssuedTokens> {
        let access_token = self.jwt.issue_access(&employee, Some(scope))?;
        let (refresh_token, refresh_claims) = self.jwt.issue_refresh(employee.id)?;
        Ok(IssuedTokens {
            access_token,
            refresh_token,
            refresh_claims,
            employee,
            active_scope: Some(scope),
            expires_in: self.jwt.access_ttl_secs(),
        })
    }

    /// Email + password login
    pub fn login(
        &self,
        email: &str,
        password: &str,
        scope: Option<Scope>,
    ) -> AuthResult<IssuedTokens> {
        let Some(employee) = self.directory.find_by_email(email.trim())? else {
            security_log!("WARN", "login_failed", reason = "unknown_email");
            return Err(AuthError::InvalidCredentials);
        };
        let valid = password::verify_password(password, &employee.password_hash)
            .map_err(|e| AuthError::Password(e.to_string()))?;
        if !valid {
            security_log!("WARN", "login_failed", employee_id = employee.id, reason = "bad_password");
            return Err(AuthError::InvalidCredentials);
        }
        if !employee.is_active {
            return Err(AuthError::IdentityInactive);
        }

        let scope = Self::resolve_scope(&employee, scope)?;
        let issued = self.issue_pair(employee, scope)?;
        tracing::info!(
            employee_id = issued.employee.id,
            scope = %scope,
            "Employee logged in"
        );
        Ok(issued)
    }

    /// Rotate a refresh token into a new pair
    ///
    /// The new access token is built from the employee's current state, so
    /// role and activity changes apply on the next refresh.
    pub fn refresh(&self, refresh_token: &str, scope: Option<Scope>) -> AuthResult<IssuedTokens> {
        let claims = self.jwt.validate_refresh(refresh_token).inspect_err(|e| {
            security_log!("WARN", "refresh_rejected", error = e.to_string());
        })?;
        if self.revocations.is_revoked(&claims.jti)? {
            security_log!("WARN", "revoked_token_reuse", jti = claims.jti.clone());
            return Err(AuthError::Revoked);
        }

        let employee = self
            .directory
            .get_employee(claims.employee_id()?)?
            .filter(|e| e.is_active)
            .ok_or(AuthError::IdentityInactive)?;
        let scope = Self::resolve_scope(&employee, scope)?;

        // 并发刷新同一令牌时只有一个能撤销成功
        if !self.revocations.revoke(&claims.jti, claims.exp)? {
            security_log!("WARN", "revoked_token_reuse", jti = claims.jti.clone());
            return Err(AuthError::Revoked);
        }

        let issued = self.issue_pair(employee, scope)?;
        tracing::info!(
            employee_id = issued.employee.id,
            scope = %scope,
            "Tokens rotated"
        );
        Ok(issued)
    }

    /// Revoke a refresh token; expired tokens are already unusable
    pub fn revoke(&self, refresh_token: &str) -> AuthResult<()> {
        let claims = match self.jwt.validate_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(JwtError::ExpiredToken) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        self.revocations.revoke(&claims.jti, claims.exp)?;
        tracing::info!(employee_id = %claims.sub, "Refresh token revoked");
        Ok(())
    }

    /// Logout always succeeds; a usable refresh token is revoked on the way out
    pub fn logout(&self, refresh_token: Option<&str>) {
        if let Some(token) = refresh_token
            && let Err(e) = self.revoke(token)
        {
            tracing::debug!(error = %e, "Logout with unusable refresh token");
        }
    }

    /// Re-issue the access token under another assumable scope
    pub fn switch_scope(&self, user: &CurrentUser, scope: Scope) -> AuthResult<AccessTokenResponse> {
        let employee = self
            .directory
            .get_employee(user.id)?
            .filter(|e| e.is_active)
            .ok_or(AuthError::IdentityInactive)?;
        let scope = Self::resolve_scope(&employee, Some(scope))?;
        let access_token = self.jwt.issue_access(&employee, Some(scope))?;

        tracing::info!(employee_id = employee.id, from = ?user.active_scope, to = %scope, "Scope switched");
        Ok(AccessTokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_ttl_secs(),
            user: user_info(&employee, Some(scope)),
        })
    }
}
