//! Authentication Handlers
//!
//! Handles login, token rotation, revocation and scope switching. Tokens are
//! returned in the body and mirrored into the `access_token` / `refresh_token`
//! cookies.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use shared::client::{LoginRequest, RefreshRequest, RevokeRequest, SwitchScopeRequest, UserInfo};
use shared::error::{Ack, AppError};

use crate::api::run_blocking;
use crate::auth::cookies::{self, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::auth::{AuthError, CurrentUser, IssuedTokens};
use crate::core::ServerState;

/// Optional JSON body; an empty body yields the default
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e)))
}

/// Refresh token from the body, falling back to the cookie
fn refresh_token_from(body: Option<String>, headers: &HeaderMap) -> Option<String> {
    body.filter(|t| !t.trim().is_empty())
        .or_else(|| cookies::get_cookie(headers, REFRESH_COOKIE).map(str::to_string))
}

/// Token pair response with both cookies set
fn token_pair_response(state: &ServerState, issued: &IssuedTokens) -> Response {
    let secure = state.config.cookie_secure;
    let refresh_max_age = issued.refresh_claims.exp - issued.refresh_claims.iat;
    (
        AppendHeaders([
            (
                SET_COOKIE,
                cookies::token_cookie(ACCESS_COOKIE, &issued.access_token, issued.expires_in, secure),
            ),
            (
                SET_COOKIE,
                cookies::token_cookie(REFRESH_COOKIE, &issued.refresh_token, refresh_max_age, secure),
            ),
        ]),
        Json(issued.to_response()),
    )
        .into_response()
}

/// Login handler
///
/// Verifies email + password and issues an access/refresh pair under the
/// requested (or default) scope.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::required_field("email"));
    }
    if req.password.is_empty() {
        return Err(AppError::required_field("password"));
    }

    let tokens = state.tokens.clone();
    let issued = run_blocking(move || tokens.login(&req.email, &req.password, req.scope)).await?;
    Ok(token_pair_response(&state, &issued))
}

/// Rotate the refresh token into a new pair
pub async fn refresh(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: RefreshRequest = optional_body(&body)?;
    let token = refresh_token_from(req.refresh_token, &headers)
        .ok_or(AuthError::RefreshTokenMissing)?;

    let tokens = state.tokens.clone();
    let issued = run_blocking(move || tokens.refresh(&token, req.scope)).await?;
    Ok(token_pair_response(&state, &issued))
}

/// Revoke a refresh token
pub async fn revoke(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let req: RevokeRequest = optional_body(&body)?;
    let token = refresh_token_from(req.refresh_token, &headers)
        .ok_or(AuthError::RefreshTokenMissing)?;

    let tokens = state.tokens.clone();
    run_blocking(move || tokens.revoke(&token)).await?;
    Ok(Json(Ack::ok()))
}

/// Logout handler
///
/// Always succeeds and clears both cookies.
pub async fn logout(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req: RevokeRequest = optional_body(&body).unwrap_or_default();
    if let Some(token) = refresh_token_from(req.refresh_token, &headers) {
        let tokens = state.tokens.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || tokens.logout(Some(&token))).await {
            tracing::warn!(error = %e, "Logout revocation task failed");
        }
    }

    (
        AppendHeaders([
            (SET_COOKIE, cookies::clear_cookie(ACCESS_COOKIE)),
            (SET_COOKIE, cookies::clear_cookie(REFRESH_COOKIE)),
        ]),
        Json(Ack::ok()),
    )
        .into_response()
}

/// Get current user info
pub async fn me(user: CurrentUser) -> Json<UserInfo> {
    Json(user.to_user_info())
}

/// Re-issue the access token under another scope the identity holds
pub async fn switch_scope(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<SwitchScopeRequest>,
) -> Result<Response, AppError> {
    let tokens = state.tokens.clone();
    let response = run_blocking(move || tokens.switch_scope(&user, req.scope)).await?;

    let cookie = cookies::token_cookie(
        ACCESS_COOKIE,
        &response.access_token,
        response.expires_in,
        state.config.cookie_secure,
    );
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(response)).into_response())
}
