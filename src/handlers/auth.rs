// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::account::{Account, LoginRequest},
    store::RecordStore,
    utils::{hash::verify_password, jwt::sign_jwt},
};

/// Authenticates a user and returns a JWT token.
///
/// Unknown usernames and wrong passwords get the same answer.
pub async fn login(
    State(store): State<Arc<RecordStore>>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let accounts: Vec<Account> = store.load()?;
    let invalid = || AppError::AuthError("Invalid username or password".to_string());

    let Some(account) = accounts.iter().find(|a| a.username == payload.username) else {
        tracing::warn!("Login failed for unknown user '{}'", payload.username);
        return Err(invalid());
    };

    if !verify_password(&payload.password, &account.password_hash)? {
        tracing::warn!("Login failed for user '{}'", payload.username);
        return Err(invalid());
    }

    let token = sign_jwt(account, &config.jwt_secret, config.jwt_expiration)?;
    tracing::info!("User '{}' logged in", account.username);

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": account.role,
    })))
}
