// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppError,
    models::account::{Account, Capability, Role},
    services::Viewer,
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the account id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl From<Claims> for Viewer {
    fn from(claims: Claims) -> Self {
        Viewer {
            account_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Signs a new JWT for the account, valid for `expiration_seconds`.
pub fn sign_jwt(account: &Account, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: account.id.clone(),
        username: account.username.clone(),
        role: account.role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects the
/// caller's [`Viewer`] into the request extensions.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    match verify_jwt(token, &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(Viewer::from(claims));
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Axum Middleware: capability gate.
///
/// Must be used AFTER `auth_middleware`. Returns 403 unless the caller's role
/// grants `capability`.
pub async fn require(
    capability: Capability,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let viewer = req
        .extensions()
        .get::<Viewer>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !viewer.role.can(capability) {
        tracing::warn!(
            "User '{}' ({}) denied {:?} on {}",
            viewer.username,
            viewer.role.as_str(),
            capability,
            req.uri().path()
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
