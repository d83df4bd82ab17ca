// src/handlers/achievements.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::achievement::AchievementDef,
    services::Viewer,
    store::RecordStore,
};

/// Lists the achievement catalog.
pub async fn list_catalog(
    State(store): State<Arc<RecordStore>>,
) -> Result<impl IntoResponse, AppError> {
    let catalog: Vec<AchievementDef> = store.load()?;
    Ok(Json(catalog))
}

/// Adds a catalog entry, typically a course specialist (`course` set).
/// Admin only.
pub async fn create_achievement(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<AchievementDef>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    store.update(|catalog: &mut Vec<AchievementDef>| {
        if catalog.iter().any(|a| a.id == payload.id) {
            return Err(AppError::Conflict(format!(
                "Achievement '{}' already exists",
                payload.id
            )));
        }
        catalog.push(payload.clone());
        Ok(())
    })?;

    tracing::info!("Admin '{}' ADDED achievement '{}'", viewer.username, payload.id);
    Ok((StatusCode::CREATED, Json(payload)))
}
