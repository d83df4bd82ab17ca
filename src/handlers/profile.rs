use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam_result::ExamResult,
        person::{Person, ProfileResponse, UpdateProfileRequest},
    },
    services::{Viewer, directory::Directory},
    store::RecordStore,
};

/// Get current user's profile, achievements included.
pub async fn get_me(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    let directory = Directory::load(&store)?;
    let results: Vec<ExamResult> = store.load()?;

    Ok(Json(ProfileResponse {
        username: viewer.username.clone(),
        role: viewer.role,
        person: directory.person_for(&viewer.username).cloned(),
        exams_taken: results.iter().filter(|r| r.username == viewer.username).count(),
    }))
}

/// Learners may change their own study-hours goal and profile picture.
pub async fn update_me(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let person_id = Directory::load(&store)?
        .person_for(&viewer.username)
        .map(|p| p.id.clone())
        .ok_or(AppError::NotFound("No profile linked to this account".to_string()))?;

    let person = store.update(|people: &mut Vec<Person>| {
        let person = people
            .iter_mut()
            .find(|p| p.id == person_id)
            .ok_or(AppError::NotFound("Profile not found".to_string()))?;

        if let Some(goal) = payload.study_hours_goal {
            person.study_hours_goal = Some(goal);
        }
        if let Some(picture) = payload.picture {
            person.picture = Some(picture);
        }
        Ok::<_, AppError>(person.clone())
    })?;

    tracing::info!("User '{}' updated their profile", viewer.username);
    Ok(Json(person))
}

/// List the caller's own exam results, most recent first.
pub async fn list_my_results(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    let mut results: Vec<ExamResult> = store
        .load::<ExamResult>()?
        .into_iter()
        .filter(|r| r.username == viewer.username)
        .collect();
    results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    Ok(Json(results))
}
