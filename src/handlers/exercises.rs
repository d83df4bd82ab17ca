// src/handlers/exercises.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exercise::{
            CheckAnswerRequest, CheckAnswerResponse, CreateExerciseRequest, Exercise,
            PublicExercise,
        },
        lesson::CourseFilter,
    },
    services::Viewer,
    store::RecordStore,
};

/// Lists practice exercises without their answers.
pub async fn list_exercises(
    State(store): State<Arc<RecordStore>>,
    Query(filter): Query<CourseFilter>,
) -> Result<impl IntoResponse, AppError> {
    let exercises: Vec<PublicExercise> = store
        .load::<Exercise>()?
        .iter()
        .filter(|e| filter.course.as_ref().is_none_or(|c| &e.course == c))
        .map(PublicExercise::from)
        .collect();

    Ok(Json(exercises))
}

/// Creates an exercise. Staff only.
pub async fn create_exercise(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !payload.options.contains(&payload.correct) {
        return Err(AppError::BadRequest(
            "correct option is not one of the options".to_string(),
        ));
    }

    let exercise = Exercise {
        id: Uuid::new_v4().to_string(),
        course: payload.course,
        question: payload.question,
        image: payload.image,
        options: payload.options,
        correct: payload.correct,
    };

    store.update(|exercises: &mut Vec<Exercise>| {
        exercises.push(exercise.clone());
        Ok::<_, AppError>(())
    })?;

    tracing::info!("User '{}' ADDED exercise '{}'", viewer.username, exercise.id);
    Ok((StatusCode::CREATED, Json(exercise)))
}

/// Deletes an exercise. Staff only.
pub async fn delete_exercise(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.update(|exercises: &mut Vec<Exercise>| {
        let before = exercises.len();
        exercises.retain(|e| e.id != id);
        if exercises.len() == before {
            return Err(AppError::NotFound("Exercise not found".to_string()));
        }
        Ok(())
    })?;

    tracing::info!("User '{}' DELETED exercise '{}'", viewer.username, id);
    Ok(StatusCode::NO_CONTENT)
}

/// Checks one answer. Nothing is stored.
pub async fn check_exercise(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
    Json(payload): Json<CheckAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = store
        .load::<Exercise>()?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    Ok(Json(CheckAnswerResponse {
        correct: exercise.check(&payload.answer),
        correct_option: exercise.correct,
    }))
}
