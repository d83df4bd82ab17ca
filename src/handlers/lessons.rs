// src/handlers/lessons.rs

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
    models::lesson::{CourseFilter, Lesson, LessonRequest},
    services::Viewer,
    store::RecordStore,
    utils::html::clean_html,
};

/// Lists lessons, optionally for one course.
pub async fn list_lessons(
    State(store): State<Arc<RecordStore>>,
    Query(filter): Query<CourseFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut lessons: Vec<Lesson> = store
        .load::<Lesson>()?
        .into_iter()
        .filter(|l| filter.course.as_ref().is_none_or(|c| &l.course == c))
        .collect();
    lessons.sort_by(|a, b| a.course.cmp(&b.course).then_with(|| a.title.cmp(&b.title)));

    Ok(Json(lessons))
}

/// Retrieves a single lesson by ID.
pub async fn get_lesson(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = store
        .load::<Lesson>()?
        .into_iter()
        .find(|l| l.id == id)
        .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(lesson))
}

/// Creates a lesson. Staff only.
pub async fn create_lesson(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<LessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lesson = Lesson {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        course: payload.course,
        content: clean_html(&payload.content),
    };

    store.update(|lessons: &mut Vec<Lesson>| {
        lessons.push(lesson.clone());
        Ok::<_, AppError>(())
    })?;

    tracing::info!("User '{}' ADDED lesson '{}'", viewer.username, lesson.title);
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Replaces a lesson's title, course and content. Staff only.
pub async fn update_lesson(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(payload): Json<LessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lesson = store.update(|lessons: &mut Vec<Lesson>| {
        let lesson = lessons
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(AppError::NotFound("Lesson not found".to_string()))?;
        lesson.title = payload.title;
        lesson.course = payload.course;
        lesson.content = clean_html(&payload.content);
        Ok::<_, AppError>(lesson.clone())
    })?;

    tracing::info!("User '{}' EDITED lesson '{}'", viewer.username, lesson.id);
    Ok(Json(lesson))
}

/// Deletes a lesson. Staff only.
pub async fn delete_lesson(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.update(|lessons: &mut Vec<Lesson>| {
        let before = lessons.len();
        lessons.retain(|l| l.id != id);
        if lessons.len() == before {
            return Err(AppError::NotFound("Lesson not found".to_string()));
        }
        Ok(())
    })?;

    tracing::info!("User '{}' DELETED lesson '{}'", viewer.username, id);
    Ok(StatusCode::NO_CONTENT)
}
