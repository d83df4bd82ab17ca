// src/handlers/exams.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::today,
    models::{
        exam::{CreateExamRequest, Exam, ExamSummary},
        exam_result::SubmitExamRequest,
    },
    services::{
        Viewer,
        directory::Directory,
        exam::{AnswerSheet, start_exam as start, submit_exam as submit},
    },
    store::RecordStore,
};

/// Lists exams. Students only see exams of the courses they are enrolled in.
pub async fn list_exams(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    let exams: Vec<Exam> = store.load()?;

    let visible: Vec<ExamSummary> = if viewer.role.is_student() {
        let directory = Directory::load(&store)?;
        let person = directory.person_for(&viewer.username);
        exams
            .iter()
            .filter(|e| person.is_some_and(|p| p.is_enrolled(&e.course)))
            .map(ExamSummary::from)
            .collect()
    } else {
        exams.iter().map(ExamSummary::from).collect()
    };

    Ok(Json(visible))
}

/// Full exam, answers included. Staff only.
pub async fn get_exam(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store
        .load::<Exam>()?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Creates an exam. Staff only.
pub async fn create_exam(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exam = payload
        .into_exam(Uuid::new_v4().to_string())
        .map_err(AppError::BadRequest)?;

    store.update(|exams: &mut Vec<Exam>| {
        exams.push(exam.clone());
        Ok::<_, AppError>(())
    })?;

    tracing::info!(
        "User '{}' CREATED exam '{}' ({} questions)",
        viewer.username,
        exam.title,
        exam.questions.len()
    );
    Ok((StatusCode::CREATED, Json(ExamSummary::from(&exam))))
}

/// Deletes an exam. Existing results are kept. Staff only.
pub async fn delete_exam(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.update(|exams: &mut Vec<Exam>| {
        let before = exams.len();
        exams.retain(|e| e.id != id);
        if exams.len() == before {
            return Err(AppError::NotFound("Exam not found".to_string()));
        }
        Ok(())
    })?;

    tracing::info!("User '{}' DELETED exam '{}'", viewer.username, id);
    Ok(StatusCode::NO_CONTENT)
}

/// Opens an exam for taking: eligibility is checked and answers are hidden.
pub async fn start_exam(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = start(&store, &viewer, &id, today()).inspect_err(|e| {
        tracing::info!("User '{}' could not open exam '{}': {}", viewer.username, id, e);
    })?;

    Ok(Json(exam))
}

/// Grades and stores a submission; returns the result and any new achievements.
pub async fn submit_exam(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answers = AnswerSheet::from_fields(req.answers);
    let outcome = submit(&store, &viewer, &id, &answers, Utc::now(), today())?;

    Ok((StatusCode::CREATED, Json(outcome)))
}
