// src/handlers/reports.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    handlers::today,
    models::{exam_result::ExamResult, person::Person},
    services::{analytics, directory::Directory},
    store::RecordStore,
};

#[derive(Debug, Deserialize)]
pub struct CourseParams {
    pub course: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// The people counted as students: those linked to a student account, or
/// everyone when no account links to a person yet.
fn students(directory: &Directory) -> Vec<&Person> {
    let students = directory.students();
    if students.is_empty() {
        directory.people().iter().collect()
    } else {
        students
    }
}

/// Exam averages, hardest exams, low performers and per-course ranking.
pub async fn dashboard(
    State(store): State<Arc<RecordStore>>,
) -> Result<impl IntoResponse, AppError> {
    let results: Vec<ExamResult> = store.load()?;
    let directory = Directory::load(&store)?;

    Ok(Json(analytics::dashboard(
        &results,
        &directory.student_courses(),
    )))
}

/// Head count, mean age and mean study hours.
pub async fn summary(State(store): State<Arc<RecordStore>>) -> Result<impl IntoResponse, AppError> {
    let directory = Directory::load(&store)?;

    Ok(Json(analytics::summary(&students(&directory), today())))
}

/// Mean study hours of one course's students.
pub async fn study_hours(
    State(store): State<Arc<RecordStore>>,
    Query(params): Query<CourseParams>,
) -> Result<impl IntoResponse, AppError> {
    let directory = Directory::load(&store)?;
    let average = analytics::study_hours_average(&students(&directory), &params.course);

    Ok(Json(json!({
        "course": params.course,
        "average": average,
    })))
}

/// Per-question error rates of one exam, worst first. Student results only.
pub async fn critical_questions(
    State(store): State<Arc<RecordStore>>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results: Vec<ExamResult> = store.load()?;
    let results = analytics::student_results(&results, &Directory::load(&store)?.student_courses());

    Ok(Json(analytics::critical_questions(&results, &exam_id)))
}

/// Students with the lowest mean percentage (default 5). Staff results are ignored.
pub async fn low_performers(
    State(store): State<Arc<RecordStore>>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let results: Vec<ExamResult> = store.load()?;
    let results = analytics::student_results(&results, &Directory::load(&store)?.student_courses());
    let limit = params.limit.unwrap_or(analytics::LOW_PERFORMERS).min(100);

    Ok(Json(analytics::low_performers(&results, limit)))
}
