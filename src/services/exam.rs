// src/services/exam.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    models::{
        exam::{Exam, PublicExam},
        exam_result::{AnswerDetail, ExamResult, SubmissionResponse},
        person::Person,
    },
    services::{Viewer, achievements, directory::Directory},
    store::{RecordStore, StoreError},
};

/// Why a learner may not take (or submit) an exam.
/// Variants are listed in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExamAccessError {
    #[error("Exam not found")]
    NotFound,
    #[error("You are not enrolled in this exam's course")]
    Forbidden,
    #[error("You have already completed this exam")]
    AlreadyCompleted,
    #[error("This exam is not open yet")]
    NotYetOpen,
    #[error("This exam has expired")]
    Expired,
}

#[derive(Debug, thiserror::Error)]
pub enum ExamError {
    #[error(transparent)]
    Access(#[from] ExamAccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Form field prefix used by exam pages (`questao_0`, `questao_1`, ...).
const FIELD_PREFIX: &str = "questao_";

/// Submitted answers keyed by question local id.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet(HashMap<String, String>);

impl AnswerSheet {
    /// Accepts both bare local ids and `questao_<id>` field names.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let answers = fields
            .into_iter()
            .map(|(field, value)| {
                let id = match field.strip_prefix(FIELD_PREFIX) {
                    Some(id) => id.to_string(),
                    None => field.clone(),
                };
                (id, value)
            })
            .collect();
        Self(answers)
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub score: u32,
    /// Number of questions in the exam, answered or not.
    pub total: u32,
    pub details: Vec<AnswerDetail>,
}

/// Grades `answers` against `exam`, question by question in stored order.
///
/// Comparison is exact string equality. A missing answer is simply wrong.
pub fn grade(exam: &Exam, answers: &AnswerSheet) -> Grade {
    let mut score = 0;
    let details: Vec<AnswerDetail> = exam
        .questions
        .iter()
        .map(|q| {
            let answer = answers.get(&q.id);
            let is_correct = answer == Some(q.correct.as_str());
            if is_correct {
                score += 1;
            }
            AnswerDetail {
                question: q.text.clone(),
                answer: answer.map(str::to_string),
                correct_answer: q.correct.clone(),
                is_correct,
            }
        })
        .collect();

    Grade {
        score,
        total: details.len() as u32,
        details,
    }
}

/// Decides whether `viewer` may take `exam_id` on `today`.
///
/// Staff skip every rule except existence. Students are checked in a fixed
/// order: existence, enrollment, already completed, not yet open, expired.
pub fn check_eligibility<'a>(
    viewer: &Viewer,
    person: Option<&Person>,
    exam_id: &str,
    exams: &'a [Exam],
    results: &[ExamResult],
    today: NaiveDate,
) -> Result<&'a Exam, ExamAccessError> {
    let exam = exams
        .iter()
        .find(|e| e.id == exam_id)
        .ok_or(ExamAccessError::NotFound)?;

    if !viewer.role.is_student() {
        return Ok(exam);
    }

    if !person.is_some_and(|p| p.is_enrolled(&exam.course)) {
        return Err(ExamAccessError::Forbidden);
    }

    if results
        .iter()
        .any(|r| r.username == viewer.username && r.exam_id == exam.id)
    {
        return Err(ExamAccessError::AlreadyCompleted);
    }

    if today < exam.start_date {
        return Err(ExamAccessError::NotYetOpen);
    }

    if today > exam.end_date {
        return Err(ExamAccessError::Expired);
    }

    Ok(exam)
}

/// Returns the exam without answers if the viewer may take it.
pub fn start_exam(
    store: &RecordStore,
    viewer: &Viewer,
    exam_id: &str,
    today: NaiveDate,
) -> Result<PublicExam, ExamError> {
    let exams: Vec<Exam> = store.load()?;
    let results: Vec<ExamResult> = store.load()?;
    let directory = Directory::load(store)?;

    let exam = check_eligibility(
        viewer,
        directory.person_for(&viewer.username),
        exam_id,
        &exams,
        &results,
        today,
    )?;

    Ok(PublicExam::from(exam))
}

/// Grades and persists a submission, then runs the achievement evaluator.
///
/// Eligibility is re-checked while holding the results writer lock, so two
/// racing submissions from the same student cannot both be stored.
pub fn submit_exam(
    store: &RecordStore,
    viewer: &Viewer,
    exam_id: &str,
    answers: &AnswerSheet,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<SubmissionResponse, ExamError> {
    let exams: Vec<Exam> = store.load()?;
    let directory = Directory::load(store)?;
    let person = directory.person_for(&viewer.username);

    let result = store.update(|results: &mut Vec<ExamResult>| {
        let exam = check_eligibility(viewer, person, exam_id, &exams, results.as_slice(), today)?;
        let grade = grade(exam, answers);

        let result = ExamResult {
            id: Uuid::new_v4().to_string(),
            exam_id: exam.id.clone(),
            exam_title: exam.title.clone(),
            course: exam.course.clone(),
            username: viewer.username.clone(),
            score: grade.score,
            total: grade.total,
            submitted_at: now,
            details: grade.details,
        };
        results.push(result.clone());
        Ok::<_, ExamError>(result)
    })?;

    tracing::info!(
        "User '{}' submitted exam '{}': {}/{}",
        viewer.username,
        result.exam_id,
        result.score,
        result.total
    );

    // The result is already saved; a failing evaluator must not turn this into an error.
    let new_achievements = achievements::evaluate(store, &viewer.username, today)
        .unwrap_or_else(|e| {
            tracing::warn!("Achievement evaluation failed for '{}': {}", viewer.username, e);
            Vec::new()
        });

    Ok(SubmissionResponse {
        result,
        new_achievements,
    })
}
