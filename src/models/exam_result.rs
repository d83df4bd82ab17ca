// src/models/exam_result.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::achievement::EarnedAchievement,
    store::{Collection, Record},
};

/// Per-question record kept with each result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question: String,
    /// `None` when the question was left unanswered.
    pub answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The persisted outcome of one learner's attempt at one exam (`results.json`).
/// Title and course are copied from the exam at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub course: String,
    pub username: String,
    pub score: u32,
    pub total: u32,
    pub submitted_at: DateTime<Utc>,
    pub details: Vec<AnswerDetail>,
}

impl Record for ExamResult {
    const COLLECTION: Collection = Collection::Results;
}

impl ExamResult {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.total)
    }
}

/// `score / total * 100`, or 0 for an empty exam.
pub fn percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// Key: question local id, or the form field name `questao_<id>`.
    /// Value: the selected option.
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub result: ExamResult,
    pub new_achievements: Vec<EarnedAchievement>,
}
