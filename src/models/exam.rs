// src/models/exam.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    store::{Collection, Record},
    utils::validate::{validate_exam_options, validate_image_ref},
};

pub const MAX_QUESTIONS: usize = 100;

/// One multiple-choice question of an exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Position-based local id ("0", "1", ...). Answers are keyed by it.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub options: Vec<String>,
    /// The correct option's value, compared by exact string equality.
    pub correct: String,
}

/// Represents an exam in `exams.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub course: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Shown to the learner; not enforced on submission.
    pub time_limit_minutes: u32,
    pub questions: Vec<Question>,
}

impl Record for Exam {
    const COLLECTION: Collection = Collection::Exams;
}

/// DTO for sending a question to the learner (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub image: Option<String>,
    pub options: Vec<String>,
}

/// DTO for an exam being taken.
#[derive(Debug, Serialize)]
pub struct PublicExam {
    pub id: String,
    pub title: String,
    pub course: String,
    pub end_date: NaiveDate,
    pub time_limit_minutes: u32,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Exam> for PublicExam {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            course: exam.course.clone(),
            end_date: exam.end_date,
            time_limit_minutes: exam.time_limit_minutes,
            questions: exam
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    id: q.id.clone(),
                    text: q.text.clone(),
                    image: q.image.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

/// Exam listing row (no questions).
#[derive(Debug, Serialize)]
pub struct ExamSummary {
    pub id: String,
    pub title: String,
    pub course: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_limit_minutes: u32,
    pub question_count: usize,
}

impl From<&Exam> for ExamSummary {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            course: exam.course.clone(),
            start_date: exam.start_date,
            end_date: exam.end_date,
            time_limit_minutes: exam.time_limit_minutes,
            question_count: exam.questions.len(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(length(max = 500), custom(function = validate_image_ref))]
    pub image: Option<String>,
    #[validate(custom(function = validate_exam_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct: String,
}

/// DTO for creating a new exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub course: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: u32,
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

impl CreateExamRequest {
    /// Checks the cross-field rules and numbers the questions by position.
    pub fn into_exam(self, id: String) -> Result<Exam, String> {
        if self.start_date > self.end_date {
            return Err("start_date must not be after end_date".to_string());
        }
        if self.questions.is_empty() || self.questions.len() > MAX_QUESTIONS {
            return Err(format!("an exam needs between 1 and {} questions", MAX_QUESTIONS));
        }
        if let Some(pos) = self
            .questions
            .iter()
            .position(|q| !q.options.contains(&q.correct))
        {
            return Err(format!("question {}: correct option is not one of its options", pos));
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| Question {
                id: i.to_string(),
                text: q.text,
                image: q.image,
                options: q.options,
                correct: q.correct,
            })
            .collect();

        Ok(Exam {
            id,
            title: self.title,
            course: self.course,
            start_date: self.start_date,
            end_date: self.end_date,
            time_limit_minutes: self.time_limit_minutes,
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn request(start: &str, end: &str, correct: &str) -> CreateExamRequest {
        CreateExamRequest {
            title: "Midterm".to_string(),
            course: "Math".to_string(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            time_limit_minutes: 30,
            questions: vec![
                CreateQuestionRequest {
                    text: "1 + 1?".to_string(),
                    image: None,
                    options: options(&["1", "2", "3", "4"]),
                    correct: "2".to_string(),
                },
                CreateQuestionRequest {
                    text: "2 + 2?".to_string(),
                    image: None,
                    options: options(&["4", "5", "6", "7"]),
                    correct: correct.to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_into_exam_numbers_questions_by_position() {
        let exam = request("2026-01-01", "2026-01-31", "4")
            .into_exam("E1".to_string())
            .unwrap();
        let ids: Vec<&str> = exam.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn test_into_exam_rejects_inverted_window() {
        assert!(request("2026-02-01", "2026-01-31", "4")
            .into_exam("E1".to_string())
            .is_err());
    }

    #[test]
    fn test_into_exam_rejects_unknown_correct_option() {
        let err = request("2026-01-01", "2026-01-31", "9")
            .into_exam("E1".to_string())
            .unwrap_err();
        assert!(err.starts_with("question 1"));
    }

    #[test]
    fn test_public_exam_hides_answers() {
        let exam = request("2026-01-01", "2026-01-31", "4")
            .into_exam("E1".to_string())
            .unwrap();
        let json = serde_json::to_value(PublicExam::from(&exam)).unwrap();
        assert!(json["questions"][0].get("correct").is_none());
        assert_eq!(json["questions"][1]["options"][0], "4");
    }

    #[test]
    fn test_question_with_two_options_is_rejected() {
        let mut req = request("2026-01-01", "2026-01-31", "4");
        assert!(req.validate().is_ok());
        req.questions[0].options = options(&["1", "2"]);
        assert!(req.validate().is_err());
    }
}
