// src/models/exercise.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    store::{Collection, Record},
    utils::validate::{validate_image_ref, validate_options},
};

/// Standalone practice item. Checking an answer is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub course: String,
    pub question: String,
    #[serde(default)]
    pub image: Option<String>,
    pub options: Vec<String>,
    pub correct: String,
}

impl Record for Exercise {
    const COLLECTION: Collection = Collection::Exercises;
}

impl Exercise {
    /// Exact string comparison, no normalisation.
    pub fn check(&self, answer: &str) -> bool {
        self.correct == answer
    }
}

/// DTO for sending an exercise to a learner (excludes the correct option).
#[derive(Debug, Serialize)]
pub struct PublicExercise {
    pub id: String,
    pub course: String,
    pub question: String,
    pub image: Option<String>,
    pub options: Vec<String>,
}

impl From<&Exercise> for PublicExercise {
    fn from(e: &Exercise) -> Self {
        Self {
            id: e.id.clone(),
            course: e.course.clone(),
            question: e.question.clone(),
            image: e.image.clone(),
            options: e.options.clone(),
        }
    }
}

/// DTO for creating a new exercise.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    pub course: String,
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(length(max = 500), custom(function = validate_image_ref))]
    pub image: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerResponse {
    pub correct: bool,
    pub correct_option: String,
}
