// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Collection, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub course: String,
    /// Sanitised HTML body.
    pub content: String,
}

impl Record for Lesson {
    const COLLECTION: Collection = Collection::Lessons;
}

/// DTO for creating or replacing a lesson.
#[derive(Debug, Deserialize, Validate)]
pub struct LessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub course: String,
    #[validate(length(min = 1, max = 50000))]
    pub content: String,
}

/// Query parameters for listing lessons and exercises.
#[derive(Debug, Deserialize)]
pub struct CourseFilter {
    pub course: Option<String>,
}
