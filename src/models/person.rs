// src/models/person.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{account::Role, achievement::EarnedAchievement},
    store::{Collection, Record},
    utils::validate::validate_image_ref,
};

/// A student's, teacher's or admin's profile, stored in `people.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: String,

    /// Display name, unique across people.
    pub name: String,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    /// Enrolled course names, in enrollment order.
    #[serde(default)]
    pub courses: Vec<String>,

    /// Hours actually studied, as recorded by staff.
    #[serde(default)]
    pub study_hours: Option<f64>,

    /// The learner's own weekly goal.
    #[serde(default)]
    pub study_hours_goal: Option<f64>,

    /// URL of the profile picture.
    #[serde(default)]
    pub picture: Option<String>,

    #[serde(default)]
    pub achievements: Vec<EarnedAchievement>,
}

impl Record for Person {
    const COLLECTION: Collection = Collection::People;
}

impl Person {
    pub fn is_enrolled(&self, course: &str) -> bool {
        self.courses.iter().any(|c| c == course)
    }

    pub fn holds(&self, achievement_id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == achievement_id)
    }

    /// Age in whole years on `today`, if the birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|birth| today.years_since(birth))
    }
}

/// DTO for an administrator registering a person together with their login.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePersonRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 chars"))]
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub study_hours: Option<f64>,

    /// Login name; defaults to `name`.
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: Option<Role>,
}

/// DTO for administrator edits. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub courses: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub study_hours: Option<f64>,
}

/// DTO for a learner editing their own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(range(min = 0.0, max = 168.0, message = "Goal must be between 0 and 168 hours"))]
    pub study_hours_goal: Option<f64>,
    #[validate(length(max = 500), custom(function = validate_image_ref))]
    pub picture: Option<String>,
}

/// The caller's own profile: account data plus the linked person, if any.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub role: Role,
    pub person: Option<Person>,
    pub exams_taken: usize,
}
