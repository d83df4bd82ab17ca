// src/models/achievement.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Collection, Record};

/// Catalog entry, stored in `achievements.json`.
///
/// The rule is not data: it is chosen by `id`, except for course specialists,
/// which are recognised by carrying a `course`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AchievementDef {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl Record for AchievementDef {
    const COLLECTION: Collection = Collection::Achievements;
}

/// An achievement granted to a learner, appended to their `Person` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}
