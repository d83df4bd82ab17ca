// src/handlers/mod.rs

pub mod accounts;
pub mod achievements;
pub mod auth;
pub mod exams;
pub mod exercises;
pub mod forum;
pub mod lessons;
pub mod logs;
pub mod people;
pub mod profile;
pub mod reports;

use chrono::{Local, NaiveDate};

/// Calendar date exam windows and achievement dates are evaluated against.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
