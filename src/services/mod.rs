// src/services/mod.rs

//! Domain logic, kept free of HTTP types so it can be driven from tests.

pub mod achievements;
pub mod analytics;
pub mod directory;
pub mod exam;

use crate::models::account::Role;

/// Request-scoped identity of the caller, derived from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub account_id: String,
    pub username: String,
    pub role: Role,
}
