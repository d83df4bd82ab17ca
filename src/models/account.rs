// src/models/account.rs

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Collection, Record};

/// Closed set of roles. Replaces ad hoc `role in [...]` string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// Something a route or operation may require of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManagePeople,
    ManageAccounts,
    ManageContent,
    ViewReports,
    ViewLogs,
    ModerateForum,
}

const CAPABILITIES: &[(Role, &[Capability])] = &[
    (
        Role::Admin,
        &[
            Capability::ManagePeople,
            Capability::ManageAccounts,
            Capability::ManageContent,
            Capability::ViewReports,
            Capability::ViewLogs,
            Capability::ModerateForum,
        ],
    ),
    (
        Role::Teacher,
        &[
            Capability::ManageContent,
            Capability::ViewReports,
            Capability::ModerateForum,
        ],
    ),
    (Role::Student, &[]),
];

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        CAPABILITIES
            .iter()
            .find(|(role, _)| *role == self)
            .is_some_and(|(_, caps)| caps.contains(&capability))
    }

    /// Students are the only role held to exam enrollment and date windows.
    pub fn is_student(self) -> bool {
        self == Role::Student
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

/// Login credential record, stored in `accounts.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,

    /// Unique login name. Exam results are keyed by it.
    pub username: String,

    /// Argon2 password hash.
    pub password_hash: String,

    pub role: Role,

    /// Profile this account belongs to, if any (the seeded admin has none).
    #[serde(default)]
    pub person_id: Option<String>,
}

impl Record for Account {
    const COLLECTION: Collection = Collection::Accounts;
}

/// Account as shown to administrators (no password hash).
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub person_id: Option<String>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            role: account.role,
            person_id: account.person_id.clone(),
        }
    }
}

/// DTO for an administrator creating a bare account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: Role,
    pub person_id: Option<String>,
}

/// DTO for changing an account's role or password.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    pub role: Option<Role>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Length range, in characters, of a username on a new account.
pub const USERNAME_LENGTH: RangeInclusive<usize> = 3..=50;

/// Same rule as `CreateAccountRequest.username`, for usernames derived from other fields.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_LENGTH.contains(&username.chars().count())
}
