// src/handlers/accounts.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        account::{Account, AccountResponse, CreateAccountRequest, UpdateAccountRequest},
        exam_result::ExamResult,
        person::Person,
    },
    services::Viewer,
    store::RecordStore,
    utils::hash::hash_password,
};

/// Refuses a username that still owns exam results, e.g. from a deleted
/// account. Results are keyed by username and would be inherited.
pub(crate) fn ensure_no_results(store: &RecordStore, username: &str) -> Result<(), AppError> {
    let results: Vec<ExamResult> = store.load()?;
    if results.iter().any(|r| r.username == username) {
        return Err(AppError::Conflict(format!(
            "Username '{}' still has exam results and cannot be reused",
            username
        )));
    }
    Ok(())
}

/// Lists all accounts in the system.
/// Admin only.
pub async fn list_accounts(
    State(store): State<Arc<RecordStore>>,
) -> Result<impl IntoResponse, AppError> {
    let mut accounts: Vec<AccountResponse> = store
        .load::<Account>()?
        .iter()
        .map(AccountResponse::from)
        .collect();
    accounts.sort_by(|a, b| a.username.cmp(&b.username));

    Ok(Json(accounts))
}

/// Creates a new account with a specific role.
/// Admin only.
pub async fn create_account(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(person_id) = &payload.person_id {
        let people: Vec<Person> = store.load()?;
        if !people.iter().any(|p| &p.id == person_id) {
            return Err(AppError::BadRequest(format!("Person '{}' does not exist", person_id)));
        }
    }

    ensure_no_results(&store, &payload.username)?;

    let account = Account {
        id: Uuid::new_v4().to_string(),
        username: payload.username,
        password_hash: hash_password(&payload.password)?,
        role: payload.role,
        person_id: payload.person_id,
    };
    let response = AccountResponse::from(&account);

    store.update(|accounts: &mut Vec<Account>| {
        if accounts.iter().any(|a| a.username == account.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                account.username
            )));
        }
        accounts.push(account);
        Ok(())
    })?;

    tracing::info!(
        "Admin '{}' CREATED user '{}' with role '{}'",
        viewer.username,
        response.username,
        response.role.as_str()
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Changes an account's role and/or password.
/// Admin only. Admins cannot edit their own account.
pub async fn update_account(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if id == viewer.account_id {
        return Err(AppError::BadRequest("Cannot edit your own account".to_string()));
    }

    let new_hash = payload.password.as_deref().map(hash_password).transpose()?;

    let updated = store.update(|accounts: &mut Vec<Account>| {
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        if let Some(role) = payload.role {
            account.role = role;
        }
        if let Some(hash) = new_hash {
            account.password_hash = hash;
        }
        Ok::<_, AppError>(AccountResponse::from(&*account))
    })?;

    tracing::info!(
        "Admin '{}' CHANGED user '{}' (role '{}')",
        viewer.username,
        updated.username,
        updated.role.as_str()
    );

    Ok(Json(updated))
}

/// Deletes an account by ID. The linked person, if any, is kept.
/// Admin only. Prevents deleting self.
pub async fn delete_account(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if id == viewer.account_id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let removed = store.update(|accounts: &mut Vec<Account>| {
        let pos = accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or(AppError::NotFound("User not found".to_string()))?;
        Ok::<_, AppError>(accounts.remove(pos))
    })?;

    tracing::info!("Admin '{}' DELETED user '{}'", viewer.username, removed.username);
    Ok(StatusCode::NO_CONTENT)
}
