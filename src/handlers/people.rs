// src/handlers/people.rs

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
    handlers::accounts::ensure_no_results,
    models::{
        account::{Account, Role, USERNAME_LENGTH, is_valid_username},
        person::{CreatePersonRequest, Person, UpdatePersonRequest},
    },
    services::{Viewer, directory::person_id_for},
    store::RecordStore,
    utils::hash::hash_password,
};

/// Lists every person, sorted by name.
/// Admin only.
pub async fn list_people(
    State(store): State<Arc<RecordStore>>,
) -> Result<impl IntoResponse, AppError> {
    let mut people: Vec<Person> = store.load()?;
    people.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(people))
}

/// Registers a person together with their login account.
/// Admin only.
///
/// The two records live in different files and are written one after the
/// other; if the account write fails the person is left without a login.
pub async fn create_person(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CreatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let username = payload.username.clone().unwrap_or_else(|| payload.name.clone());
    if !is_valid_username(&username) {
        return Err(AppError::BadRequest(format!(
            "Username '{}' must be between {} and {} characters; set `username` explicitly",
            username,
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        )));
    }
    let accounts: Vec<Account> = store.load()?;
    if accounts.iter().any(|a| a.username == username) {
        return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
    }
    ensure_no_results(&store, &username)?;
    let password_hash = hash_password(&payload.password)?;

    let person = Person {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        birth_date: payload.birth_date,
        courses: payload.courses,
        study_hours: payload.study_hours,
        study_hours_goal: None,
        picture: None,
        achievements: Vec::new(),
    };

    store.update(|people: &mut Vec<Person>| {
        if people.iter().any(|p| p.name == person.name) {
            return Err(AppError::Conflict(format!("'{}' is already registered", person.name)));
        }
        people.push(person.clone());
        Ok(())
    })?;

    let account = Account {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        password_hash,
        role: payload.role.unwrap_or(Role::Student),
        person_id: Some(person.id.clone()),
    };
    let account_id = account.id.clone();

    store
        .update(|accounts: &mut Vec<Account>| {
            if accounts.iter().any(|a| a.username == account.username) {
                return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
            }
            accounts.push(account);
            Ok(())
        })
        .inspect_err(|e| {
            tracing::error!("Person '{}' saved but its account was not: {}", person.id, e);
        })?;

    tracing::info!("User '{}' ADDED person '{}'", viewer.username, person.name);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": person.id, "account_id": account_id})),
    ))
}

/// Updates a person's record. Fields are optional.
/// Admin only.
pub async fn update_person(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let person = store.update(|people: &mut Vec<Person>| {
        if let Some(new_name) = &payload.name
            && people.iter().any(|p| &p.name == new_name && p.id != id)
        {
            return Err(AppError::Conflict(format!("'{}' is already registered", new_name)));
        }

        let person = people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Person not found".to_string()))?;

        if let Some(name) = payload.name {
            person.name = name;
        }
        if let Some(birth_date) = payload.birth_date {
            person.birth_date = Some(birth_date);
        }
        if let Some(courses) = payload.courses {
            person.courses = courses;
        }
        if let Some(hours) = payload.study_hours {
            person.study_hours = Some(hours);
        }
        Ok(person.clone())
    })?;

    tracing::info!("User '{}' EDITED person '{}'", viewer.username, person.name);
    Ok(Json(person))
}

/// Deletes a person and every account linked to it. Their exam results are
/// kept, which blocks reuse of the username (see `ensure_no_results`).
/// Admin only. Prevents deleting one's own profile.
///
/// Two sequential writes with no rollback: a failure of the second leaves
/// orphaned accounts behind, which is logged.
pub async fn delete_person(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let accounts: Vec<Account> = store.load()?;
    if person_id_for(&accounts, &viewer.username) == Some(id.as_str()) {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let removed = store.update(|people: &mut Vec<Person>| {
        let pos = people
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::NotFound("Person not found".to_string()))?;
        Ok::<_, AppError>(people.remove(pos))
    })?;

    store
        .update(|accounts: &mut Vec<Account>| {
            accounts.retain(|a| a.person_id.as_deref() != Some(id.as_str()));
            Ok::<_, AppError>(())
        })
        .inspect_err(|e| {
            tracing::error!(
                "Person '{}' deleted but linked accounts were not: {}",
                removed.id,
                e
            );
        })?;

    tracing::info!("User '{}' DELETED person '{}'", viewer.username, removed.name);
    Ok(StatusCode::NO_CONTENT)
}
