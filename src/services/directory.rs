// src/services/directory.rs

use std::collections::HashMap;

use crate::{
    models::{
        account::{Account, Role},
        person::Person,
    },
    store::{RecordStore, StoreError},
};

/// Snapshot of accounts and people, joined through `Account.person_id`.
pub struct Directory {
    accounts: Vec<Account>,
    people: Vec<Person>,
}

impl Directory {
    pub fn new(accounts: Vec<Account>, people: Vec<Person>) -> Self {
        Self { accounts, people }
    }

    pub fn load(store: &RecordStore) -> Result<Self, StoreError> {
        Ok(Self::new(store.load()?, store.load()?))
    }

    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn person_for(&self, username: &str) -> Option<&Person> {
        let person_id = self.account(username)?.person_id.as_deref()?;
        self.people.iter().find(|p| p.id == person_id)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// People linked to at least one student account.
    pub fn students(&self) -> Vec<&Person> {
        self.people
            .iter()
            .filter(|p| {
                self.accounts
                    .iter()
                    .any(|a| a.role == Role::Student && a.person_id.as_deref() == Some(p.id.as_str()))
            })
            .collect()
    }

    /// Enrolled courses of every student account that has a linked person.
    pub fn student_courses(&self) -> HashMap<String, Vec<String>> {
        self.accounts
            .iter()
            .filter(|a| a.role == Role::Student)
            .filter_map(|a| {
                let person_id = a.person_id.as_deref()?;
                let person = self.people.iter().find(|p| p.id == person_id)?;
                Some((a.username.clone(), person.courses.clone()))
            })
            .collect()
    }
}

/// Id of the person linked to `username`, if any.
pub fn person_id_for<'a>(accounts: &'a [Account], username: &str) -> Option<&'a str> {
    accounts
        .iter()
        .find(|a| a.username == username)
        .and_then(|a| a.person_id.as_deref())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{
        account::{Account, Role},
        person::Person,
    };

    pub fn person(id: &str, name: &str, courses: &[&str]) -> Person {
        Person {
            id: id.to_string(),
            name: name.to_string(),
            birth_date: None,
            courses: courses.iter().map(|c| c.to_string()).collect(),
            study_hours: None,
            study_hours_goal: None,
            picture: None,
            achievements: Vec::new(),
        }
    }

    pub fn account(username: &str, role: Role, person_id: Option<&str>) -> Account {
        Account {
            id: format!("acc-{}", username),
            username: username.to_string(),
            password_hash: String::new(),
            role,
            person_id: person_id.map(str::to_string),
        }
    }
}
