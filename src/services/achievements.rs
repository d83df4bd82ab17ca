// src/services/achievements.rs

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    models::{
        account::Account,
        achievement::{AchievementDef, EarnedAchievement},
        exam::Exam,
        exam_result::ExamResult,
        person::Person,
    },
    services::directory::person_id_for,
    store::{RecordStore, StoreError},
};

/// The fixed predicates behind catalog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    FirstExam,
    HighAchiever,
    Perfectionist,
    Marathoner,
    CourseSpecialist(String),
}

impl Rule {
    /// Entries with a `course` are specialists; others are matched by id.
    /// Unknown ids have no rule and are never granted.
    fn for_def(def: &AchievementDef) -> Option<Rule> {
        if let Some(course) = &def.course {
            return Some(Rule::CourseSpecialist(course.clone()));
        }
        match def.id.as_str() {
            "first_exam" => Some(Rule::FirstExam),
            "high_achiever" => Some(Rule::HighAchiever),
            "perfectionist" => Some(Rule::Perfectionist),
            "marathoner" => Some(Rule::Marathoner),
            _ => None,
        }
    }

    fn is_met(&self, results: &[&ExamResult], exams: &[Exam]) -> bool {
        match self {
            Rule::FirstExam => !results.is_empty(),
            Rule::HighAchiever => results.iter().any(|r| r.percentage() > 90.0),
            Rule::Perfectionist => results.iter().any(|r| r.total > 0 && r.score == r.total),
            Rule::Marathoner => results.len() >= 3,
            Rule::CourseSpecialist(course) => {
                let course_exams: HashSet<&str> = exams
                    .iter()
                    .filter(|e| &e.course == course)
                    .map(|e| e.id.as_str())
                    .collect();
                let completed: HashSet<&str> = results.iter().map(|r| r.exam_id.as_str()).collect();
                !course_exams.is_empty() && course_exams.is_subset(&completed)
            }
        }
    }
}

/// Catalog written on first start when `achievements.json` is empty.
pub fn default_catalog() -> Vec<AchievementDef> {
    [
        ("first_exam", "First Steps", "Complete your first exam."),
        ("high_achiever", "High Achiever", "Score above 90% on an exam."),
        ("perfectionist", "Perfectionist", "Answer every question of an exam correctly."),
        ("marathoner", "Marathoner", "Complete three exams."),
    ]
    .into_iter()
    .map(|(id, title, description)| AchievementDef {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        course: None,
    })
    .collect()
}

/// Fills an empty catalog with [`default_catalog`]. Returns whether it wrote anything.
pub fn seed_default_catalog(store: &RecordStore) -> Result<bool, StoreError> {
    store.update(|catalog: &mut Vec<AchievementDef>| {
        if !catalog.is_empty() {
            return Ok(false);
        }
        *catalog = default_catalog();
        Ok(true)
    })
}

/// Catalog entries `person` does not hold yet and whose rule `results` satisfy.
/// Pure: the caller decides what to do with the returned records.
pub fn newly_earned(
    person: &Person,
    catalog: &[AchievementDef],
    results: &[&ExamResult],
    exams: &[Exam],
    today: NaiveDate,
) -> Vec<EarnedAchievement> {
    let mut earned: Vec<EarnedAchievement> = Vec::new();

    for def in catalog {
        if person.holds(&def.id) || earned.iter().any(|e| e.id == def.id) {
            continue;
        }
        let Some(rule) = Rule::for_def(def) else {
            tracing::debug!("No rule for achievement '{}', skipping", def.id);
            continue;
        };
        if rule.is_met(results, exams) {
            earned.push(EarnedAchievement {
                id: def.id.clone(),
                title: def.title.clone(),
                date: today,
            });
        }
    }

    earned
}

/// Grants every newly satisfied achievement to `username` and saves the people
/// collection. A user without a linked profile simply earns nothing.
pub fn evaluate(
    store: &RecordStore,
    username: &str,
    today: NaiveDate,
) -> Result<Vec<EarnedAchievement>, StoreError> {
    let accounts: Vec<Account> = store.load()?;
    let Some(person_id) = person_id_for(&accounts, username).map(str::to_string) else {
        tracing::debug!("No profile linked to '{}', no achievements", username);
        return Ok(Vec::new());
    };

    let results: Vec<ExamResult> = store.load()?;
    let mine: Vec<&ExamResult> = results.iter().filter(|r| r.username == username).collect();
    let exams: Vec<Exam> = store.load()?;
    let catalog: Vec<AchievementDef> = store.load()?;

    let earned = store.update(|people: &mut Vec<Person>| {
        let Some(person) = people.iter_mut().find(|p| p.id == person_id) else {
            return Ok::<_, StoreError>(Vec::new());
        };
        let earned = newly_earned(person, &catalog, &mine, &exams, today);
        person.achievements.extend(earned.iter().cloned());
        Ok(earned)
    })?;

    if !earned.is_empty() {
        let ids: Vec<&str> = earned.iter().map(|a| a.id.as_str()).collect();
        tracing::info!("User '{}' earned achievements: {}", username, ids.join(", "));
    }

    Ok(earned)
}
