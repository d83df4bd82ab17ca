// src/services/analytics.rs

//! Read-only aggregates recomputed from the current collections on every call.
//! Every list has a total order (ties broken by id or name), so equal inputs
//! always give equal outputs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    exam_result::{ExamResult, percentage},
    person::Person,
};

pub const HARDEST_EXAMS: usize = 3;
pub const LOW_PERFORMERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamAverage {
    pub exam_id: String,
    pub exam_title: String,
    pub course: String,
    pub attempts: usize,
    /// Mean percentage, 0..=100.
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionErrorRate {
    pub question: String,
    pub attempts: usize,
    pub errors: usize,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPerformance {
    pub username: String,
    pub exams: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_students: usize,
    pub average_age: Option<f64>,
    pub average_study_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub exam_averages: Vec<ExamAverage>,
    pub hardest_exams: Vec<ExamAverage>,
    pub low_performers: Vec<StudentPerformance>,
    pub ranking: BTreeMap<String, Vec<StudentPerformance>>,
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Results written by the users in `students` (keyed by username).
pub fn student_results(
    results: &[ExamResult],
    students: &HashMap<String, Vec<String>>,
) -> Vec<ExamResult> {
    results
        .iter()
        .filter(|r| students.contains_key(&r.username))
        .cloned()
        .collect()
}

/// Mean study hours of the students enrolled in `course`. Students without a
/// recorded value are left out entirely.
pub fn study_hours_average(students: &[&Person], course: &str) -> Option<f64> {
    mean(
        students
            .iter()
            .filter(|p| p.is_enrolled(course))
            .filter_map(|p| p.study_hours),
    )
}

/// Mean percentage for every exam that has at least one result, by exam id.
pub fn exam_averages(results: &[ExamResult]) -> Vec<ExamAverage> {
    let mut by_exam: BTreeMap<&str, Vec<&ExamResult>> = BTreeMap::new();
    for r in results {
        by_exam.entry(r.exam_id.as_str()).or_default().push(r);
    }

    by_exam
        .into_iter()
        .map(|(exam_id, rs)| ExamAverage {
            exam_id: exam_id.to_string(),
            exam_title: rs[0].exam_title.clone(),
            course: rs[0].course.clone(),
            attempts: rs.len(),
            average: mean(rs.iter().map(|r| r.percentage())).unwrap_or(0.0),
        })
        .collect()
}

/// The `limit` exams with the lowest average, lowest first.
pub fn hardest_exams(results: &[ExamResult], limit: usize) -> Vec<ExamAverage> {
    let mut averages = exam_averages(results);
    averages.sort_by(|a, b| {
        a.average
            .total_cmp(&b.average)
            .then_with(|| a.exam_id.cmp(&b.exam_id))
    });
    averages.truncate(limit);
    averages
}

/// Error rate per question of one exam, highest first.
///
/// Questions are grouped by their literal text, so identically worded
/// questions are counted together.
pub fn critical_questions(results: &[ExamResult], exam_id: &str) -> Vec<QuestionErrorRate> {
    let mut by_text: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for detail in results
        .iter()
        .filter(|r| r.exam_id == exam_id)
        .flat_map(|r| &r.details)
    {
        let (attempts, errors) = by_text.entry(detail.question.as_str()).or_default();
        *attempts += 1;
        if !detail.is_correct {
            *errors += 1;
        }
    }

    let mut rates: Vec<QuestionErrorRate> = by_text
        .into_iter()
        .map(|(question, (attempts, errors))| QuestionErrorRate {
            question: question.to_string(),
            attempts,
            errors,
            error_rate: errors as f64 / attempts as f64,
        })
        .collect();
    rates.sort_by(|a, b| {
        b.error_rate
            .total_cmp(&a.error_rate)
            .then_with(|| a.question.cmp(&b.question))
    });
    rates
}

/// Per-student mean of result percentages, lowest first, at most `limit` entries.
pub fn low_performers(results: &[ExamResult], limit: usize) -> Vec<StudentPerformance> {
    let mut by_student: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in results {
        by_student
            .entry(r.username.as_str())
            .or_default()
            .push(r.percentage());
    }

    let mut performances: Vec<StudentPerformance> = by_student
        .into_iter()
        .map(|(username, pcts)| StudentPerformance {
            username: username.to_string(),
            exams: pcts.len(),
            percentage: mean(pcts.iter().copied()).unwrap_or(0.0),
        })
        .collect();
    performances.sort_by(|a, b| {
        a.percentage
            .total_cmp(&b.percentage)
            .then_with(|| a.username.cmp(&b.username))
    });
    performances.truncate(limit);
    performances
}

/// Students ranked within every course they are enrolled in, best first.
///
/// A student's overall percentage is the sum of their scores over the sum of
/// their totals across all results. Results of users with no entry in
/// `courses` (staff, unlinked accounts) are ignored.
pub fn ranking_by_course(
    results: &[ExamResult],
    courses: &HashMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<StudentPerformance>> {
    let mut totals: BTreeMap<&str, (u32, u32, usize)> = BTreeMap::new();
    for r in results.iter().filter(|r| courses.contains_key(&r.username)) {
        let (score, total, exams) = totals.entry(r.username.as_str()).or_default();
        *score += r.score;
        *total += r.total;
        *exams += 1;
    }

    let mut ranking: BTreeMap<String, Vec<StudentPerformance>> = BTreeMap::new();
    for (username, (score, total, exams)) in totals {
        for course in &courses[username] {
            ranking
                .entry(course.clone())
                .or_default()
                .push(StudentPerformance {
                    username: username.to_string(),
                    exams,
                    percentage: percentage(score, total),
                });
        }
    }

    for list in ranking.values_mut() {
        list.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.username.cmp(&b.username))
        });
    }
    ranking
}

/// Head count, mean age and mean study hours of the given students.
pub fn summary(students: &[&Person], today: NaiveDate) -> Summary {
    Summary {
        total_students: students.len(),
        average_age: mean(students.iter().filter_map(|p| p.age_on(today)).map(f64::from)),
        average_study_hours: mean(students.iter().filter_map(|p| p.study_hours)),
    }
}

/// Every aggregate, computed over the results of the students in `courses` only.
pub fn dashboard(results: &[ExamResult], courses: &HashMap<String, Vec<String>>) -> Dashboard {
    let results = student_results(results, courses);
    Dashboard {
        exam_averages: exam_averages(&results),
        hardest_exams: hardest_exams(&results, HARDEST_EXAMS),
        low_performers: low_performers(&results, LOW_PERFORMERS),
        ranking: ranking_by_course(&results, courses),
    }
}
