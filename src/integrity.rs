use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::models::Student;

/// Data-quality finding over a whole collection. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Every repeat occurrence of an id, in collection order.
    DuplicateIds { ids: Vec<String> },
    MissingRequired { count: usize },
    /// Only `assessment_score` and `comprehension` are range-checked.
    OutOfRange { count: usize },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DuplicateIds { ids } => write!(f, "Duplicate student IDs: {}", ids.join(", ")),
            Issue::MissingRequired { count } => {
                write!(f, "{count} students with missing required data")
            }
            Issue::OutOfRange { count } => write!(f, "{count} students with invalid scores"),
        }
    }
}

fn in_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

pub fn validate_collection(records: &[Student]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    let duplicates: Vec<String> = records
        .iter()
        .filter(|student| !seen.insert(student.student_id.as_str()))
        .map(|student| student.student_id.clone())
        .collect();
    if !duplicates.is_empty() {
        issues.push(Issue::DuplicateIds { ids: duplicates });
    }

    let incomplete = records
        .iter()
        .filter(|student| student.name.is_empty() || student.student_id.is_empty())
        .count();
    if incomplete > 0 {
        issues.push(Issue::MissingRequired { count: incomplete });
    }

    let outliers = records
        .iter()
        .filter(|student| !in_range(student.assessment_score) || !in_range(student.comprehension))
        .count();
    if outliers > 0 {
        issues.push(Issue::OutOfRange { count: outliers });
    }

    issues
}
