use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{Student, StudentField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction `{other}`")),
        }
    }
}

/// Case-insensitive substring match on name, id or class.
pub fn matches(student: &Student, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    [&student.name, &student.student_id, &student.class]
        .iter()
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Filtered, sorted copy of `records`. The sort is stable in both
/// directions: equal keys keep their input order.
pub fn filter_and_sort(
    records: &[Student],
    search_term: &str,
    sort_field: StudentField,
    direction: SortDirection,
) -> Vec<Student> {
    let mut view: Vec<Student> = records
        .iter()
        .filter(|student| matches(student, search_term))
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort_field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    view
}

fn compare_by(a: &Student, b: &Student, field: StudentField) -> Ordering {
    match (a.text(field), b.text(field)) {
        (Some(left), Some(right)) => locale_compare(left, right),
        _ => {
            let left = a.numeric(field).unwrap_or_default();
            let right = b.numeric(field).unwrap_or_default();
            left.total_cmp(&right)
        }
    }
}

/// Dictionary order: case folds first, case only breaks ties.
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| right.cmp(left))
}
