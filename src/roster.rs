//! Collection edits. Each function returns a new collection; the caller
//! swaps it in for the old one.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::models::{validate_record, FieldErrors, RawRecord, Student};

/// Owner of the active collection. Engine outputs are handed back through
/// these calls and the host replaces its collection wholesale.
pub trait DashboardHost {
    fn on_data_upload(&mut self, records: Vec<Student>);
    fn on_data_update(&mut self, records: Vec<Student>);
    fn on_student_select(&mut self, student: &Student);
}

pub fn add_student(records: &[Student], raw: &RawRecord) -> Result<Vec<Student>, FieldErrors> {
    let student = validate_record(raw)?;
    debug!("adding student {}", student.student_id);
    let mut updated = records.to_vec();
    updated.push(student);
    Ok(updated)
}

/// Replaces every record sharing the edited record's id.
pub fn replace_student(records: &[Student], edited: &Student) -> Vec<Student> {
    records
        .iter()
        .map(|student| {
            if student.student_id == edited.student_id {
                edited.clone()
            } else {
                student.clone()
            }
        })
        .collect()
}

/// Form-based edit: the submitted fields are validated like a new record.
pub fn edit_student(records: &[Student], raw: &RawRecord) -> Result<Vec<Student>, FieldErrors> {
    let edited = validate_record(raw)?;
    Ok(replace_student(records, &edited))
}

pub fn remove_student(records: &[Student], student_id: &str) -> Vec<Student> {
    records
        .iter()
        .filter(|student| student.student_id != student_id)
        .cloned()
        .collect()
}

pub fn remove_students(records: &[Student], student_ids: &[String]) -> Vec<Student> {
    let ids: HashSet<&str> = student_ids.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|student| !ids.contains(student.student_id.as_str()))
        .cloned()
        .collect()
}

/// The subset a bulk export writes, in collection order.
pub fn select_students(records: &[Student], student_ids: &[String]) -> Vec<Student> {
    let ids: HashSet<&str> = student_ids.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|student| ids.contains(student.student_id.as_str()))
        .cloned()
        .collect()
}

pub fn next_student_id(records: &[Student]) -> String {
    format!("STU{:04}", records.len() + 1)
}

/// One synthetic record appended to the collection.
pub fn generate_sample<R: Rng>(records: &[Student], rng: &mut R) -> Vec<Student> {
    let student = Student {
        student_id: next_student_id(records),
        name: "Sample Student".to_string(),
        class: "10A".to_string(),
        comprehension: rng.random_range(60.0..100.0),
        attention: rng.random_range(60.0..100.0),
        focus: rng.random_range(60.0..100.0),
        retention: rng.random_range(60.0..100.0),
        assessment_score: rng.random_range(60.0..100.0),
        engagement_time: rng.random_range(40.0..80.0),
    };
    let mut updated = records.to_vec();
    updated.push(student);
    updated
}
