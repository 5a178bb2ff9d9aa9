use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cohort label used when a record carries no class.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// One row of cognitive-performance data for a single learner.
///
/// `engagement_time` is measured in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub class: String,
    pub comprehension: f64,
    pub attention: f64,
    pub focus: f64,
    pub retention: f64,
    pub assessment_score: f64,
    pub engagement_time: f64,
}

impl Student {
    /// Lenient conversion from loosely typed input. Never fails: numeric
    /// fields that are missing or not numeric become 0, a missing class
    /// becomes [`UNKNOWN_CLASS`], missing id and name stay empty.
    pub fn coerce(raw: &RawRecord) -> Self {
        let text = |field: StudentField| raw.get(field).unwrap_or_default().to_string();
        let number = |field: StudentField| raw.get(field).and_then(coerce_number).unwrap_or(0.0);

        let class = match raw.get(StudentField::Class) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNKNOWN_CLASS.to_string(),
        };

        Self {
            student_id: text(StudentField::StudentId),
            name: text(StudentField::Name),
            class,
            comprehension: number(StudentField::Comprehension),
            attention: number(StudentField::Attention),
            focus: number(StudentField::Focus),
            retention: number(StudentField::Retention),
            assessment_score: number(StudentField::AssessmentScore),
            engagement_time: number(StudentField::EngagementTime),
        }
    }

    /// Mean of comprehension, attention, focus and retention.
    pub fn avg_cognitive(&self) -> f64 {
        (self.comprehension + self.attention + self.focus + self.retention) / 4.0
    }

    pub fn numeric(&self, field: StudentField) -> Option<f64> {
        match field {
            StudentField::Comprehension => Some(self.comprehension),
            StudentField::Attention => Some(self.attention),
            StudentField::Focus => Some(self.focus),
            StudentField::Retention => Some(self.retention),
            StudentField::AssessmentScore => Some(self.assessment_score),
            StudentField::EngagementTime => Some(self.engagement_time),
            StudentField::StudentId | StudentField::Name | StudentField::Class => None,
        }
    }

    pub fn text(&self, field: StudentField) -> Option<&str> {
        match field {
            StudentField::StudentId => Some(&self.student_id),
            StudentField::Name => Some(&self.name),
            StudentField::Class => Some(&self.class),
            _ => None,
        }
    }
}

/// The nine fields of a [`Student`], in export column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    StudentId,
    Name,
    Class,
    Comprehension,
    Attention,
    Focus,
    Retention,
    AssessmentScore,
    EngagementTime,
}

impl StudentField {
    pub const ALL: [StudentField; 9] = [
        StudentField::StudentId,
        StudentField::Name,
        StudentField::Class,
        StudentField::Comprehension,
        StudentField::Attention,
        StudentField::Focus,
        StudentField::Retention,
        StudentField::AssessmentScore,
        StudentField::EngagementTime,
    ];

    /// Column name used by uploaded files.
    pub fn key(self) -> &'static str {
        match self {
            StudentField::StudentId => "student_id",
            StudentField::Name => "name",
            StudentField::Class => "class",
            StudentField::Comprehension => "comprehension",
            StudentField::Attention => "attention",
            StudentField::Focus => "focus",
            StudentField::Retention => "retention",
            StudentField::AssessmentScore => "assessment_score",
            StudentField::EngagementTime => "engagement_time",
        }
    }

    /// Column name written by exports.
    pub fn label(self) -> &'static str {
        match self {
            StudentField::StudentId => "Student ID",
            StudentField::Name => "Name",
            StudentField::Class => "Class",
            StudentField::Comprehension => "Comprehension",
            StudentField::Attention => "Attention",
            StudentField::Focus => "Focus",
            StudentField::Retention => "Retention",
            StudentField::AssessmentScore => "Assessment Score",
            StudentField::EngagementTime => "Engagement Time",
        }
    }

    /// Exact, case-sensitive match against either naming.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == header || field.label() == header)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            StudentField::StudentId | StudentField::Name | StudentField::Class
        )
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StudentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_header(s).ok_or_else(|| format!("unknown student field `{s}`"))
    }
}

/// Loosely typed input row: canonical field key to trimmed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    values: HashMap<StudentField, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: StudentField, value: impl Into<String>) {
        self.values.insert(field, value.into().trim().to_string());
    }

    pub fn with(mut self, field: StudentField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: StudentField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

impl From<&Student> for RawRecord {
    fn from(student: &Student) -> Self {
        let mut raw = RawRecord::new();
        for field in StudentField::ALL {
            match student.text(field) {
                Some(value) => raw.set(field, value),
                None => raw.set(field, student.numeric(field).unwrap_or_default().to_string()),
            }
        }
        raw
    }
}

/// Numeric text to a finite number. Blank text counts as zero.
pub fn coerce_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotNumeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: StudentField,
    pub problem: FieldProblem,
}

/// Every field-level failure found while validating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: StudentField) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn push(&mut self, field: StudentField, problem: FieldProblem) {
        self.errors.push(FieldError { field, problem });
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|error| match error.problem {
                FieldProblem::Missing => format!("{} is required", error.field),
                FieldProblem::NotNumeric => format!("{} is not a number", error.field),
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Strict conversion shared by the upload and manual-entry paths.
pub fn validate_record(raw: &RawRecord) -> Result<Student, FieldErrors> {
    let mut errors = FieldErrors::default();

    for field in [StudentField::StudentId, StudentField::Name] {
        if raw.get(field).map_or(true, str::is_empty) {
            errors.push(field, FieldProblem::Missing);
        }
    }

    for field in StudentField::ALL.into_iter().filter(|field| field.is_numeric()) {
        if let Some(value) = raw.get(field) {
            if coerce_number(value).is_none() {
                errors.push(field, FieldProblem::NotNumeric);
            }
        }
    }

    if errors.is_empty() {
        Ok(Student::coerce(raw))
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class: String,
    pub count: usize,
    pub mean_score: f64,
    pub mean_engagement: f64,
    pub high_performer_count: usize,
    pub needs_support_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_students: usize,
    pub mean_score: f64,
    pub mean_comprehension: f64,
    pub mean_attention: f64,
    pub mean_engagement: f64,
    pub high_performers: usize,
    pub needs_support: usize,
    pub at_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGap {
    pub skill: &'static str,
    pub average: f64,
    pub gap: f64,
    pub needs_improvement: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> RawRecord {
        RawRecord::new()
            .with(StudentField::StudentId, "STU0001")
            .with(StudentField::Name, "Emma Johnson")
            .with(StudentField::Class, "10A")
            .with(StudentField::Comprehension, "75.2")
            .with(StudentField::Attention, "68.4")
            .with(StudentField::Focus, "72.1")
            .with(StudentField::Retention, "78.9")
            .with(StudentField::AssessmentScore, "74.3")
            .with(StudentField::EngagementTime, "65.2")
    }

    #[test]
    fn validates_complete_row() {
        let student = validate_record(&full_row()).unwrap();
        assert_eq!(student.student_id, "STU0001");
        assert_eq!(student.class, "10A");
        assert_eq!(student.assessment_score, 74.3);
        assert_eq!(student.engagement_time, 65.2);
    }

    #[test]
    fn missing_id_and_name_are_reported() {
        let raw = RawRecord::new().with(StudentField::Focus, "70");
        let errors = validate_record(&raw).unwrap_err();
        assert!(errors.has(StudentField::StudentId));
        assert!(errors.has(StudentField::Name));
        assert_eq!(errors.errors.len(), 2);
        assert_eq!(errors.to_string(), "student_id is required, name is required");
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let raw = full_row().with(StudentField::Name, "   ");
        let errors = validate_record(&raw).unwrap_err();
        assert!(errors.has(StudentField::Name));
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let raw = RawRecord::new()
            .with(StudentField::StudentId, "STU0009")
            .with(StudentField::Name, "Kai");
        let student = validate_record(&raw).unwrap();
        assert_eq!(student.class, UNKNOWN_CLASS);
        assert_eq!(student.comprehension, 0.0);
        assert_eq!(student.engagement_time, 0.0);
    }

    #[test]
    fn lenient_coercion_zeroes_non_numeric_values() {
        let raw = full_row().with(StudentField::Focus, "n/a");
        assert!(validate_record(&raw).unwrap_err().has(StudentField::Focus));
        let student = Student::coerce(&raw);
        assert_eq!(student.focus, 0.0);
        assert_eq!(student.retention, 78.9);
    }

    #[test]
    fn coerce_number_rejects_non_finite_spellings() {
        assert_eq!(coerce_number("42.5"), Some(42.5));
        assert_eq!(coerce_number(""), Some(0.0));
        assert_eq!(coerce_number("1e2"), Some(100.0));
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number("ten"), None);
    }

    #[test]
    fn headers_match_both_namings_exactly() {
        assert_eq!(StudentField::from_header("assessment_score"), Some(StudentField::AssessmentScore));
        assert_eq!(StudentField::from_header("Assessment Score"), Some(StudentField::AssessmentScore));
        assert_eq!(StudentField::from_header("Student_ID"), None);
        assert_eq!("focus".parse::<StudentField>(), Ok(StudentField::Focus));
    }

    #[test]
    fn avg_cognitive_uses_four_skills() {
        let student = Student::coerce(&full_row());
        let expected = (75.2 + 68.4 + 72.1 + 78.9) / 4.0;
        assert!((student.avg_cognitive() - expected).abs() < 1e-9);
    }
}
