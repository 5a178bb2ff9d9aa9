//! Text to records and records to text.
//!
//! Fields are split on plain commas: no quoting, no escaping. Names or
//! classes containing a comma will not survive a round trip.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use log::{debug, warn};

use crate::error::{AnalyticsError, Result};
use crate::models::{validate_record, RawRecord, Student, StudentField};

const SAMPLE_CSV: &str = "\
student_id,name,class,comprehension,attention,focus,retention,assessment_score,engagement_time
STU0001,Emma Johnson,10A,75.2,68.4,72.1,78.9,74.3,65.2
STU0002,Liam Smith,10B,82.1,79.3,85.6,81.4,82.8,78.9
STU0003,Olivia Brown,11A,68.9,62.1,59.8,71.2,67.5,58.4
STU0004,Noah Davis,12C,91.3,88.7,92.4,89.6,90.8,89.1
STU0005,Ava Wilson,11B,77.8,74.2,76.9,79.3,77.1,72.6
";

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Reject the whole upload on the first row that fails validation.
    pub strict: bool,
}

/// Lenient parse: every data line becomes a record.
pub fn parse(text: &str) -> Result<Vec<Student>> {
    parse_with(text, &ImportOptions::default())
}

pub fn parse_with(text: &str, options: &ImportOptions) -> Result<Vec<Student>> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let joined = lines.join("\n");

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(joined.as_bytes());

    let columns = header_columns(reader.headers()?);
    if !columns
        .iter()
        .flatten()
        .any(|field| matches!(field, StudentField::StudentId | StudentField::Name))
    {
        return Err(AnalyticsError::MissingHeader);
    }

    let mut students = Vec::with_capacity(lines.len() - 1);
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let raw = raw_record(&columns, &row);
        if row.len() < columns.len() {
            warn!(
                "line {} has {} of {} columns; missing values use defaults",
                index + 2,
                row.len(),
                columns.len()
            );
        }

        if options.strict {
            let student = validate_record(&raw).map_err(|errors| AnalyticsError::InvalidRow {
                line: index + 2,
                errors,
            })?;
            students.push(student);
        } else {
            students.push(Student::coerce(&raw));
        }
    }

    debug!("parsed {} student records", students.len());
    Ok(students)
}

fn header_columns(headers: &StringRecord) -> Vec<Option<StudentField>> {
    headers
        .iter()
        .map(|header| {
            let field = StudentField::from_header(header);
            if field.is_none() {
                debug!("ignoring unknown column `{header}`");
            }
            field
        })
        .collect()
}

fn raw_record(columns: &[Option<StudentField>], row: &StringRecord) -> RawRecord {
    let mut raw = RawRecord::new();
    for (column, value) in columns.iter().zip(row.iter()) {
        if let Some(field) = column {
            raw.set(*field, value);
        }
    }
    raw
}

/// Fixed export header followed by one line per record.
pub fn serialize(records: &[Student]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(StudentField::ALL.iter().map(|field| field.label()))?;
    for student in records {
        writer.write_record(row_values(student))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| AnalyticsError::Csv(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| AnalyticsError::Csv(error.to_string()))
}

fn row_values(student: &Student) -> Vec<String> {
    StudentField::ALL
        .iter()
        .map(|field| match student.text(*field) {
            Some(value) => value.to_string(),
            None => student.numeric(*field).unwrap_or_default().to_string(),
        })
        .collect()
}

/// The sample file offered next to the upload control.
pub fn sample_csv() -> &'static str {
    SAMPLE_CSV
}
