use std::fmt::Write;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate;
use crate::classify::{self, Thresholds};
use crate::error::Result;
use crate::insights;
use crate::models::{Student, StudentField};
use crate::query::{self, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Overview,
    Individual,
    ClassAnalysis,
    Correlations,
    Recommendations,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Overview,
        ReportKind::Individual,
        ReportKind::ClassAnalysis,
        ReportKind::Correlations,
        ReportKind::Recommendations,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ReportKind::Overview => "overview",
            ReportKind::Individual => "individual",
            ReportKind::ClassAnalysis => "class-analysis",
            ReportKind::Correlations => "correlations",
            ReportKind::Recommendations => "recommendations",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Overview => "Performance Overview",
            ReportKind::Individual => "Individual Student Reports",
            ReportKind::ClassAnalysis => "Class Analysis",
            ReportKind::Correlations => "Correlation Analysis",
            ReportKind::Recommendations => "Recommendations Report",
        }
    }

    pub fn estimated_pages(self, student_count: usize) -> usize {
        match self {
            ReportKind::Overview => 2,
            ReportKind::Individual => student_count * 2,
            ReportKind::ClassAnalysis => 3,
            ReportKind::Correlations => 2,
            ReportKind::Recommendations => 4,
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown report `{s}`"))
    }
}

pub fn estimated_pages(kinds: &[ReportKind], student_count: usize) -> usize {
    kinds.iter().map(|kind| kind.estimated_pages(student_count)).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub total_students: usize,
    pub average_score: f64,
    pub high_performers: usize,
    pub needs_support: usize,
    pub at_risk: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub summary: ExportSummary,
    pub students: Vec<Student>,
    pub selected_reports: Vec<ReportKind>,
    pub export_format: ExportFormat,
}

impl ExportReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn build_export(
    records: &[Student],
    selected: &[ReportKind],
    format: ExportFormat,
    generated_at: DateTime<Utc>,
    thresholds: &Thresholds,
) -> ExportReport {
    let overview = aggregate::overview_with(records, thresholds);
    ExportReport {
        summary: ExportSummary {
            total_students: overview.total_students,
            average_score: overview.mean_score,
            high_performers: overview.high_performers,
            needs_support: overview.needs_support,
            at_risk: overview.at_risk,
            generated_at,
        },
        students: records.to_vec(),
        selected_reports: selected.to_vec(),
        export_format: format,
    }
}

pub fn build_markdown_report(
    records: &[Student],
    selected: &[ReportKind],
    generated_at: DateTime<Utc>,
    thresholds: &Thresholds,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Performance Report");
    let _ = writeln!(
        output,
        "Generated {} for {} students ({} estimated pages)",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        records.len(),
        estimated_pages(selected, records.len())
    );

    for kind in selected {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", kind.title());
        if records.is_empty() {
            let _ = writeln!(output, "No student data loaded.");
            continue;
        }
        match kind {
            ReportKind::Overview => write_overview(&mut output, records, thresholds),
            ReportKind::Individual => write_individuals(&mut output, records),
            ReportKind::ClassAnalysis => write_classes(&mut output, records, thresholds),
            ReportKind::Correlations => write_correlations(&mut output, records),
            ReportKind::Recommendations => write_recommendations(&mut output, records, thresholds),
        }
    }

    output
}

fn write_overview(output: &mut String, records: &[Student], thresholds: &Thresholds) {
    let overview = aggregate::overview_with(records, thresholds);
    let _ = writeln!(output, "- Total students: {}", overview.total_students);
    let _ = writeln!(output, "- Average score: {:.1}", overview.mean_score);
    let _ = writeln!(output, "- Average comprehension: {:.1}", overview.mean_comprehension);
    let _ = writeln!(output, "- Average attention: {:.1}", overview.mean_attention);
    let _ = writeln!(output, "- Average engagement: {:.1} min", overview.mean_engagement);
    let _ = writeln!(output, "- High performers: {}", overview.high_performers);
    let _ = writeln!(output, "- Needs support: {}", overview.needs_support);
    let _ = writeln!(output, "- At risk: {}", overview.at_risk);

    let _ = writeln!(output);
    let _ = writeln!(output, "### Score Distribution");
    for bucket in aggregate::score_distribution(records) {
        let _ = writeln!(output, "- {}: {}", bucket.label, bucket.count);
    }
}

fn write_individuals(output: &mut String, records: &[Student]) {
    let ranked = query::filter_and_sort(records, "", StudentField::AssessmentScore, SortDirection::Desc);
    for student in &ranked {
        let _ = writeln!(
            output,
            "- {} ({}, {}) score {:.1}: {}, {}",
            student.name,
            student.student_id,
            student.class,
            student.assessment_score,
            classify::performance_tier(student.assessment_score).label(),
            classify::learning_persona(student).label()
        );
    }
}

fn write_classes(output: &mut String, records: &[Student], thresholds: &Thresholds) {
    for group in aggregate::group_by_class_with(records, thresholds) {
        let _ = writeln!(
            output,
            "- {}: {} students, avg score {:.1}, avg engagement {:.1} min, {} high performers, {} need support",
            group.class,
            group.count,
            group.mean_score,
            group.mean_engagement,
            group.high_performer_count,
            group.needs_support_count
        );
    }
}

fn write_correlations(output: &mut String, records: &[Student]) {
    for pair in aggregate::correlation_matrix(records) {
        let _ = writeln!(
            output,
            "- {}: {:.3} ({} correlation)",
            pair.pair,
            pair.value,
            pair.strength.label()
        );
    }
}

fn write_recommendations(output: &mut String, records: &[Student], thresholds: &Thresholds) {
    for insight in insights::insights(records, thresholds) {
        let _ = writeln!(output, "- {} ({}): {}", insight.title, insight.value, insight.description);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Skill Gaps");
    for gap in aggregate::skill_gaps_with(records, thresholds) {
        let _ = writeln!(
            output,
            "- {}: avg {:.1}, gap {:.1}{}",
            gap.skill,
            gap.average,
            gap.gap,
            if gap.needs_improvement { " (needs improvement)" } else { "" }
        );
    }

    let at_risk: Vec<&Student> = records.iter().filter(|s| thresholds.is_at_risk(s)).collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "### Students Requiring Attention");
    if at_risk.is_empty() {
        let _ = writeln!(output, "No students are currently at risk.");
    } else {
        for student in at_risk {
            let concerns: Vec<&str> = thresholds
                .risk_concerns(student)
                .iter()
                .map(|concern| concern.label())
                .collect();
            let _ = writeln!(
                output,
                "- {} ({}) score {:.1}, engagement {:.1} min: {}",
                student.name,
                student.class,
                student.assessment_score,
                student.engagement_time,
                concerns.join(", ")
            );
        }
    }
}
