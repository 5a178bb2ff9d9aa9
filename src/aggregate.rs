use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{learning_persona, LearningPersona, Thresholds};
use crate::models::{ClassSummary, Overview, SkillGap, Student, StudentField};
use crate::stats::{self, BucketCount, CorrelationStrength};

/// Per-class rollups in order of first appearance.
pub fn group_by_class(records: &[Student]) -> Vec<ClassSummary> {
    group_by_class_with(records, &Thresholds::default())
}

pub fn group_by_class_with(records: &[Student], thresholds: &Thresholds) -> Vec<ClassSummary> {
    struct Acc {
        count: usize,
        total_score: f64,
        total_engagement: f64,
        high_performers: usize,
        needs_support: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Acc> = HashMap::new();

    for student in records {
        let entry = groups.entry(student.class.as_str()).or_insert_with(|| {
            order.push(student.class.as_str());
            Acc {
                count: 0,
                total_score: 0.0,
                total_engagement: 0.0,
                high_performers: 0,
                needs_support: 0,
            }
        });

        entry.count += 1;
        entry.total_score += student.assessment_score;
        entry.total_engagement += student.engagement_time;
        if thresholds.is_high_performer(student) {
            entry.high_performers += 1;
        }
        if thresholds.needs_support(student) {
            entry.needs_support += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|class| {
            let acc = groups.remove(class)?;
            Some(ClassSummary {
                class: class.to_string(),
                count: acc.count,
                mean_score: acc.total_score / acc.count as f64,
                mean_engagement: acc.total_engagement / acc.count as f64,
                high_performer_count: acc.high_performers,
                needs_support_count: acc.needs_support,
            })
        })
        .collect()
}

/// Column of one numeric field across the collection.
pub fn column(records: &[Student], field: StudentField) -> Vec<f64> {
    records.iter().filter_map(|student| student.numeric(field)).collect()
}

pub fn overview(records: &[Student]) -> Overview {
    overview_with(records, &Thresholds::default())
}

pub fn overview_with(records: &[Student], thresholds: &Thresholds) -> Overview {
    if records.is_empty() {
        return Overview::default();
    }

    let count = |predicate: &dyn Fn(&Student) -> bool| records.iter().filter(|s| predicate(*s)).count();

    Overview {
        total_students: records.len(),
        mean_score: stats::mean(&column(records, StudentField::AssessmentScore)),
        mean_comprehension: stats::mean(&column(records, StudentField::Comprehension)),
        mean_attention: stats::mean(&column(records, StudentField::Attention)),
        mean_engagement: stats::mean(&column(records, StudentField::EngagementTime)),
        high_performers: count(&|s| thresholds.is_high_performer(s)),
        needs_support: count(&|s| thresholds.needs_support(s)),
        at_risk: count(&|s| thresholds.is_at_risk(s)),
    }
}

const SKILLS: [StudentField; 4] = [
    StudentField::Comprehension,
    StudentField::Attention,
    StudentField::Focus,
    StudentField::Retention,
];

pub fn skill_gaps(records: &[Student]) -> Vec<SkillGap> {
    skill_gaps_with(records, &Thresholds::default())
}

pub fn skill_gaps_with(records: &[Student], thresholds: &Thresholds) -> Vec<SkillGap> {
    SKILLS
        .iter()
        .map(|field| {
            let average = stats::mean(&column(records, *field));
            SkillGap {
                skill: field.label(),
                average,
                gap: thresholds.skill_target - average,
                needs_improvement: average < thresholds.skill_warning,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub pair: &'static str,
    pub value: f64,
    pub strength: CorrelationStrength,
}

const CORRELATION_PAIRS: [(&str, StudentField, StudentField); 4] = [
    (
        "Comprehension vs Assessment",
        StudentField::Comprehension,
        StudentField::AssessmentScore,
    ),
    (
        "Attention vs Assessment",
        StudentField::Attention,
        StudentField::AssessmentScore,
    ),
    ("Focus vs Retention", StudentField::Focus, StudentField::Retention),
    (
        "Engagement vs Performance",
        StudentField::EngagementTime,
        StudentField::AssessmentScore,
    ),
];

pub fn correlation_matrix(records: &[Student]) -> Vec<CorrelationPair> {
    CORRELATION_PAIRS
        .iter()
        .map(|(pair, x, y)| {
            let value = stats::pearson_correlation(&column(records, *x), &column(records, *y));
            CorrelationPair {
                pair: *pair,
                value,
                strength: CorrelationStrength::of(value),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaCount {
    pub persona: LearningPersona,
    pub count: usize,
}

pub fn persona_breakdown(records: &[Student]) -> Vec<PersonaCount> {
    let mut counts: HashMap<LearningPersona, usize> = HashMap::new();
    for student in records {
        *counts.entry(learning_persona(student)).or_default() += 1;
    }

    LearningPersona::ALL
        .iter()
        .map(|persona| PersonaCount {
            persona: *persona,
            count: counts.get(persona).copied().unwrap_or(0),
        })
        .collect()
}

pub fn score_distribution(records: &[Student]) -> Vec<BucketCount> {
    stats::histogram(
        &column(records, StudentField::AssessmentScore),
        &stats::score_buckets(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, class: &str, score: f64, engagement: f64) -> Student {
        Student {
            student_id: id.to_string(),
            name: format!("Student {id}"),
            class: class.to_string(),
            comprehension: 70.0,
            attention: 72.0,
            focus: 74.0,
            retention: 76.0,
            assessment_score: score,
            engagement_time: engagement,
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("STU0001", "10B", 82.0, 60.0),
            student("STU0002", "10A", 55.0, 40.0),
            student("STU0003", "10B", 71.0, 80.0),
            student("STU0004", "11A", 91.0, 90.0),
            student("STU0005", "10A", 80.0, 70.0),
        ]
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = group_by_class(&roster());
        let classes: Vec<&str> = groups.iter().map(|g| g.class.as_str()).collect();
        assert_eq!(classes, vec!["10B", "10A", "11A"]);
    }

    #[test]
    fn group_counts_cover_every_record() {
        let records = roster();
        let groups = group_by_class(&records);
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), records.len());

        for group in &groups {
            let scores: Vec<f64> = records
                .iter()
                .filter(|s| s.class == group.class)
                .map(|s| s.assessment_score)
                .collect();
            assert!((group.mean_score - stats::mean(&scores)).abs() < 1e-9);
        }
    }

    #[test]
    fn group_rollups_count_performers_and_support() {
        let groups = group_by_class(&roster());
        let class_a = groups.iter().find(|g| g.class == "10A").unwrap();
        assert_eq!(class_a.count, 2);
        assert_eq!(class_a.high_performer_count, 1);
        assert_eq!(class_a.needs_support_count, 1);
        assert!((class_a.mean_score - 67.5).abs() < 1e-9);
        assert!((class_a.mean_engagement - 55.0).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_has_no_groups_and_zero_overview() {
        assert!(group_by_class(&[]).is_empty());
        assert_eq!(overview(&[]), Overview::default());
    }

    #[test]
    fn overview_counts_thresholds() {
        let summary = overview(&roster());
        assert_eq!(summary.total_students, 5);
        assert!((summary.mean_score - 75.8).abs() < 1e-9);
        assert_eq!(summary.high_performers, 3);
        assert_eq!(summary.needs_support, 1);
        assert_eq!(summary.at_risk, 1);
    }

    #[test]
    fn skill_gaps_measure_distance_to_target() {
        let gaps = skill_gaps(&roster());
        assert_eq!(gaps.len(), 4);
        assert_eq!(gaps[0].skill, "Comprehension");
        assert!((gaps[0].gap - 15.0).abs() < 1e-9);
        assert!(gaps[0].needs_improvement);
        assert!(!gaps[3].needs_improvement);
    }

    #[test]
    fn correlation_matrix_labels_pairs() {
        let pairs = correlation_matrix(&roster());
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[3].pair, "Engagement vs Performance");
        assert!(pairs[3].value > 0.4);
        // comprehension is constant across the roster
        assert_eq!(pairs[0].value, 0.0);
        assert_eq!(pairs[0].strength, CorrelationStrength::Weak);
    }

    #[test]
    fn persona_breakdown_covers_all_personas() {
        let breakdown = persona_breakdown(&roster());
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown.iter().map(|p| p.count).sum::<usize>(), 5);
        assert_eq!(breakdown[1].persona, LearningPersona::FocusedLearner);
        assert_eq!(breakdown[1].count, 0);
    }

    #[test]
    fn distribution_buckets_scores() {
        let counts: Vec<usize> = score_distribution(&roster()).iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 0, 1]);
    }
}
