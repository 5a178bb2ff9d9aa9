use serde::Serialize;

use crate::models::Student;

/// Cut-offs shared by the at-risk flag and the cohort rollups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub risk_score: f64,
    pub risk_cognitive: f64,
    pub risk_engagement: f64,
    pub high_performer_score: f64,
    pub needs_support_score: f64,
    pub skill_target: f64,
    pub skill_warning: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            risk_score: 65.0,
            risk_cognitive: 65.0,
            risk_engagement: 50.0,
            high_performer_score: 80.0,
            needs_support_score: 60.0,
            skill_target: 85.0,
            skill_warning: 75.0,
        }
    }
}

impl Thresholds {
    pub fn is_high_performer(&self, student: &Student) -> bool {
        student.assessment_score >= self.high_performer_score
    }

    pub fn needs_support(&self, student: &Student) -> bool {
        student.assessment_score < self.needs_support_score
    }

    pub fn risk_concerns(&self, student: &Student) -> Vec<RiskConcern> {
        let mut concerns = Vec::new();
        if student.assessment_score < self.risk_score {
            concerns.push(RiskConcern::LowScore);
        }
        if student.avg_cognitive() < self.risk_cognitive {
            concerns.push(RiskConcern::LowCognitive);
        }
        if student.engagement_time < self.risk_engagement {
            concerns.push(RiskConcern::LowEngagement);
        }
        concerns
    }

    pub fn is_at_risk(&self, student: &Student) -> bool {
        !self.risk_concerns(student).is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceTier {
    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Lower bounds are inclusive: 85 is Excellent, 84.99 is Good.
pub fn performance_tier(score: f64) -> PerformanceTier {
    match score {
        s if s >= 85.0 => PerformanceTier::Excellent,
        s if s >= 75.0 => PerformanceTier::Good,
        s if s >= 65.0 => PerformanceTier::Average,
        _ => PerformanceTier::NeedsImprovement,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LearningPersona {
    HighAchiever,
    FocusedLearner,
    EngagedStruggler,
    DevelopingStudent,
}

impl LearningPersona {
    pub const ALL: [LearningPersona; 4] = [
        LearningPersona::HighAchiever,
        LearningPersona::FocusedLearner,
        LearningPersona::EngagedStruggler,
        LearningPersona::DevelopingStudent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LearningPersona::HighAchiever => "High Achiever",
            LearningPersona::FocusedLearner => "Focused Learner",
            LearningPersona::EngagedStruggler => "Engaged Struggler",
            LearningPersona::DevelopingStudent => "Developing Student",
        }
    }
}

/// First matching rule wins.
pub fn learning_persona(student: &Student) -> LearningPersona {
    if student.assessment_score >= 85.0 && student.avg_cognitive() >= 80.0 {
        LearningPersona::HighAchiever
    } else if student.focus >= 75.0 && student.attention >= 70.0 {
        LearningPersona::FocusedLearner
    } else if student.engagement_time >= 70.0 {
        LearningPersona::EngagedStruggler
    } else {
        LearningPersona::DevelopingStudent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskConcern {
    LowScore,
    LowCognitive,
    LowEngagement,
}

impl RiskConcern {
    pub fn label(self) -> &'static str {
        match self {
            RiskConcern::LowScore => "Low scores",
            RiskConcern::LowCognitive => "Low cognitive skills",
            RiskConcern::LowEngagement => "Low engagement",
        }
    }
}

pub fn is_at_risk(student: &Student) -> bool {
    Thresholds::default().is_at_risk(student)
}

pub fn risk_concerns(student: &Student) -> Vec<RiskConcern> {
    Thresholds::default().risk_concerns(student)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub warning: bool,
    pub title: &'static str,
    pub description: &'static str,
}

/// Per-student advice on attention, retention and engagement.
pub fn recommendations(student: &Student) -> Vec<Recommendation> {
    let advise = |warning: bool, weak: (&'static str, &'static str), strong: (&'static str, &'static str)| {
        let (title, description) = if warning { weak } else { strong };
        Recommendation {
            warning,
            title,
            description,
        }
    };

    vec![
        advise(
            student.attention < 70.0,
            (
                "Attention Enhancement",
                "Consider shorter study sessions with frequent breaks to improve attention span.",
            ),
            (
                "Strong Attention Skills",
                "Excellent attention skills. Continue with current learning strategies.",
            ),
        ),
        advise(
            student.retention < 75.0,
            (
                "Memory Improvement",
                "Implement spaced repetition and active recall techniques to boost retention.",
            ),
            (
                "Good Retention",
                "Strong retention abilities. Consider peer tutoring opportunities.",
            ),
        ),
        advise(
            student.engagement_time < 65.0,
            (
                "Engagement Boost",
                "Introduce more interactive and hands-on learning activities.",
            ),
            (
                "High Engagement",
                "Excellent engagement levels. Consider advanced or enrichment activities.",
            ),
        ),
    ]
}
