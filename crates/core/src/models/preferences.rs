use serde::{Deserialize, Serialize};

use super::booking::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    BetterGrades,
    ExamPreparation,
    Homework,
    Olympiad,
    Enrichment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Practical,
    Theoretical,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediately,
    WithinWeeks,
    Flexible,
}

/// Answers collected by the matching wizard. Every field may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPreferences {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    pub learning_style: Option<LearningStyle>,
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub location: Option<Location>,
}
