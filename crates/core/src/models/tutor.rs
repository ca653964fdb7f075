use serde::{Deserialize, Serialize};

use super::slot::WeeklyAvailability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: String,
    pub name: String,
    pub subjects: Vec<String>,
    pub languages: Vec<String>,
    /// Hourly rate in euro cents.
    pub hourly_rate: u32,
    pub achievements: String,
    #[serde(default)]
    pub online_only: bool,
    /// `None` means the tutor predates per-day tables and offers the
    /// universal hourly grid.
    #[serde(default)]
    pub availability: Option<WeeklyAvailability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTutor {
    #[serde(flatten)]
    pub tutor: Tutor,
    pub score: u32,
}
