//! # Availability Resolver
//!
//! Turns a tutor's recurring weekly table into concrete slots for a calendar
//! date, and ranks tutors against the answers of the matching wizard.
//!
//! Everything here is a pure function over the data it is handed.
//!
//! ## Scoring
//!
//! | criterion | points |
//! |---|---|
//! | teaches a selected subject | 50 |
//! | speaks the preferred languages | up to 30, proportional |
//! | olympiad goal and competition record | 20 |

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::{
    errors::{BookingError, BookingResult},
    models::{
        booking::Location,
        preferences::{Goal, MatchingPreferences},
        slot::{SlotTime, Weekday},
        tutor::{RankedTutor, Tutor},
    },
};

pub const SUBJECT_SCORE: u32 = 50;
pub const LANGUAGE_SCORE: u32 = 30;
pub const COMPETITION_SCORE: u32 = 20;

/// First and last hour of the grid offered by tutors without a per-day table.
const LEGACY_FIRST_HOUR: u32 = 9;
const LEGACY_LAST_HOUR: u32 = 19;

const COMPETITION_KEYWORDS: &[&str] = &[
    "olympiad",
    "olympiade",
    "wettbewerb",
    "competition",
    "contest",
    "känguru",
    "jugend forscht",
];

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_booking_date(input: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("Invalid date: {:?}", input)))
}

pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> BookingResult<()> {
    if date < today {
        return Err(BookingError::Validation(format!(
            "Date {} lies in the past",
            date
        )));
    }
    Ok(())
}

/// The universal hourly grid, 09:00 through 19:00.
pub fn legacy_slots() -> Vec<SlotTime> {
    (LEGACY_FIRST_HOUR..=LEGACY_LAST_HOUR)
        .filter_map(|hour| SlotTime::new(hour, 0))
        .collect()
}

/// Slots offered by `tutor` on `date`, ascending.
///
/// A weekday missing from the tutor's table yields no slots. Only tutors
/// without any table fall back to the legacy grid.
pub fn resolve_slots_for_date(tutor: &Tutor, date: NaiveDate) -> Vec<SlotTime> {
    match &tutor.availability {
        Some(table) => table
            .times_for(Weekday::from(date.weekday()))
            .map(|times| times.iter().copied().collect())
            .unwrap_or_default(),
        None => legacy_slots(),
    }
}

/// String form of [`resolve_slots_for_date`] that validates the date first.
pub fn resolve_times_for_date(tutor: &Tutor, date: &str) -> BookingResult<Vec<String>> {
    let date = parse_booking_date(date)?;
    Ok(resolve_slots_for_date(tutor, date)
        .into_iter()
        .map(|slot| slot.to_string())
        .collect())
}

/// Filters and orders `tutors` by how well they fit `preferences`.
///
/// The result keeps catalog order among equal scores. An empty result means
/// nobody teaches the requested subject; callers must not widen the filter.
pub fn rank_tutors(tutors: &[Tutor], preferences: &MatchingPreferences) -> Vec<RankedTutor> {
    let subjects: Vec<String> = preferences
        .subjects
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut ranked: Vec<RankedTutor> = tutors
        .iter()
        .filter(|tutor| subjects.is_empty() || teaches_any(tutor, &subjects))
        .filter(|tutor| !(preferences.location == Some(Location::InPerson) && tutor.online_only))
        .map(|tutor| RankedTutor {
            tutor: tutor.clone(),
            score: score_tutor(tutor, &subjects, preferences),
        })
        .collect();

    // Vec::sort_by is stable.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn score_tutor(tutor: &Tutor, subjects: &[String], preferences: &MatchingPreferences) -> u32 {
    let mut score = 0;

    if !subjects.is_empty() && teaches_any(tutor, subjects) {
        score += SUBJECT_SCORE;
    }

    let wanted: BTreeSet<String> = preferences
        .languages
        .iter()
        .map(|l| normalize_language(l))
        .filter(|l| !l.is_empty())
        .collect();
    if !wanted.is_empty() {
        let spoken: BTreeSet<String> = tutor.languages.iter().map(|l| normalize_language(l)).collect();
        let shared = wanted.intersection(&spoken).count() as u32;
        score += LANGUAGE_SCORE * shared / wanted.len() as u32;
    }

    if preferences.goals.contains(&Goal::Olympiad) && has_competition_record(tutor) {
        score += COMPETITION_SCORE;
    }

    score
}

fn teaches_any(tutor: &Tutor, subjects: &[String]) -> bool {
    tutor.subjects.iter().any(|taught| {
        let taught = taught.to_lowercase();
        subjects.iter().any(|wanted| taught.contains(wanted.as_str()))
    })
}

fn has_competition_record(tutor: &Tutor) -> bool {
    let text = tutor.achievements.to_lowercase();
    COMPETITION_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Maps language names (English or German) and ISO codes onto the ISO code.
pub fn normalize_language(language: &str) -> String {
    let language = language.trim().to_lowercase();
    let code = match language.as_str() {
        "en" | "english" | "englisch" => "en",
        "de" | "german" | "deutsch" => "de",
        "fr" | "french" | "französisch" | "franzoesisch" => "fr",
        "es" | "spanish" | "spanisch" => "es",
        "it" | "italian" | "italienisch" => "it",
        "tr" | "turkish" | "türkisch" | "tuerkisch" => "tr",
        "ru" | "russian" | "russisch" => "ru",
        "ar" | "arabic" | "arabisch" => "ar",
        "pl" | "polish" | "polnisch" => "pl",
        "uk" | "ukrainian" | "ukrainisch" => "uk",
        "zh" | "chinese" | "chinesisch" => "zh",
        _ => return language,
    };
    code.to_string()
}
