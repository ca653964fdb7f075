//! # Tutor Handlers
//!
//! Bookable times for a date, tutor matching and the weekly availability
//! tables tutors maintain from their dashboard.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tutorbook_core::{
    availability::{rank_tutors, resolve_times_for_date},
    errors::BookingError,
    models::{
        preferences::MatchingPreferences,
        slot::WeeklyAvailability,
        tutor::{RankedTutor, Tutor},
    },
};

use crate::{ApiState, middleware::{error_handling::AppError, session::TutorSession}};

#[derive(Debug, Deserialize)]
pub struct TimesQuery {
    /// Calendar date as `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimesResponse {
    pub tutor_id: String,
    pub date: String,
    pub times: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub tutor_id: String,
    pub availability: WeeklyAvailability,
    /// True while the tutor has no table and the fixed daily grid applies.
    pub legacy_grid: bool,
}

impl From<Tutor> for AvailabilityResponse {
    fn from(tutor: Tutor) -> Self {
        let legacy_grid = tutor.availability.is_none();
        Self {
            tutor_id: tutor.id,
            availability: tutor.availability.unwrap_or_default(),
            legacy_grid,
        }
    }
}

/// Bookable start times of a tutor on one date
///
/// # Endpoint
///
/// ```text
/// GET /api/tutors/:id/times?date=2030-03-04
/// ```
#[axum::debug_handler]
pub async fn get_times(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<String>,
    Query(query): Query<TimesQuery>,
) -> Result<Json<TimesResponse>, AppError> {
    let tutor = state.directory.get(&tutor_id).await?;
    let times = resolve_times_for_date(&tutor, &query.date)?;

    Ok(Json(TimesResponse {
        tutor_id,
        date: query.date,
        times,
    }))
}

/// Tutors fitting the preferences, best match first. An empty list means
/// nobody teaches the requested subjects.
#[axum::debug_handler]
pub async fn match_tutors(
    State(state): State<Arc<ApiState>>,
    Json(preferences): Json<MatchingPreferences>,
) -> Json<Vec<RankedTutor>> {
    let tutors = state.directory.all().await;
    Json(rank_tutors(&tutors, &preferences))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let tutor = state.directory.get(&tutor_id).await?;
    Ok(Json(tutor.into()))
}

/// Replaces the whole weekly table of the signed-in tutor.
#[axum::debug_handler]
pub async fn put_availability(
    State(state): State<Arc<ApiState>>,
    session: TutorSession,
    Path(tutor_id): Path<String>,
    Json(table): Json<WeeklyAvailability>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if session.tutor_id != tutor_id {
        return Err(BookingError::Policy("Tutors can only edit their own availability".to_string()).into());
    }

    let saved = state.directory.save_availability(&tutor_id, table).await?;

    Ok(Json(AvailabilityResponse {
        tutor_id,
        legacy_grid: false,
        availability: saved,
    }))
}
