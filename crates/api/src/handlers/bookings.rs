//! # Booking Handlers
//!
//! Thin HTTP adapters over [`BookingReconciler`]. Every route acts on behalf
//! of the session user; the tutor agenda additionally requires a tutor
//! account.
//!
//! [`BookingReconciler`]: tutorbook_core::reconciler::BookingReconciler

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;
use tutorbook_core::models::booking::{
    Booking, BookingId, CancelBookingRequest, CancelBookingResponse, CreateBookingRequest,
    CreateBookingResponse, LoadedBookings, RescheduleBookingRequest,
};

use crate::{
    ApiState,
    middleware::{
        error_handling::AppError,
        session::{AuthSession, TutorSession},
    },
};

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let response = state.reconciler.create_booking(&user.id, payload).await?;
    info!(
        "User {} booked {} (local only: {})",
        user.id, response.booking.id, response.local_only
    );

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
) -> Result<Json<LoadedBookings>, AppError> {
    let loaded = state.reconciler.load_bookings_for_user(&user.id).await?;
    Ok(Json(loaded))
}

/// Agenda of the signed-in tutor. Past bookings come back completed while the
/// status change is persisted in the background.
#[axum::debug_handler]
pub async fn list_tutor_bookings(
    State(state): State<Arc<ApiState>>,
    session: TutorSession,
) -> Result<Json<LoadedBookings>, AppError> {
    let agenda = state
        .reconciler
        .load_bookings_for_tutor(&session.tutor_id)
        .await?;
    Ok(Json(agenda.bookings))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
    payload: Option<Json<CancelBookingRequest>>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let id = BookingId::from_stored(&id)?;
    let reason = payload.and_then(|Json(request)| request.reason);

    let response = state
        .reconciler
        .cancel_booking(&user.id, &id, reason.as_deref())
        .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn reschedule_booking(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let id = BookingId::from_stored(&id)?;
    let booking = state
        .reconciler
        .reschedule_booking(&user.id, &id, payload)
        .await?;
    Ok(Json(booking))
}
