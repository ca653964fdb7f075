//! # Booking State Reconciler
//!
//! Creates, cancels and reschedules bookings against the scheduling provider
//! and the structured store, with the local cache mirror as interim record.
//!
//! Per-booking state machine:
//!
//! ```text
//! created -> scheduled -> completed   (automatic, once the start has passed)
//!                      -> cancelled   (user)
//!                      -> scheduled   (user reschedule, same identity)
//! ```
//!
//! Which failures reach the caller:
//!
//! | operation | scheduling provider fails | store fails |
//! |---|---|---|
//! | create | error, except "no host" which degrades to a local-only booking | warning |
//! | cancel | warning | warning; unknown to both tiers is `NotFound` |
//!
//! Cancel and reschedule only reach the scheduling provider for bookings the
//! caller owns.
//! | reschedule | error | warning |

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    availability::{ensure_not_past, parse_booking_date, resolve_slots_for_date},
    catalog,
    directory::TutorDirectory,
    errors::{BookingError, BookingResult},
    models::{
        booking::{
            Booking, BookingId, BookingStatus, CancelBookingResponse, CreateBookingRequest,
            CreateBookingResponse, LoadedBookings, RescheduleBookingRequest,
        },
        slot::SlotTime,
        tutor::Tutor,
    },
    ports::{BookingRepository, ScheduleRequest, SchedulingProvider},
    repositories::MirroredBookingRepository,
    sync::{SyncTier, SyncWarning, WarningSink},
};

const DEFAULT_CANCEL_REASON: &str = "Cancelled by customer";

#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// Event type bookings are placed on at the scheduling provider.
    pub event_type_id: Option<i64>,
    /// Zone in which booking dates and times are expressed.
    pub time_zone: Tz,
    pub locale: String,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            event_type_id: None,
            time_zone: chrono_tz::Europe::Berlin,
            locale: "de".to_string(),
        }
    }
}

/// Bookings shown on a tutor dashboard.
#[derive(Debug)]
pub struct TutorAgenda {
    pub bookings: LoadedBookings,
    /// Background persistence of automatic completions, if any were made.
    /// Dropping the handle detaches the task.
    pub write_back: Option<JoinHandle<()>>,
}

/// Runs the booking lifecycle across the scheduling provider, the
/// structured store and the local cache mirror.
///
/// The provider decides whether a slot is really taken; the two storage
/// tiers are reached through one [`MirroredBookingRepository`], whose
/// failures arrive as [`SyncWarning`]s on the shared sink rather than as
/// errors.
pub struct BookingReconciler {
    scheduler: Arc<dyn SchedulingProvider>,
    bookings: Arc<MirroredBookingRepository>,
    directory: Arc<TutorDirectory>,
    settings: ReconcilerSettings,
    warnings: WarningSink,
}

impl BookingReconciler {
    /// # Arguments
    ///
    /// * `scheduler` - Scheduling provider that owns the real calendar
    /// * `bookings` - Store and cache mirror
    /// * `directory` - Tutor profiles and weekly availability
    /// * `settings` - Event type, time zone and locale sent to the provider
    /// * `warnings` - Sink for provider failures that do not fail the call
    pub fn new(
        scheduler: Arc<dyn SchedulingProvider>,
        bookings: Arc<MirroredBookingRepository>,
        directory: Arc<TutorDirectory>,
        settings: ReconcilerSettings,
        warnings: WarningSink,
    ) -> Self {
        Self {
            scheduler,
            bookings,
            directory,
            settings,
            warnings,
        }
    }

    fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.settings.time_zone).naive_local()
    }

    fn to_utc(&self, date: NaiveDate, time: SlotTime) -> BookingResult<DateTime<Utc>> {
        let local = date.and_time(time.as_naive());
        self.settings
            .time_zone
            .from_local_datetime(&local)
            .earliest()
            .map(|start| start.with_timezone(&Utc))
            .ok_or_else(|| {
                BookingError::Validation(format!("{} {} does not exist in {}", date, time, self.settings.time_zone))
            })
    }

    /// Parses and checks a requested slot against the tutor's table.
    fn validate_slot(
        &self,
        tutor: &Tutor,
        date: &str,
        time: &str,
    ) -> BookingResult<(NaiveDate, SlotTime)> {
        let date = parse_booking_date(date)?;
        ensure_not_past(date, self.local_now().date())?;
        let time: SlotTime = time.parse()?;
        if !resolve_slots_for_date(tutor, date).contains(&time) {
            return Err(BookingError::Validation(format!(
                "{} does not offer {} on {}",
                tutor.name, time, date
            )));
        }
        Ok((date, time))
    }

    /// Books a tutor slot for `user_id`.
    ///
    /// The request is validated (subject, contact, package, and a date and
    /// time the tutor offers that is not in the past) before the scheduling
    /// provider is asked for the slot. Trial packages are refused when the
    /// store already holds a booking of this user. A provider that reports no
    /// available host yields a local-only booking instead of an error. The
    /// booking is then written to both tiers; a tier failing is a warning.
    ///
    /// # Returns
    ///
    /// * `CreateBookingResponse` - The stored booking and whether it is local only
    ///
    /// # Errors
    ///
    /// * `Validation` - Malformed request or a slot the tutor does not offer
    /// * `NotFound` - Unknown tutor or package
    /// * `Policy` - Trial requested by a returning customer
    /// * `RemoteService` - Provider rejection, or trial eligibility unverifiable
    ///
    /// # Example
    ///
    /// ```ignore
    /// let created = reconciler.create_booking("parent-1", request).await?;
    /// if created.local_only {
    ///     warn!("{} is not yet confirmed by the scheduling provider", created.booking.id);
    /// }
    /// ```
    pub async fn create_booking(
        &self,
        user_id: &str,
        request: CreateBookingRequest,
    ) -> BookingResult<CreateBookingResponse> {
        if request.subject.trim().is_empty() {
            return Err(BookingError::Validation("Subject is required".to_string()));
        }
        if request.contact.name.trim().is_empty() || !request.contact.email.contains('@') {
            return Err(BookingError::Validation(
                "Contact name and a valid email are required".to_string(),
            ));
        }

        let tutor = self.directory.get(&request.tutor_id).await?;
        let package = catalog::package(&request.package_id)?;
        let (date, time) = self.validate_slot(&tutor, &request.date, &request.time)?;

        if package.trial {
            let existing = self.bookings.count_for_user(user_id).await.map_err(|e| {
                error!("Trial eligibility check failed for {}: {}", user_id, e);
                BookingError::RemoteService("Could not verify trial eligibility".to_string())
            })?;
            if existing > 0 {
                return Err(BookingError::Policy(
                    "The trial offer is restricted to first-time customers".to_string(),
                ));
            }
        }

        let schedule = ScheduleRequest {
            event_type_id: self.settings.event_type_id,
            start: self.to_utc(date, time)?,
            name: request.contact.name.clone(),
            email: request.contact.email.clone(),
            notes: provider_notes(&tutor, &request, &package.name),
            time_zone: self.settings.time_zone.name().to_string(),
            locale: self.settings.locale.clone(),
        };

        let id = match self.scheduler.create_booking(&schedule).await {
            Ok(scheduled) => {
                info!("Scheduled booking {} with {}", scheduled.id, tutor.id);
                BookingId::Remote(scheduled.id)
            }
            Err(e) if e.is_no_available_host() => {
                let id = BookingId::new_local();
                warn!("Scheduling provider has no host for {}, keeping {} local only: {}", tutor.id, id, e);
                id
            }
            Err(e) => {
                error!("Scheduling provider rejected booking for {}: {}", user_id, e);
                return Err(e.into());
            }
        };

        let now = Utc::now();
        let booking = Booking {
            id,
            user_id: user_id.to_string(),
            tutor_id: tutor.id.clone(),
            tutor_name: tutor.name.clone(),
            subject: request.subject,
            package_id: package.id,
            date,
            time,
            location: request.location,
            contact: request.contact,
            notes: request.notes,
            status: BookingStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        // The slot is secured at this point; persistence failures are warnings.
        if let Err(e) = self.bookings.insert(&booking).await {
            debug!("Booking {} not persisted on any tier: {}", booking.id, e);
        }

        let local_only = booking.is_local_only();
        Ok(CreateBookingResponse {
            booking,
            local_only,
        })
    }

    /// Cancels a booking owned by `user_id`.
    ///
    /// The cancellation is recorded locally whatever the scheduling provider
    /// answers; `remote_notified` is for diagnostics only. The provider is
    /// only contacted once the booking is known to belong to the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when neither tier holds the booking for this owner.
    /// When both tiers are unreachable ownership cannot be established, so
    /// the provider is skipped and the call still succeeds.
    pub async fn cancel_booking(
        &self,
        user_id: &str,
        id: &BookingId,
        reason: Option<&str>,
    ) -> BookingResult<CancelBookingResponse> {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_CANCEL_REASON);

        let owned = match self.bookings.find(user_id, id).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                return Err(BookingError::NotFound(format!("Booking {} not found", id)));
            }
            Err(e) => {
                warn!("Ownership of {} unverifiable, skipping scheduling provider: {}", id, e);
                false
            }
        };

        let remote_notified = match id {
            BookingId::Remote(remote_id) if owned => {
                match self.scheduler.cancel_booking(remote_id, reason).await {
                    Ok(()) => true,
                    Err(e) => {
                        self.warnings
                            .report(SyncWarning::new(SyncTier::Scheduling, "cancel", remote_id.as_str(), e));
                        false
                    }
                }
            }
            _ => false,
        };

        match self
            .bookings
            .update_status(user_id, id, BookingStatus::Cancelled)
            .await
        {
            Ok(true) => info!("Booking {} cancelled", id),
            Ok(false) => debug!("Booking {} not found while cancelling", id),
            Err(e) => debug!("Cancellation of {} not persisted on any tier: {}", id, e),
        }

        Ok(CancelBookingResponse {
            id: id.clone(),
            status: BookingStatus::Cancelled,
            remote_notified,
        })
    }

    /// Moves a booking owned by `user_id` to a new date and time.
    ///
    /// Local-only bookings never reach the scheduling provider. Unlike
    /// cancellation, a provider failure here is a hard error: an unconfirmed
    /// move could leave the old slot booked as well.
    ///
    /// # Errors
    ///
    /// * `NotFound` - The caller owns no booking with this id
    /// * `Validation` - The tutor does not offer the new slot
    /// * `RemoteService` - The provider rejected the move
    pub async fn reschedule_booking(
        &self,
        user_id: &str,
        id: &BookingId,
        request: RescheduleBookingRequest,
    ) -> BookingResult<Booking> {
        let mut booking = self
            .bookings
            .find(user_id, id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking {} not found", id)))?;
        let tutor = self.directory.get(&booking.tutor_id).await?;
        let (date, time) = self.validate_slot(&tutor, &request.date, &request.time)?;

        if let BookingId::Remote(remote_id) = id {
            let start = self.to_utc(date, time)?;
            self.scheduler
                .reschedule_booking(remote_id, start, self.settings.time_zone.name())
                .await
                .map_err(|e| {
                    error!("Scheduling provider rejected reschedule of {}: {}", remote_id, e);
                    BookingError::from(e)
                })?;
        } else {
            debug!("Booking {} is local only, skipping scheduling provider", id);
        }

        if let Err(e) = self.bookings.update_schedule(user_id, id, date, time).await {
            debug!("Reschedule of {} not persisted on any tier: {}", id, e);
        }

        booking.date = date;
        booking.time = time;
        booking.status = BookingStatus::Scheduled;
        booking.updated_at = Utc::now();
        Ok(booking)
    }

    /// Bookings of `user_id` in start order, from the store when it answers
    /// and from the cache otherwise. `source` tells which.
    pub async fn load_bookings_for_user(&self, user_id: &str) -> BookingResult<LoadedBookings> {
        let mut loaded = self.bookings.load_for_user(user_id).await?;
        loaded.bookings.sort_by_key(Booking::starts_at);
        Ok(loaded)
    }

    /// Loads the tutor's bookings and completes the ones whose start has
    /// passed. The returned list already shows them completed; persisting the
    /// change runs in the background and reports through the warning sink.
    pub async fn load_bookings_for_tutor(&self, tutor_id: &str) -> BookingResult<TutorAgenda> {
        let mut loaded = self.bookings.load_for_tutor(tutor_id).await?;
        loaded.bookings.sort_by_key(Booking::starts_at);

        let now = self.local_now();
        let completed: Vec<(String, BookingId)> = loaded
            .bookings
            .iter_mut()
            .filter_map(|b| b.complete_if_past(now).then(|| (b.user_id.clone(), b.id.clone())))
            .collect();

        let write_back = if completed.is_empty() {
            None
        } else {
            let bookings = Arc::clone(&self.bookings);
            Some(tokio::spawn(async move {
                for (owner, id) in completed {
                    match bookings
                        .update_status(&owner, &id, BookingStatus::Completed)
                        .await
                    {
                        Ok(_) => debug!("Booking {} marked completed", id),
                        Err(e) => debug!("Completion of {} not persisted on any tier: {}", id, e),
                    }
                }
            }))
        };

        Ok(TutorAgenda {
            bookings: loaded,
            write_back,
        })
    }
}

fn provider_notes(tutor: &Tutor, request: &CreateBookingRequest, package_name: &str) -> String {
    let mut notes = format!(
        "Tutor: {}\nSubject: {}\nPackage: {}\nLocation: {}",
        tutor.name,
        request.subject,
        package_name,
        request.location.as_str()
    );
    if let Some(phone) = request.contact.phone.as_deref().filter(|p| !p.is_empty()) {
        notes.push_str(&format!("\nPhone: {}", phone));
    }
    if let Some(extra) = request.notes.as_deref().filter(|n| !n.is_empty()) {
        notes.push_str(&format!("\n\n{}", extra));
    }
    notes
}
