//! Tutor lookups with their current weekly tables.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    errors::{BookingError, BookingResult},
    models::{slot::WeeklyAvailability, tutor::Tutor},
    ports::AvailabilityRepository,
};

/// The static tutor catalog joined with tables tutors saved from the dashboard.
pub struct TutorDirectory {
    tutors: Vec<Tutor>,
    availability: Arc<dyn AvailabilityRepository>,
}

impl TutorDirectory {
    pub fn new(tutors: Vec<Tutor>, availability: Arc<dyn AvailabilityRepository>) -> Self {
        Self {
            tutors,
            availability,
        }
    }

    fn seed(&self, tutor_id: &str) -> BookingResult<&Tutor> {
        self.tutors
            .iter()
            .find(|t| t.id == tutor_id)
            .ok_or_else(|| BookingError::NotFound(format!("Tutor {} not found", tutor_id)))
    }

    async fn with_saved_table(&self, mut tutor: Tutor) -> Tutor {
        match self.availability.load(&tutor.id).await {
            Ok(Some(table)) => tutor.availability = Some(table),
            Ok(None) => debug!("No saved availability for {}, using seed table", tutor.id),
            Err(e) => warn!("Availability of {} unreadable, using seed table: {}", tutor.id, e),
        }
        tutor
    }

    pub async fn get(&self, tutor_id: &str) -> BookingResult<Tutor> {
        let tutor = self.seed(tutor_id)?.clone();
        Ok(self.with_saved_table(tutor).await)
    }

    pub async fn all(&self) -> Vec<Tutor> {
        let mut tutors = Vec::with_capacity(self.tutors.len());
        for tutor in &self.tutors {
            tutors.push(self.with_saved_table(tutor.clone()).await);
        }
        tutors
    }

    /// Replaces the tutor's whole table.
    pub async fn save_availability(
        &self,
        tutor_id: &str,
        table: WeeklyAvailability,
    ) -> BookingResult<WeeklyAvailability> {
        self.seed(tutor_id)?;
        self.availability.save(tutor_id, &table).await?;
        Ok(table)
    }
}
