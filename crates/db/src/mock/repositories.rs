use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use tutorbook_core::{
    models::{
        booking::{Booking, BookingId, BookingStatus},
        slot::{SlotTime, WeeklyAvailability},
    },
    ports::{AvailabilityRepository, BookingRepository},
};

// Mock stores for testing
mock! {
    pub BookingStore {}

    #[async_trait]
    impl BookingRepository for BookingStore {
        async fn insert(&self, booking: &Booking) -> eyre::Result<()>;

        async fn find(&self, owner: &str, id: &BookingId) -> eyre::Result<Option<Booking>>;

        async fn list_for_user(&self, user_id: &str) -> eyre::Result<Vec<Booking>>;

        async fn list_for_tutor(&self, tutor_id: &str) -> eyre::Result<Vec<Booking>>;

        async fn count_for_user(&self, user_id: &str) -> eyre::Result<usize>;

        async fn update_status(
            &self,
            owner: &str,
            id: &BookingId,
            status: BookingStatus,
        ) -> eyre::Result<bool>;

        async fn update_schedule(
            &self,
            owner: &str,
            id: &BookingId,
            date: NaiveDate,
            time: SlotTime,
        ) -> eyre::Result<bool>;
    }
}

mock! {
    pub AvailabilityStore {}

    #[async_trait]
    impl AvailabilityRepository for AvailabilityStore {
        async fn load(&self, tutor_id: &str) -> eyre::Result<Option<WeeklyAvailability>>;

        async fn save(
            &self,
            tutor_id: &str,
            availability: &WeeklyAvailability,
        ) -> eyre::Result<()>;
    }
}
