#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use eyre::{Result, eyre};
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use mockall::mock;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tutorbook_core::{
    cache::MemoryCache,
    catalog,
    directory::TutorDirectory,
    errors::ProviderError,
    models::{
        booking::{
            Booking, BookingId, BookingStatus, ContactDetails, CreateBookingRequest, Location,
        },
        slot::{SlotTime, WeeklyAvailability},
    },
    ports::{
        AvailabilityRepository, BookingRepository, ScheduleRequest, ScheduledBooking,
        SchedulingProvider,
    },
    reconciler::{BookingReconciler, ReconcilerSettings},
    repositories::{CachedAvailabilityRepository, CachedBookingRepository, MirroredBookingRepository},
    sync::{SyncWarning, WarningSink},
};

mock! {
    pub Scheduler {}

    #[async_trait]
    impl SchedulingProvider for Scheduler {
        async fn create_booking(
            &self,
            request: &ScheduleRequest,
        ) -> std::result::Result<ScheduledBooking, ProviderError>;

        async fn cancel_booking(
            &self,
            booking_id: &str,
            reason: &str,
        ) -> std::result::Result<(), ProviderError>;

        async fn reschedule_booking(
            &self,
            booking_id: &str,
            start: DateTime<Utc>,
            time_zone: &str,
        ) -> std::result::Result<ScheduledBooking, ProviderError>;
    }
}

/// Booking store that can be switched into failure mode.
pub struct FlakyBookings {
    inner: CachedBookingRepository,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyBookings {
    pub fn new() -> Self {
        Self {
            inner: CachedBookingRepository::new(Arc::new(MemoryCache::new())),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn go_offline(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn come_online(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        self.fail_writes.store(false, Ordering::SeqCst);
    }

    fn read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(eyre!("store unreachable"));
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(eyre!("store rejected write"));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for FlakyBookings {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        self.write()?;
        self.inner.insert(booking).await
    }

    async fn find(&self, owner: &str, id: &BookingId) -> Result<Option<Booking>> {
        self.read()?;
        self.inner.find(owner, id).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        self.read()?;
        self.inner.list_for_user(user_id).await
    }

    async fn list_for_tutor(&self, tutor_id: &str) -> Result<Vec<Booking>> {
        self.read()?;
        self.inner.list_for_tutor(tutor_id).await
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        self.read()?;
        self.inner.count_for_user(user_id).await
    }

    async fn update_status(
        &self,
        owner: &str,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<bool> {
        self.write()?;
        self.inner.update_status(owner, id, status).await
    }

    async fn update_schedule(
        &self,
        owner: &str,
        id: &BookingId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<bool> {
        self.write()?;
        self.inner.update_schedule(owner, id, date, time).await
    }
}

/// Availability store that is either reachable or not.
pub struct FlakyAvailability {
    inner: CachedAvailabilityRepository,
    pub offline: AtomicBool,
}

impl FlakyAvailability {
    pub fn new() -> Self {
        Self {
            inner: CachedAvailabilityRepository::new(Arc::new(MemoryCache::new())),
            offline: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AvailabilityRepository for FlakyAvailability {
    async fn load(&self, tutor_id: &str) -> Result<Option<WeeklyAvailability>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(eyre!("store unreachable"));
        }
        self.inner.load(tutor_id).await
    }

    async fn save(&self, tutor_id: &str, availability: &WeeklyAvailability) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(eyre!("store unreachable"));
        }
        self.inner.save(tutor_id, availability).await
    }
}

pub struct Harness {
    pub reconciler: BookingReconciler,
    pub store: Arc<FlakyBookings>,
    pub cache: Arc<CachedBookingRepository>,
    pub mirrored: Arc<MirroredBookingRepository>,
    pub warnings: UnboundedReceiver<SyncWarning>,
}

impl Harness {
    pub fn new(scheduler: MockScheduler) -> Self {
        let (tx, warnings) = mpsc::unbounded_channel();
        let sink = WarningSink::new(tx);
        let store = Arc::new(FlakyBookings::new());
        let cache = Arc::new(CachedBookingRepository::new(Arc::new(MemoryCache::new())));
        let mirrored = Arc::new(MirroredBookingRepository::new(
            store.clone(),
            cache.clone(),
            sink.clone(),
        ));
        let directory = Arc::new(TutorDirectory::new(
            catalog::seed_tutors(),
            Arc::new(CachedAvailabilityRepository::new(Arc::new(MemoryCache::new()))),
        ));
        let reconciler = BookingReconciler::new(
            Arc::new(scheduler),
            mirrored.clone(),
            directory,
            ReconcilerSettings::default(),
            sink,
        );
        Self {
            reconciler,
            store,
            cache,
            mirrored,
            warnings,
        }
    }

    pub fn drain_warnings(&mut self) -> Vec<SyncWarning> {
        let mut drained = Vec::new();
        while let Ok(warning) = self.warnings.try_recv() {
            drained.push(warning);
        }
        drained
    }
}

/// First date at least two days out that falls on `weekday`.
pub fn upcoming(weekday: chrono::Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(2);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

pub fn contact() -> ContactDetails {
    ContactDetails {
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: None,
    }
}

/// A request for Anna Schmidt, who teaches Mondays 14:00-16:00.
pub fn monday_request(package_id: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        tutor_id: "anna-schmidt".to_string(),
        package_id: package_id.to_string(),
        subject: "Mathematik".to_string(),
        date: upcoming(chrono::Weekday::Mon).to_string(),
        time: "14:00".to_string(),
        location: Location::Online,
        contact: contact(),
        notes: None,
    }
}

pub fn booking(id: BookingId, user_id: &str, date: NaiveDate, time: &str) -> Booking {
    let now = Utc::now();
    Booking {
        id,
        user_id: user_id.to_string(),
        tutor_id: "anna-schmidt".to_string(),
        tutor_name: "Anna Schmidt".to_string(),
        subject: "Mathematik".to_string(),
        package_id: "single".to_string(),
        date,
        time: time.parse().unwrap(),
        location: Location::Online,
        contact: contact(),
        notes: None,
        status: BookingStatus::Scheduled,
        created_at: now,
        updated_at: now,
    }
}

pub fn scheduled(id: &str) -> ScheduledBooking {
    ScheduledBooking {
        id: id.to_string(),
        start: Utc::now(),
    }
}
