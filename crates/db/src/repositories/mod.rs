pub mod booking;
pub mod tutor;

pub use booking::PgBookingRepository;
pub use tutor::PgAvailabilityRepository;
