//! Two-tier repositories: a local-cache implementation of each storage port,
//! and decorators that mirror a remote store into it.

pub mod local;
pub mod mirrored;

pub use local::{CachedAvailabilityRepository, CachedBookingRepository};
pub use mirrored::{MirroredAvailabilityRepository, MirroredBookingRepository};
