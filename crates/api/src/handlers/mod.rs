/// Bookings of the signed-in parent and tutor
pub mod bookings;
/// Static packages and the tutor listing
pub mod catalog;
/// Conversations between two users
pub mod chat;
/// Time resolution, matching and weekly tables of a tutor
pub mod tutors;
