pub mod bookings;
pub mod catalog;
pub mod chat;
pub mod health;
pub mod tutors;
