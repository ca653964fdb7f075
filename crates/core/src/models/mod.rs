pub mod booking;
pub mod chat;
pub mod package;
pub mod preferences;
pub mod session;
pub mod slot;
pub mod tutor;
