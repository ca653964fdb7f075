//! # Tutorbook Core
//!
//! Domain types and decision logic of the tutoring brokerage: the
//! availability resolver, the two-tier booking storage, the booking state
//! reconciler and chat conversations. Every external service is reached
//! through a trait in [`ports`], so this crate carries no HTTP or SQL.

pub mod availability;
pub mod cache;
pub mod catalog;
pub mod chat;
pub mod directory;
pub mod errors;
pub mod models;
pub mod ports;
pub mod reconciler;
pub mod repositories;
pub mod sync;
