use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tutorbook_core::models::{
    booking::{Booking, BookingId, BookingStatus, ContactDetails, Location},
    slot::SlotTime,
};
use tutorbook_db::models::DbBooking;
use uuid::Uuid;

fn booking(id: BookingId) -> Booking {
    let now = Utc::now();
    Booking {
        id,
        user_id: "user-1".to_string(),
        tutor_id: "anna-schmidt".to_string(),
        tutor_name: "Anna Schmidt".to_string(),
        subject: "Mathematik".to_string(),
        package_id: "single".to_string(),
        date: NaiveDate::from_ymd_opt(2030, 3, 4).unwrap(),
        time: "14:00".parse().unwrap(),
        location: Location::Online,
        contact: ContactDetails {
            name: "Eva Muster".to_string(),
            email: "eva@example.com".to_string(),
            phone: None,
        },
        notes: Some("Bruchrechnung".to_string()),
        status: BookingStatus::Scheduled,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_local_booking_reuses_its_id_as_primary_key() {
    let local = Uuid::new_v4();
    let row = DbBooking::from_booking(&booking(BookingId::Local(local.to_string())));

    assert_eq!(row.id, local);
    assert_eq!(row.scheduling_id, format!("local-{}", local));
}

#[test]
fn test_remote_booking_keeps_provider_id() {
    let row = DbBooking::from_booking(&booking(BookingId::Remote("cal-123".to_string())));

    assert_eq!(row.scheduling_id, "cal-123");
    assert_eq!(row.time, "14:00");
    assert_eq!(row.location, "online");
    assert_eq!(row.status, "scheduled");
}

#[rstest]
#[case(BookingId::Remote("cal-9".to_string()))]
#[case(BookingId::new_local())]
fn test_row_converts_back_into_booking(#[case] id: BookingId) {
    let original = booking(id);
    let restored = DbBooking::from_booking(&original).into_booking().unwrap();

    assert_eq!(restored, original);
}

#[rstest]
#[case::bad_time("time", "25:00")]
#[case::bad_status("status", "archived")]
#[case::bad_location("location", "moon")]
#[case::empty_id("scheduling_id", "")]
fn test_corrupt_row_is_rejected(#[case] column: &str, #[case] value: &str) {
    let mut row = DbBooking::from_booking(&booking(BookingId::Remote("cal-1".to_string())));
    match column {
        "time" => row.time = value.to_string(),
        "status" => row.status = value.to_string(),
        "location" => row.location = value.to_string(),
        _ => row.scheduling_id = value.to_string(),
    }

    assert!(row.into_booking().is_err());
}

#[test]
fn test_cancelled_status_survives_conversion() {
    let mut original = booking(BookingId::Remote("cal-2".to_string()));
    original.status = BookingStatus::Cancelled;

    let restored = DbBooking::from_booking(&original).into_booking().unwrap();

    assert_eq!(restored.status, BookingStatus::Cancelled);
}
