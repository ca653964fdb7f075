use tutorbook_db::repositories::booking::UPSERT_BOOKING;

fn normalized(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_upsert_only_updates_rows_of_the_same_owner() {
    let sql = normalized(UPSERT_BOOKING);

    assert!(sql.contains("ON CONFLICT (scheduling_id) DO UPDATE"));
    assert!(sql.ends_with("WHERE bookings.user_id = EXCLUDED.user_id"));
}

#[test]
fn test_upsert_never_rewrites_ownership_or_contact() {
    let sql = normalized(UPSERT_BOOKING);
    let (_, update) = sql.split_once("DO UPDATE SET").unwrap();
    let (assignments, _) = update.split_once(" WHERE ").unwrap();

    for column in ["user_id =", "tutor_id =", "contact_email =", "scheduling_id ="] {
        assert!(!assignments.contains(column), "upsert rewrites {}", column);
    }
}
