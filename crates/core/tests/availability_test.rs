use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tutorbook_core::{
    availability::{
        ensure_not_past, parse_booking_date, rank_tutors, resolve_slots_for_date,
        resolve_times_for_date,
    },
    catalog,
    errors::BookingError,
    models::{
        booking::Location,
        preferences::{Goal, MatchingPreferences},
        slot::{WeeklyAvailability, Weekday},
        tutor::Tutor,
    },
};

fn tutor(id: &str, subjects: &[&str], languages: &[&str], achievements: &str) -> Tutor {
    Tutor {
        id: id.to_string(),
        name: id.to_string(),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        hourly_rate: 4_000,
        achievements: achievements.to_string(),
        online_only: false,
        availability: None,
    }
}

fn monday_only() -> Tutor {
    let mut t = tutor("t", &["Mathematik"], &["Deutsch"], "");
    t.availability = Some(
        WeeklyAvailability::from_labels(vec![(Weekday::Monday, vec!["15:00", "14:00"])]).unwrap(),
    );
    t
}

#[test]
fn test_monday_slots_and_absent_tuesday() {
    let t = monday_only();
    // 2026-10-19 is a Monday.
    assert_eq!(
        resolve_times_for_date(&t, "2026-10-19").unwrap(),
        vec!["14:00".to_string(), "15:00".to_string()]
    );
    assert_eq!(resolve_times_for_date(&t, "2026-10-20").unwrap(), Vec::<String>::new());
}

#[test]
fn test_never_returns_times_of_another_weekday() {
    let t = monday_only();
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    for offset in 1..7 {
        let date = monday + Duration::days(offset);
        assert!(resolve_slots_for_date(&t, date).is_empty(), "{} offered slots", date);
    }
    assert_eq!(resolve_slots_for_date(&t, monday + Duration::days(7)).len(), 2);
}

#[test]
fn test_tutor_without_table_offers_legacy_grid() {
    let t = tutor("legacy", &["Chemie"], &["Deutsch"], "");
    let times = resolve_times_for_date(&t, "2026-10-20").unwrap();
    assert_eq!(times.len(), 11);
    assert_eq!(times[0], "09:00");
    assert_eq!(times[10], "19:00");
}

#[test]
fn test_empty_table_means_no_availability() {
    let mut t = tutor("empty", &["Chemie"], &["Deutsch"], "");
    t.availability = Some(WeeklyAvailability::new());
    assert!(resolve_times_for_date(&t, "2026-10-20").unwrap().is_empty());
}

#[rstest]
#[case("")]
#[case("19.10.2026")]
#[case("2026-02-30")]
#[case("tomorrow")]
fn test_invalid_dates_are_validation_errors(#[case] input: &str) {
    match resolve_times_for_date(&monday_only(), input) {
        Err(BookingError::Validation(_)) => {}
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_past_dates_are_rejected() {
    let today = parse_booking_date("2026-10-16").unwrap();
    assert!(ensure_not_past(today, today).is_ok());
    assert!(matches!(
        ensure_not_past(today - Duration::days(1), today),
        Err(BookingError::Validation(_))
    ));
}

#[test]
fn test_language_and_subject_scoring() {
    let a = tutor("a", &["Mathematik"], &["Deutsch", "Englisch"], "Studium der Physik");
    let b = tutor("b", &["Mathematik"], &["Deutsch"], "Teilnahme an der Mathematik-Olympiade");
    let preferences = MatchingPreferences {
        subjects: vec!["Mathematik".to_string()],
        languages: vec!["en".to_string(), "de".to_string()],
        goals: vec![Goal::BetterGrades],
        ..Default::default()
    };

    let ranked = rank_tutors(&[b, a], &preferences);
    let scores: Vec<(&str, u32)> = ranked.iter().map(|r| (r.tutor.id.as_str(), r.score)).collect();
    assert_eq!(scores, vec![("a", 80), ("b", 65)]);
}

#[test]
fn test_olympiad_goal_rewards_competition_record() {
    let a = tutor("a", &["Mathematik"], &["Deutsch"], "Lehramtsstudium");
    let b = tutor("b", &["Mathematik"], &["Deutsch"], "Bundessieger Mathematik-Olympiade");
    let preferences = MatchingPreferences {
        subjects: vec!["mathe".to_string()],
        goals: vec![Goal::Olympiad],
        ..Default::default()
    };

    let ranked = rank_tutors(&[a, b], &preferences);
    assert_eq!(ranked[0].tutor.id, "b");
    assert_eq!(ranked[0].score, 70);
    assert_eq!(ranked[1].score, 50);
}

#[test]
fn test_subject_filter_is_case_insensitive_substring() {
    let tutors = vec![
        tutor("math", &["Mathematik"], &["Deutsch"], ""),
        tutor("bio", &["Biologie"], &["Deutsch"], ""),
        tutor("phys", &["Physik", "MATHEMATIK (Oberstufe)"], &["Deutsch"], ""),
    ];
    let preferences = MatchingPreferences {
        subjects: vec!["mathematik".to_string()],
        ..Default::default()
    };

    let ids: Vec<String> = rank_tutors(&tutors, &preferences)
        .into_iter()
        .map(|r| r.tutor.id)
        .collect();
    assert_eq!(ids, vec!["math".to_string(), "phys".to_string()]);
}

#[test]
fn test_no_matching_subject_yields_empty_result() {
    let preferences = MatchingPreferences {
        subjects: vec!["Latein".to_string()],
        ..Default::default()
    };
    assert!(rank_tutors(&catalog::seed_tutors(), &preferences).is_empty());
}

#[test]
fn test_empty_preferences_keep_catalog_order_with_zero_scores() {
    let tutors = catalog::seed_tutors();
    let ranked = rank_tutors(&tutors, &MatchingPreferences::default());
    assert_eq!(ranked.len(), tutors.len());
    for (r, t) in ranked.iter().zip(&tutors) {
        assert_eq!(r.tutor.id, t.id);
        assert_eq!(r.score, 0);
    }
}

#[test]
fn test_in_person_excludes_online_only_tutors() {
    let preferences = MatchingPreferences {
        subjects: vec!["Mathematik".to_string()],
        location: Some(Location::InPerson),
        ..Default::default()
    };
    let ids: Vec<String> = rank_tutors(&catalog::seed_tutors(), &preferences)
        .into_iter()
        .map(|r| r.tutor.id)
        .collect();
    assert_eq!(ids, vec!["anna-schmidt".to_string()]);
}

#[test]
fn test_ranking_is_sorted_and_stable() {
    let preferences = MatchingPreferences {
        subjects: vec!["Mathematik".to_string()],
        languages: vec!["de".to_string(), "en".to_string()],
        goals: vec![Goal::Olympiad],
        ..Default::default()
    };
    let tutors = vec![
        tutor("one", &["Mathematik"], &["Deutsch"], ""),
        tutor("two", &["Mathematik"], &["Deutsch"], ""),
        tutor("three", &["Mathematik"], &["Deutsch", "Englisch"], "Olympiade"),
    ];
    let ranked = rank_tutors(&tutors, &preferences);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    let ids: Vec<&str> = ranked.iter().map(|r| r.tutor.id.as_str()).collect();
    assert_eq!(ids, vec!["three", "one", "two"]);
}

#[test]
fn test_seed_catalog_tables_are_well_formed() {
    let tutors = catalog::seed_tutors();
    let with_tables = tutors.iter().filter(|t| t.availability.is_some()).count();
    assert_eq!(with_tables, 3);
    assert!(catalog::package("trial").unwrap().trial);
    assert!(matches!(catalog::package("gold"), Err(BookingError::NotFound(_))));
}
