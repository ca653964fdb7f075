//! Static package and tutor catalog.

use crate::{
    errors::{BookingError, BookingResult},
    models::{
        package::Package,
        slot::{WeeklyAvailability, Weekday},
        tutor::Tutor,
    },
};

pub const TRIAL_PACKAGE_ID: &str = "trial";

pub fn packages() -> Vec<Package> {
    vec![
        Package {
            id: TRIAL_PACKAGE_ID.to_string(),
            name: "Probestunde".to_string(),
            sessions: 1,
            price: 0,
            savings: None,
            popular: false,
            trial: true,
            features: vec![
                "45 Minuten Kennenlernen".to_string(),
                "Lernstandsanalyse".to_string(),
            ],
        },
        Package {
            id: "single".to_string(),
            name: "Einzelstunde".to_string(),
            sessions: 1,
            price: 4_500,
            savings: None,
            popular: false,
            trial: false,
            features: vec!["60 Minuten Unterricht".to_string()],
        },
        Package {
            id: "package-5".to_string(),
            name: "5er-Paket".to_string(),
            sessions: 5,
            price: 20_000,
            savings: Some("11 % sparen".to_string()),
            popular: false,
            trial: false,
            features: vec![
                "5 x 60 Minuten Unterricht".to_string(),
                "Fortschrittsbericht".to_string(),
            ],
        },
        Package {
            id: "package-10".to_string(),
            name: "10er-Paket".to_string(),
            sessions: 10,
            price: 37_500,
            savings: Some("17 % sparen".to_string()),
            popular: true,
            trial: false,
            features: vec![
                "10 x 60 Minuten Unterricht".to_string(),
                "Fortschrittsbericht".to_string(),
                "Elterngespräch".to_string(),
            ],
        },
    ]
}

pub fn package(id: &str) -> BookingResult<Package> {
    packages()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| BookingError::NotFound(format!("Package {} not found", id)))
}

fn table(days: Vec<(Weekday, Vec<&str>)>) -> Option<WeeklyAvailability> {
    // Seed labels are literals; a typo would surface in the catalog tests.
    WeeklyAvailability::from_labels(days).ok()
}

/// Tutors as shipped. Weekly tables are the defaults until a tutor saves their own.
pub fn seed_tutors() -> Vec<Tutor> {
    vec![
        Tutor {
            id: "anna-schmidt".to_string(),
            name: "Anna Schmidt".to_string(),
            subjects: vec!["Mathematik".to_string(), "Physik".to_string()],
            languages: vec!["Deutsch".to_string(), "Englisch".to_string()],
            hourly_rate: 4_500,
            achievements: "Mathematikstudium an der TU München, 5 Jahre Nachhilfeerfahrung"
                .to_string(),
            online_only: false,
            availability: table(vec![
                (Weekday::Monday, vec!["14:00", "15:00", "16:00"]),
                (Weekday::Wednesday, vec!["15:00", "16:00", "17:00"]),
                (Weekday::Friday, vec!["14:00", "15:00"]),
            ]),
        },
        Tutor {
            id: "jonas-weber".to_string(),
            name: "Jonas Weber".to_string(),
            subjects: vec!["Mathematik".to_string(), "Informatik".to_string()],
            languages: vec!["Deutsch".to_string()],
            hourly_rate: 5_000,
            achievements: "Bundessieger der Mathematik-Olympiade, Finalist bei Jugend forscht"
                .to_string(),
            online_only: true,
            availability: table(vec![
                (Weekday::Tuesday, vec!["16:00", "17:00", "18:00"]),
                (Weekday::Thursday, vec!["16:00", "17:00"]),
                (Weekday::Saturday, vec!["10:00", "11:00", "12:00"]),
            ]),
        },
        Tutor {
            id: "lea-fischer".to_string(),
            name: "Lea Fischer".to_string(),
            subjects: vec!["Englisch".to_string(), "Französisch".to_string()],
            languages: vec![
                "Deutsch".to_string(),
                "Englisch".to_string(),
                "Französisch".to_string(),
            ],
            hourly_rate: 4_000,
            achievements: "Lehramtsstudium Englisch/Französisch, Auslandsjahr in Lyon".to_string(),
            online_only: false,
            availability: table(vec![
                (Weekday::Monday, vec!["09:00", "10:00"]),
                (Weekday::Thursday, vec!["14:00", "15:00", "16:00"]),
            ]),
        },
        Tutor {
            id: "max-becker".to_string(),
            name: "Max Becker".to_string(),
            subjects: vec!["Chemie".to_string(), "Biologie".to_string()],
            languages: vec!["Deutsch".to_string(), "Türkisch".to_string()],
            hourly_rate: 4_200,
            achievements: "Medizinstudent, Preisträger im Chemie-Wettbewerb".to_string(),
            online_only: false,
            availability: None,
        },
    ]
}
