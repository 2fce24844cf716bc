//! Fixture records: the fixed data sets the scenarios run with, plus seeded
//! random generation.

use crate::api::models::NewUser;
use crate::record::{FormRecord, Gender, Hobby};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Subjects offered by the autocomplete
pub const SUBJECTS: [&str; 6] = ["Maths", "Physics", "Chemistry", "Biology", "English", "Hindi"];

/// States with the cities the page lists under each
pub const STATE_CITIES: [(&str, &[&str]); 4] = [
    ("NCR", &["Delhi", "Gurgaon", "Noida"]),
    ("Haryana", &["Karnal", "Panipat"]),
    ("Uttar Pradesh", &["Agra", "Lucknow", "Merrut"]),
    ("Rajasthan", &["Jaipur", "Jaiselmer"]),
];

/// Format the date picker accepts when typed, e.g. `15 Jul 1990`
pub const DATE_OF_BIRTH_FORMAT: &str = "%d %b %Y";

const FIRST_NAMES: [&str; 12] = [
    "Ava", "Liam", "Noah", "Emma", "Mia", "Lucas", "Zoe", "Ethan", "Chloe", "Owen", "Ruby",
    "Felix",
];
const LAST_NAMES: [&str; 12] = [
    "Turner", "Patel", "Nguyen", "Garcia", "Okafor", "Schmidt", "Rossi", "Kim", "Murphy",
    "Silva", "Novak", "Larsen",
];
const STREETS: [&str; 8] = [
    "Maple", "Cedar", "Harbor", "Willow", "Sunset", "Lake", "Hill", "Park",
];
const STREET_SUFFIXES: [&str; 5] = ["Street", "Avenue", "Road", "Lane", "Boulevard"];
const TOWNS: [&str; 6] = ["Springfield", "Riverton", "Fairview", "Georgetown", "Salem", "Ashland"];
const JOBS: [&str; 6] = ["leader", "engineer", "designer", "analyst", "teacher", "manager"];

/// Complete record exercising every field
#[must_use]
pub fn valid_form_data() -> FormRecord {
    FormRecord::new(
        "John",
        "Doe",
        "john.doe@example.com",
        "1234567890",
        "123 Main Street, New York, NY 10001",
    )
    .with_gender(Gender::Male)
    .with_date_of_birth("15 Jul 1990")
    .with_subject("Maths")
    .with_subject("Physics")
    .with_hobby(Hobby::Sports)
    .with_hobby(Hobby::Reading)
    .with_state_city("NCR", "Delhi")
}

/// Only what the page needs to accept a submission
#[must_use]
pub fn minimal_form_data() -> FormRecord {
    FormRecord::new("Jane", "Smith", "jane.smith@example.com", "9876543210", "")
        .with_gender(Gender::Female)
}

/// Empty names, malformed email, short mobile
#[must_use]
pub fn invalid_form_data() -> FormRecord {
    FormRecord::new("", "", "invalid-email", "123", "").with_gender(Gender::Male)
}

/// Two complete users with different states
#[must_use]
pub fn test_users() -> Vec<FormRecord> {
    vec![
        FormRecord::new(
            "Alice",
            "Johnson",
            "alice.johnson@test.com",
            "5551234567",
            "456 Oak Avenue, Los Angeles, CA 90210",
        )
        .with_gender(Gender::Female)
        .with_date_of_birth("20 Mar 1995")
        .with_subject("English")
        .with_hobby(Hobby::Music)
        .with_state_city("Haryana", "Karnal"),
        FormRecord::new(
            "Bob",
            "Wilson",
            "bob.wilson@test.com",
            "5559876543",
            "789 Pine Road, Chicago, IL 60601",
        )
        .with_gender(Gender::Male)
        .with_date_of_birth("10 Dec 1988")
        .with_subject("Chemistry")
        .with_subject("Biology")
        .with_hobby(Hobby::Sports)
        .with_hobby(Hobby::Music)
        .with_hobby(Hobby::Reading)
        .with_state_city("Uttar Pradesh", "Agra"),
    ]
}

/// Edge values for name and mobile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryValues {
    /// 100 characters
    pub long_name: String,
    /// One character
    pub short_name: String,
    /// Hyphen, apostrophe, period
    pub special_characters: String,
    /// Non-ASCII letters
    pub unicode_characters: String,
    /// Lowest-looking valid mobile
    pub min_mobile: String,
    /// Highest-looking valid mobile
    pub max_mobile: String,
}

/// Boundary values
#[must_use]
pub fn boundary_values() -> BoundaryValues {
    BoundaryValues {
        long_name: "A".repeat(100),
        short_name: "A".to_string(),
        special_characters: "John-O'Connor Jr.".to_string(),
        unicode_characters: "Jöhn Müller".to_string(),
        min_mobile: "1234567890".to_string(),
        max_mobile: "9876543210".to_string(),
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Random date between 1980-01-01 and 2005-12-31, inclusive
pub fn random_date_of_birth<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2005, 12, 31).unwrap_or_default();
    let span = (end - start).num_days();
    start + Duration::days(rng.gen_range(0..=span))
}

/// Random ten-digit mobile number
pub fn random_mobile<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..10)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Random complete record that passes every validator.
///
/// The state and city always belong together.
pub fn generate_valid_record<R: Rng + ?Sized>(rng: &mut R) -> FormRecord {
    let first = pick(rng, &FIRST_NAMES);
    let last = pick(rng, &LAST_NAMES);
    let email = format!(
        "{}.{}{}@example.com",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.gen_range(1..1000)
    );
    let address = format!(
        "{} {} {}, {}",
        rng.gen_range(1..9999),
        pick(rng, &STREETS),
        pick(rng, &STREET_SUFFIXES),
        pick(rng, &TOWNS)
    );
    let gender = *Gender::ALL.choose(rng).unwrap_or(&Gender::Other);
    let date = random_date_of_birth(rng).format(DATE_OF_BIRTH_FORMAT).to_string();

    let mut record = FormRecord::new(first, last, email, random_mobile(rng), address)
        .with_gender(gender)
        .with_date_of_birth(date);

    let subject_count = rng.gen_range(1..=3);
    for subject in SUBJECTS.choose_multiple(rng, subject_count) {
        record = record.with_subject(*subject);
    }
    let hobby_count = rng.gen_range(1..=3);
    for hobby in Hobby::ALL.choose_multiple(rng, hobby_count) {
        record = record.with_hobby(*hobby);
    }
    if let Some((state, cities)) = STATE_CITIES.choose(rng) {
        record = record.with_state_city(*state, pick(rng, cities));
    }
    record
}

/// Random payload for `POST /users`
pub fn generate_new_user<R: Rng + ?Sized>(rng: &mut R) -> NewUser {
    NewUser {
        name: format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES)),
        job: pick(rng, &JOBS).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{validate_for_submission, validate_required_fields};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    mod static_data_tests {
        use super::*;

        #[test]
        fn test_valid_data_passes_full_validation() {
            assert!(validate_required_fields(&valid_form_data()).is_ok());
            for user in test_users() {
                assert!(validate_required_fields(&user).is_ok(), "{user:?}");
            }
        }

        #[test]
        fn test_minimal_data_is_submittable() {
            let record = minimal_form_data();
            assert!(validate_for_submission(&record).is_ok());
            assert!(record.address.is_empty());
            assert_eq!(record.full_name(), "Jane Smith");
        }

        #[test]
        fn test_invalid_data_fails() {
            assert!(validate_for_submission(&invalid_form_data()).is_err());
        }

        #[test]
        fn test_boundary_values() {
            let b = boundary_values();
            assert_eq!(b.long_name.chars().count(), 100);
            assert_eq!(b.short_name.len(), 1);
            assert_eq!(b.unicode_characters.chars().count(), 11);
        }
    }

    mod generation_tests {
        use super::*;

        #[test]
        fn test_seeded_generation_is_deterministic() {
            let a = generate_valid_record(&mut StdRng::seed_from_u64(42));
            let b = generate_valid_record(&mut StdRng::seed_from_u64(42));
            assert_eq!(a, b);
        }

        #[test]
        fn test_generated_records_are_valid() {
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..200 {
                let record = generate_valid_record(&mut rng);
                assert!(validate_required_fields(&record).is_ok(), "{record:?}");
                assert!((1..=3).contains(&record.subjects.len()));
                assert!((1..=3).contains(&record.hobbies.len()));

                let state = record.state.as_deref().unwrap();
                let city = record.city.as_deref().unwrap();
                let (_, cities) = STATE_CITIES.iter().find(|(s, _)| *s == state).unwrap();
                assert!(cities.contains(&city));

                let dob = NaiveDate::parse_from_str(
                    record.date_of_birth.as_deref().unwrap(),
                    DATE_OF_BIRTH_FORMAT,
                )
                .unwrap();
                assert!(dob >= NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
                assert!(dob <= NaiveDate::from_ymd_opt(2005, 12, 31).unwrap());
            }
        }

        #[test]
        fn test_date_format_matches_picker() {
            let date = NaiveDate::from_ymd_opt(1990, 7, 5).unwrap();
            assert_eq!(date.format(DATE_OF_BIRTH_FORMAT).to_string(), "05 Jul 1990");
        }

        #[test]
        fn test_new_user_payload() {
            let user = generate_new_user(&mut StdRng::seed_from_u64(1));
            assert!(user.name.contains(' '));
            assert!(JOBS.contains(&user.job.as_str()));
        }
    }
}
