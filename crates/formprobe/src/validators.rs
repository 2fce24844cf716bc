//! Precondition validators for form records.
//!
//! These run before any page mutation; the page itself is never asked to
//! validate anything.

use crate::record::FormRecord;
use crate::result::{FormError, FormResult};
use regex::Regex;
use std::sync::OnceLock;

/// Email shape accepted by the suite: one `@`, no whitespace, a dot after the `@`
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Required mobile length
pub const MOBILE_DIGITS: usize = 10;

#[allow(clippy::expect_used)]
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Exactly ten ASCII digits
#[must_use]
pub fn validate_mobile(mobile: &str) -> bool {
    let valid = mobile.len() == MOBILE_DIGITS && mobile.bytes().all(|b| b.is_ascii_digit());
    tracing::debug!(mobile, valid, "mobile format check");
    valid
}

/// `local@domain.tld` with no whitespace and a single `@`
#[must_use]
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate the required fields of a record.
///
/// Checks, in order: first name, last name, email, mobile, address. The first
/// failure is returned and names the field.
pub fn validate_required_fields(record: &FormRecord) -> FormResult<()> {
    validate_for_submission(record)?;
    require_non_blank("address", &record.address)?;
    tracing::debug!(first_name = %record.first_name, "required fields valid");
    Ok(())
}

/// Validate what the page itself insists on before it accepts a submission.
///
/// Same as [`validate_required_fields`] minus the address, which the page
/// treats as optional.
pub fn validate_for_submission(record: &FormRecord) -> FormResult<()> {
    require_non_blank("firstName", &record.first_name)?;
    require_non_blank("lastName", &record.last_name)?;
    if !validate_email(&record.email) {
        return Err(FormError::validation(
            "email",
            format!("{:?} is not a valid email address", record.email),
        ));
    }
    if !validate_mobile(&record.mobile) {
        return Err(FormError::validation(
            "mobile",
            format!("{:?} must contain exactly {MOBILE_DIGITS} digits", record.mobile),
        ));
    }
    Ok(())
}

fn require_non_blank(field: &str, value: &str) -> FormResult<()> {
    if value.trim().is_empty() {
        return Err(FormError::validation(field, "is required and cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mobile_tests {
        use super::*;

        #[test]
        fn test_examples() {
            assert!(validate_mobile("1234567890"));
            assert!(!validate_mobile("123456789"));
            assert!(!validate_mobile("12345678901"));
            assert!(!validate_mobile("12345abcde"));
            assert!(!validate_mobile(""));
        }

        #[test]
        fn test_rejects_non_ascii_digits() {
            // Arabic-Indic digits
            assert!(!validate_mobile("١٢٣٤٥٦٧٨٩٠"));
        }
    }

    mod email_tests {
        use super::*;

        #[test]
        fn test_examples() {
            assert!(validate_email("a@b.com"));
            assert!(validate_email("jane.smith@example.com"));
            assert!(!validate_email("invalid-email"));
            assert!(!validate_email("a@b"));
            assert!(!validate_email("a@@b.com"));
            assert!(!validate_email("a b@c.com"));
            assert!(!validate_email("@b.com"));
        }
    }

    mod required_fields_tests {
        use super::*;

        fn valid() -> FormRecord {
            FormRecord::new(
                "John",
                "Doe",
                "john.doe@example.com",
                "1234567890",
                "123 Test Street",
            )
        }

        fn failing_field(record: &FormRecord) -> String {
            match validate_required_fields(record) {
                Err(FormError::ValidationFailure { field, .. }) => field,
                other => panic!("expected validation failure, got {other:?}"),
            }
        }

        #[test]
        fn test_valid_record_passes() {
            assert!(validate_required_fields(&valid()).is_ok());
        }

        #[test]
        fn test_each_field_is_named() {
            let mut r = valid();
            r.first_name = "   ".to_string();
            assert_eq!(failing_field(&r), "firstName");

            let mut r = valid();
            r.last_name.clear();
            assert_eq!(failing_field(&r), "lastName");

            let mut r = valid();
            r.email = "invalid-email".to_string();
            assert_eq!(failing_field(&r), "email");

            let mut r = valid();
            r.mobile = "123".to_string();
            assert_eq!(failing_field(&r), "mobile");

            let mut r = valid();
            r.address = "\n".to_string();
            assert_eq!(failing_field(&r), "address");
        }

        #[test]
        fn test_submission_check_allows_missing_address() {
            let mut r = valid();
            r.address.clear();
            assert!(validate_for_submission(&r).is_ok());
            assert!(validate_required_fields(&r).is_err());
        }

        #[test]
        fn test_first_failure_wins() {
            let record = FormRecord::new("", "", "invalid-email", "123", "");
            assert_eq!(failing_field(&record), "firstName");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_ten_ascii_digits_accepted(m in "[0-9]{10}") {
                prop_assert!(validate_mobile(&m));
            }

            #[test]
            fn prop_wrong_length_rejected(m in "[0-9]{0,9}|[0-9]{11,15}") {
                prop_assert!(!validate_mobile(&m));
            }

            #[test]
            fn prop_any_letter_rejected(prefix in "[0-9]{0,9}", c in "[a-zA-Z]") {
                let mut m = prefix.clone();
                m.push_str(&c);
                while m.len() < MOBILE_DIGITS {
                    m.push('0');
                }
                prop_assert!(!validate_mobile(&m));
            }

            #[test]
            fn prop_simple_emails_accepted(
                local in "[a-z0-9._]{1,12}",
                domain in "[a-z0-9]{1,12}",
                tld in "[a-z]{2,6}"
            ) {
                let email = format!("{local}@{domain}.{tld}");
                prop_assert!(validate_email(&email));
            }

            #[test]
            fn prop_emails_without_at_rejected(s in "[a-z0-9.]{0,20}") {
                prop_assert!(!validate_email(&s));
            }
        }
    }
}
