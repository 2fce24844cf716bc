//! Field-by-field comparison of submitted values against the confirmation
//! table.

use crate::record::{
    ConfirmationRecord, FormValues, LABEL_ADDRESS, LABEL_MOBILE, LABEL_STUDENT_EMAIL,
    LABEL_STUDENT_NAME,
};
use crate::result::{FormError, FormResult};
use serde::{Deserialize, Serialize};

/// Pairs compared during reconciliation, in comparison order.
///
/// Returns `(field, confirmation label, expected value)`.
#[must_use]
pub fn expected_pairs(values: &FormValues) -> [(&'static str, &'static str, String); 4] {
    [
        ("fullName", LABEL_STUDENT_NAME, values.full_name()),
        ("email", LABEL_STUDENT_EMAIL, values.email.clone()),
        ("mobile", LABEL_MOBILE, values.mobile.clone()),
        ("address", LABEL_ADDRESS, values.address.clone()),
    ]
}

/// Compare `expected` against the confirmation table.
///
/// Missing labels read as the empty string. The first differing field
/// raises [`FormError::MismatchFailure`]; later fields are not inspected.
pub fn reconcile(expected: &FormValues, confirmation: &ConfirmationRecord) -> FormResult<()> {
    for (field, label, want) in expected_pairs(expected) {
        let actual = confirmation.value_or_empty(label);
        if actual != want {
            return Err(FormError::MismatchFailure {
                field: field.to_string(),
                expected: want,
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

/// Both sides of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Values read from the form inputs
    pub form_values: FormValues,
    /// Table read from the confirmation surface
    pub confirmation: ConfirmationRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values() -> FormValues {
        FormValues {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            mobile: "9876543210".to_string(),
            address: String::new(),
        }
    }

    fn echo(values: &FormValues) -> ConfirmationRecord {
        let mut record = ConfirmationRecord::new();
        record.insert(LABEL_STUDENT_NAME, values.full_name());
        record.insert(LABEL_STUDENT_EMAIL, &values.email);
        record.insert("Gender", "Female");
        record.insert(LABEL_MOBILE, &values.mobile);
        record.insert(LABEL_ADDRESS, &values.address);
        record
    }

    #[test]
    fn test_matching_echo_passes() {
        let v = values();
        assert!(reconcile(&v, &echo(&v)).is_ok());
    }

    #[test]
    fn test_missing_address_row_reads_empty() {
        let v = values();
        let mut record = ConfirmationRecord::new();
        record.insert(LABEL_STUDENT_NAME, "Jane Smith");
        record.insert(LABEL_STUDENT_EMAIL, "jane.smith@example.com");
        record.insert(LABEL_MOBILE, "9876543210");
        assert!(reconcile(&v, &record).is_ok());
    }

    #[test]
    fn test_first_mismatch_wins() {
        let v = values();
        let mut record = echo(&v);
        record.insert(LABEL_STUDENT_EMAIL, "other@example.com");
        record.insert(LABEL_MOBILE, "0000000000");
        match reconcile(&v, &record).unwrap_err() {
            FormError::MismatchFailure {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "email");
                assert_eq!(expected, "jane.smith@example.com");
                assert_eq!(actual, "other@example.com");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_full_name_is_not_trimmed() {
        let mut v = values();
        v.first_name = "Jane ".to_string();
        let mut record = echo(&values());
        record.insert(LABEL_STUDENT_NAME, "Jane Smith");
        let err = reconcile(&v, &record).unwrap_err();
        assert!(matches!(err, FormError::MismatchFailure { field, .. } if field == "fullName"));
    }

    #[test]
    fn test_comparison_order() {
        let fields: Vec<_> = expected_pairs(&values()).iter().map(|p| p.0).collect();
        assert_eq!(fields, vec!["fullName", "email", "mobile", "address"]);
    }

    proptest! {
        #[test]
        fn prop_echo_of_any_values_reconciles(
            first in "[A-Za-z]{1,12}",
            last in "[A-Za-z]{1,12}",
            mobile in "[0-9]{10}",
            address in "[A-Za-z0-9 ,]{0,30}",
        ) {
            let v = FormValues {
                first_name: first,
                last_name: last,
                email: "p@example.com".to_string(),
                mobile,
                address,
            };
            prop_assert!(reconcile(&v, &echo(&v)).is_ok());
        }
    }
}
