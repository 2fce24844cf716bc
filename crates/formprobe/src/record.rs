//! Form data: the record a caller applies, the live readback, and the
//! confirmation table echoed after submission.

use crate::result::{ChoiceKind, FormError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Confirmation label carrying `first_name + " " + last_name`
pub const LABEL_STUDENT_NAME: &str = "Student Name";
/// Confirmation label carrying the email
pub const LABEL_STUDENT_EMAIL: &str = "Student Email";
/// Confirmation label carrying the mobile number
pub const LABEL_MOBILE: &str = "Mobile";
/// Confirmation label carrying the current address
pub const LABEL_ADDRESS: &str = "Address";
/// Confirmation label carrying the uploaded file name
pub const LABEL_PICTURE: &str = "Picture";

/// Gender radio choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other
    Other,
}

impl Gender {
    /// Every choice, in page order
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    /// Label as rendered by the page
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(FormError::InvalidChoice {
                kind: ChoiceKind::Gender,
                value: s.to_string(),
            }),
        }
    }
}

/// Hobby checkbox choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hobby {
    /// Sports
    Sports,
    /// Reading
    Reading,
    /// Music
    Music,
}

impl Hobby {
    /// Every choice, in page order
    pub const ALL: [Self; 3] = [Self::Sports, Self::Reading, Self::Music];

    /// Label as rendered by the page
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sports => "Sports",
            Self::Reading => "Reading",
            Self::Music => "Music",
        }
    }
}

impl fmt::Display for Hobby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hobby {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sports" => Ok(Self::Sports),
            "reading" => Ok(Self::Reading),
            "music" => Ok(Self::Music),
            _ => Err(FormError::InvalidChoice {
                kind: ChoiceKind::Hobby,
                value: s.to_string(),
            }),
        }
    }
}

/// Values a caller wants applied to the form.
///
/// Constructed before the interaction starts; the page object only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormRecord {
    /// First name (required)
    pub first_name: String,
    /// Last name (required)
    pub last_name: String,
    /// Email (required)
    pub email: String,
    /// Mobile number, 10 digits (required)
    pub mobile: String,
    /// Current address (required by the record contract, may be empty on the page)
    pub address: String,
    /// Gender choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Date of birth as typed into the picker, e.g. "15 Jul 1990"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Subjects, entered in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    /// Hobbies to tick
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hobbies: BTreeSet<Hobby>,
    /// Picture to attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<PathBuf>,
    /// State dropdown text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// City dropdown text; must belong to `state`, which is not checked here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl FormRecord {
    /// Create a record with the required fields
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            mobile: mobile.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Set gender
    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Set date of birth
    #[must_use]
    pub fn with_date_of_birth(mut self, date: impl Into<String>) -> Self {
        self.date_of_birth = Some(date.into());
        self
    }

    /// Append a subject
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Add a hobby
    #[must_use]
    pub fn with_hobby(mut self, hobby: Hobby) -> Self {
        let _ = self.hobbies.insert(hobby);
        self
    }

    /// Set picture path
    #[must_use]
    pub fn with_picture(mut self, path: impl Into<PathBuf>) -> Self {
        self.picture = Some(path.into());
        self
    }

    /// Set state and city together
    #[must_use]
    pub fn with_state_city(mut self, state: impl Into<String>, city: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self.city = Some(city.into());
        self
    }

    /// Name as echoed by the confirmation table: single space, no trimming
    #[must_use]
    pub fn full_name(&self) -> String {
        compose_full_name(&self.first_name, &self.last_name)
    }
}

/// `first + " " + last`
#[must_use]
pub fn compose_full_name(first: &str, last: &str) -> String {
    format!("{first} {last}")
}

/// Live value of one input, read back from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    /// Logical field name
    pub field: String,
    /// Value currently held by the input
    pub value: String,
}

impl FieldState {
    /// Create a field state
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Readback of the required text inputs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormValues {
    /// First name input
    pub first_name: String,
    /// Last name input
    pub last_name: String,
    /// Email input
    pub email: String,
    /// Mobile input
    pub mobile: String,
    /// Address textarea
    pub address: String,
}

impl FormValues {
    /// Name as the confirmation table should echo it
    #[must_use]
    pub fn full_name(&self) -> String {
        compose_full_name(&self.first_name, &self.last_name)
    }

    /// Every required field is non-empty (address excluded, it is optional on the page)
    #[must_use]
    pub fn has_required(&self) -> bool {
        !self.first_name.is_empty()
            && !self.last_name.is_empty()
            && !self.email.is_empty()
            && !self.mobile.is_empty()
    }

    /// The values as individual field states
    #[must_use]
    pub fn field_states(&self) -> Vec<FieldState> {
        vec![
            FieldState::new("firstName", &self.first_name),
            FieldState::new("lastName", &self.last_name),
            FieldState::new("email", &self.email),
            FieldState::new("mobile", &self.mobile),
            FieldState::new("address", &self.address),
        ]
    }
}

impl From<&FormRecord> for FormValues {
    fn from(record: &FormRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            mobile: record.mobile.clone(),
            address: record.address.clone(),
        }
    }
}

/// Label → value table rendered by the confirmation surface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    rows: Vec<(String, String)>,
}

impl ConfirmationRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw table rows, keeping the first two cells of each row.
    ///
    /// Rows with fewer than two cells are skipped; labels and values are trimmed.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut record = Self::new();
        for row in rows {
            if let [label, value, ..] = row.as_slice() {
                record.insert(label.trim(), value.trim());
            }
        }
        record
    }

    /// Insert a row; a repeated label replaces the earlier value
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        if let Some(slot) = self.rows.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = value;
        } else {
            self.rows.push((label, value));
        }
    }

    /// Value for a label, if present
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Value for a label, missing labels read as empty
    #[must_use]
    pub fn value_or_empty(&self, label: &str) -> &str {
        self.get(label).unwrap_or("")
    }

    /// Whether any cell, label or value, contains `needle`
    #[must_use]
    pub fn any_cell_contains(&self, needle: &str) -> bool {
        self.rows
            .iter()
            .any(|(label, value)| label.contains(needle) || value.contains(needle))
    }

    /// Rows in page order
    #[must_use]
    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows extracted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
