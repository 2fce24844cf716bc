//! Page layout: the single lookup table from logical controls to selectors.
//!
//! Everything the page object touches is named by a [`Control`]; the concrete
//! selector comes from a [`FormLayout`] injected at construction, so another
//! rendition of the page only needs a different table.

use crate::locator::Selector;
use crate::record::{Gender, Hobby};
use crate::result::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Logical controls of the practice form page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Form container
    FormContainer,
    /// First name input
    FirstName,
    /// Last name input
    LastName,
    /// Email input
    Email,
    /// Male radio
    GenderMale,
    /// Female radio
    GenderFemale,
    /// Other radio
    GenderOther,
    /// Mobile number input
    Mobile,
    /// Date of birth input
    DateOfBirth,
    /// Subjects autocomplete input
    Subjects,
    /// Sports checkbox label
    HobbySports,
    /// Reading checkbox label
    HobbyReading,
    /// Music checkbox label
    HobbyMusic,
    /// Picture upload input
    PictureUpload,
    /// Current address textarea
    CurrentAddress,
    /// State dropdown
    State,
    /// Options of the state dropdown (filtered by text at use)
    StateOption,
    /// City dropdown
    City,
    /// Options of the city dropdown (filtered by text at use)
    CityOption,
    /// Submit button
    Submit,
    /// Confirmation modal container
    Modal,
    /// Confirmation modal title
    ModalTitle,
    /// Confirmation modal body holding the table
    ModalBody,
    /// Confirmation modal close button
    ModalClose,
}

impl Control {
    /// Every control, in page order
    pub const ALL: [Self; 24] = [
        Self::FormContainer,
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::GenderMale,
        Self::GenderFemale,
        Self::GenderOther,
        Self::Mobile,
        Self::DateOfBirth,
        Self::Subjects,
        Self::HobbySports,
        Self::HobbyReading,
        Self::HobbyMusic,
        Self::PictureUpload,
        Self::CurrentAddress,
        Self::State,
        Self::StateOption,
        Self::City,
        Self::CityOption,
        Self::Submit,
        Self::Modal,
        Self::ModalTitle,
        Self::ModalBody,
        Self::ModalClose,
    ];

    /// Inputs that must be visible and editable once the page is ready
    pub const REQUIRED_INPUTS: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Mobile,
        Self::CurrentAddress,
    ];

    /// Radio control for a gender
    #[must_use]
    pub const fn for_gender(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self::GenderMale,
            Gender::Female => Self::GenderFemale,
            Gender::Other => Self::GenderOther,
        }
    }

    /// Checkbox label control for a hobby
    #[must_use]
    pub const fn for_hobby(hobby: Hobby) -> Self {
        match hobby {
            Hobby::Sports => Self::HobbySports,
            Hobby::Reading => Self::HobbyReading,
            Hobby::Music => Self::HobbyMusic,
        }
    }

    /// Field name used in events and errors
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::FormContainer => "form",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::GenderMale => "gender:male",
            Self::GenderFemale => "gender:female",
            Self::GenderOther => "gender:other",
            Self::Mobile => "mobile",
            Self::DateOfBirth => "dateOfBirth",
            Self::Subjects => "subjects",
            Self::HobbySports => "hobby:sports",
            Self::HobbyReading => "hobby:reading",
            Self::HobbyMusic => "hobby:music",
            Self::PictureUpload => "picture",
            Self::CurrentAddress => "address",
            Self::State => "state",
            Self::StateOption => "state:option",
            Self::City => "city",
            Self::CityOption => "city:option",
            Self::Submit => "submit",
            Self::Modal => "modal",
            Self::ModalTitle => "modal:title",
            Self::ModalBody => "modal:body",
            Self::ModalClose => "modal:close",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Elements known to obstruct interaction, handled on every navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interference {
    /// Removed from the DOM outright right after navigation
    pub removed: Vec<String>,
    /// Dismissed with a forced click if one becomes visible
    pub dismissable: Vec<Selector>,
    /// Hidden with `display: none`
    pub hidden: Vec<String>,
}

impl Interference {
    /// Interference set of the demoqa host
    #[must_use]
    pub fn demoqa() -> Self {
        Self {
            removed: [
                "#ad_position_box",
                "#fixedban",
                ".Advertisement-Section",
                ".ad-container",
                ".Google-Ad",
            ]
            .map(String::from)
            .to_vec(),
            dismissable: [
                ".modal-dialog .close",
                ".popup-close",
                ".advertisement-close",
                "[aria-label=\"Close\"]",
                ".close-button",
            ]
            .map(Selector::css)
            .to_vec(),
            hidden: [
                "iframe[src*=\"googlesyndication\"]",
                "iframe[src*=\"doubleclick\"]",
                "[id*=\"google_ads\"]",
                "[class*=\"advertisement\"]",
                "#fixedban",
            ]
            .map(String::from)
            .to_vec(),
        }
    }

    /// Nothing to neutralise
    #[must_use]
    pub const fn none() -> Self {
        Self {
            removed: Vec::new(),
            dismissable: Vec::new(),
            hidden: Vec::new(),
        }
    }
}

/// Immutable selector table plus the page constants the form contract needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLayout {
    /// Path of the form relative to the base URL
    pub path: String,
    /// Regex the page title must match after navigation
    pub title_pattern: String,
    /// Phrase the confirmation title must contain
    pub success_phrase: String,
    /// Obstructing elements
    pub interference: Interference,
    controls: BTreeMap<Control, Selector>,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self::demoqa()
    }
}

impl FormLayout {
    /// Layout of `demoqa.com/automation-practice-form`
    #[must_use]
    pub fn demoqa() -> Self {
        let controls = [
            (Control::FormContainer, "#userForm"),
            (Control::FirstName, "#firstName"),
            (Control::LastName, "#lastName"),
            (Control::Email, "#userEmail"),
            (Control::GenderMale, "input#gender-radio-1"),
            (Control::GenderFemale, "input#gender-radio-2"),
            (Control::GenderOther, "input#gender-radio-3"),
            (Control::Mobile, "#userNumber"),
            (Control::DateOfBirth, "#dateOfBirthInput"),
            (Control::Subjects, "#subjectsInput"),
            (Control::HobbySports, "label[for=\"hobbies-checkbox-1\"]"),
            (Control::HobbyReading, "label[for=\"hobbies-checkbox-2\"]"),
            (Control::HobbyMusic, "label[for=\"hobbies-checkbox-3\"]"),
            (Control::PictureUpload, "#uploadPicture"),
            (Control::CurrentAddress, "#currentAddress"),
            (Control::State, "#state"),
            (Control::StateOption, "div[id^=\"react-select-3-option-\"]"),
            (Control::City, "#city"),
            (Control::CityOption, "div[id^=\"react-select-4-option-\"]"),
            (Control::Submit, "#submit"),
            (Control::Modal, ".modal-dialog"),
            (Control::ModalTitle, ".modal-title"),
            (Control::ModalBody, ".modal-body"),
            (Control::ModalClose, "#closeLargeModal"),
        ]
        .into_iter()
        .map(|(control, css)| (control, Selector::css(css)))
        .collect();

        Self {
            path: "/automation-practice-form".to_string(),
            title_pattern: "DEMOQA".to_string(),
            success_phrase: "Thanks for submitting the form".to_string(),
            interference: Interference::demoqa(),
            controls,
        }
    }

    /// Replace the selector of one control
    #[must_use]
    pub fn with_control(mut self, control: Control, selector: Selector) -> Self {
        let _ = self.controls.insert(control, selector);
        self
    }

    /// Apply a set of overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BTreeMap<Control, Selector>) -> Self {
        for (control, selector) in overrides {
            let _ = self.controls.insert(*control, selector.clone());
        }
        self
    }

    /// Replace the interference set
    #[must_use]
    pub fn with_interference(mut self, interference: Interference) -> Self {
        self.interference = interference;
        self
    }

    /// Selector of a control
    pub fn selector(&self, control: Control) -> FormResult<&Selector> {
        self.controls
            .get(&control)
            .ok_or_else(|| FormError::UnknownControl {
                control: control.to_string(),
            })
    }

    /// Reverse lookup, used by drivers that simulate the page
    #[must_use]
    pub fn control_for(&self, selector: &Selector) -> Option<Control> {
        self.controls
            .iter()
            .find(|(_, s)| *s == selector)
            .map(|(c, _)| *c)
    }

    /// Option selector of a dropdown narrowed to a visible text
    pub fn option(&self, option_control: Control, text: &str) -> FormResult<Selector> {
        Ok(self.selector(option_control)?.clone().with_text(text))
    }
}
