//! Formprobe: page-object testing for a student registration form, plus
//! contract checks for a REST user API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │ FormRecord   │───►│ PracticeFormPage │───►│ FormDriver       │
//! │ (fixtures)   │    │ fill / guard /   │    │ CdpDriver        │
//! └──────────────┘    │ reconcile        │    │ SimulatedForm    │
//!                     └──────────────────┘    └──────────────────┘
//! ┌──────────────┐    ┌──────────────────┐
//! │ ReqresClient │───►│ api::checks      │
//! └──────────────┘    └──────────────────┘
//! ```
//!
//! The page object never talks to a browser directly. Every interaction goes
//! through [`FormDriver`], so the same scenarios run against chromium
//! (feature `browser`) and against the in-process [`SimulatedForm`].

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
#[cfg(feature = "browser")]
mod browser;
mod config;
mod driver;
mod event_log;
pub mod fixtures;
mod layout;
mod locator;
mod mock;
mod practice_form;
mod reconcile;
mod record;
mod result;
pub mod validators;
mod wait;

#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use config::{
    BrowserSettings, FillPolicy, SuiteConfig, Timeouts, DEFAULT_API_BASE_URL,
    DEFAULT_FORM_BASE_URL,
};
pub use driver::{FormDriver, Screenshot};
pub use event_log::{
    EventArchive, EventCategory, EventLevel, EventLog, FormEvent, FormObserver, LoggedEvent,
    TracingObserver,
};
pub use layout::{Control, FormLayout, Interference};
pub use locator::{ClickOptions, Key, Selector};
pub use mock::{ModalBehaviour, SimulatedForm, SIMULATED_TITLE};
pub use practice_form::{
    FillOutcome, GuardOutcome, PracticeFormPage, ReadinessReport, SurfaceState, SweepReport,
};
pub use reconcile::{expected_pairs, reconcile, Reconciliation};
pub use record::{
    compose_full_name, ConfirmationRecord, FieldState, FormRecord, FormValues, Gender, Hobby,
    LABEL_ADDRESS, LABEL_MOBILE, LABEL_PICTURE, LABEL_STUDENT_EMAIL, LABEL_STUDENT_NAME,
};
pub use result::{ChoiceKind, FormError, FormResult};
pub use wait::{
    pause, poll_until, probe_visible, wait_for_state, wait_for_text, wait_for_title,
    ElementState, WaitOptions, WaitResult,
};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "api")]
    pub use crate::api::ReqresClient;
    pub use crate::fixtures::{minimal_form_data, test_users, valid_form_data};
    pub use crate::{
        ClickOptions, Control, FormDriver, FormError, FormLayout, FormRecord, FormResult, Gender,
        Hobby, Key, PracticeFormPage, Selector, SimulatedForm, SuiteConfig, Timeouts,
    };
    #[cfg(feature = "browser")]
    pub use crate::CdpDriver;
}
