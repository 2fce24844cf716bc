//! Page object for the practice form.
//!
//! [`PracticeFormPage`] drives a [`FormDriver`] through the form interaction
//! contract: neutralise interference, populate fields from a [`FormRecord`],
//! submit, read the confirmation surface, reconcile, dismiss.
//!
//! Every step reports to the configured [`FormObserver`]; nothing is printed.
//!
//! ```ignore
//! let mut page = PracticeFormPage::from_config(driver, &SuiteConfig::default());
//! page.navigate_to_form().await?;
//! page.submit_and_verify(&fixtures::minimal_form_data()).await?;
//! ```

use crate::config::{FillPolicy, SuiteConfig, Timeouts};
use crate::driver::{FormDriver, Screenshot};
use crate::event_log::{EventCategory, EventLevel, FormEvent, FormObserver, TracingObserver};
use crate::layout::{Control, FormLayout};
use crate::locator::{ClickOptions, Key, Selector};
use crate::reconcile::{reconcile, Reconciliation};
use crate::record::{ConfirmationRecord, FormRecord, FormValues, Gender, Hobby, LABEL_PICTURE};
use crate::result::{FormError, FormResult};
use crate::validators::validate_for_submission;
use crate::wait::{self, ElementState, WaitOptions};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// What the best-effort interference sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Overlays found visible and dismissed
    pub dismissed: Vec<String>,
    /// Overlays found visible whose dismissal failed
    pub failed: Vec<String>,
    /// Elements hidden with `display: none`
    pub hidden: u64,
}

/// Outcome of a successful navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// URL navigated to
    pub url: String,
    /// Document title observed
    pub title: String,
    /// Obstructions removed from the DOM
    pub removed: u64,
    /// Sweep outcome
    pub sweep: SweepReport,
}

/// Result of one verified fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// Field name
    pub field: String,
    /// Fill attempts made
    pub attempts: u32,
    /// Last readback equalled the intended value
    pub verified: bool,
}

/// Visibility of the confirmation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceState {
    /// Not visible; the form accepts input
    Closed,
    /// Visible and covering the form
    Open,
}

/// How the guard left the confirmation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardOutcome {
    /// Nothing was open
    AlreadyClosed,
    /// The close control dismissed it
    Dismissed,
    /// Escape dismissed it after the close control did not
    Escaped,
    /// The page was reloaded
    Reloaded,
}

/// Page object for the practice form
pub struct PracticeFormPage<D: FormDriver> {
    driver: D,
    layout: FormLayout,
    form_url: String,
    timeouts: Timeouts,
    fill_policy: FillPolicy,
    observer: Arc<dyn FormObserver>,
}

impl<D: FormDriver> std::fmt::Debug for PracticeFormPage<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeFormPage")
            .field("form_url", &self.form_url)
            .field("timeouts", &self.timeouts)
            .field("fill_policy", &self.fill_policy)
            .finish_non_exhaustive()
    }
}

impl<D: FormDriver> PracticeFormPage<D> {
    /// Create a page object with default budgets and a tracing observer
    #[must_use]
    pub fn new(driver: D, layout: FormLayout, form_url: impl Into<String>) -> Self {
        Self {
            driver,
            layout,
            form_url: form_url.into(),
            timeouts: Timeouts::default(),
            fill_policy: FillPolicy::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a page object from suite configuration
    #[must_use]
    pub fn from_config(driver: D, config: &SuiteConfig) -> Self {
        let layout = config.layout();
        let form_url = config.form_url(&layout);
        Self::new(driver, layout, form_url)
            .with_timeouts(config.timeouts)
            .with_fill_policy(config.fill_policy)
    }

    /// Set wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set fill policy
    #[must_use]
    pub const fn with_fill_policy(mut self, policy: FillPolicy) -> Self {
        self.fill_policy = policy;
        self
    }

    /// Set the event observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FormObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Layout in use
    #[must_use]
    pub const fn layout(&self) -> &FormLayout {
        &self.layout
    }

    /// Form URL
    #[must_use]
    pub fn form_url(&self) -> &str {
        &self.form_url
    }

    /// Give the driver back
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    fn emit(&self, event: FormEvent) {
        self.observer.on_event(&event);
    }

    fn selector(&self, control: Control) -> FormResult<Selector> {
        self.layout.selector(control).cloned()
    }

    fn required(&self) -> WaitOptions {
        WaitOptions::new(self.timeouts.required(), self.timeouts.poll_interval())
    }

    fn optional(&self) -> WaitOptions {
        WaitOptions::new(self.timeouts.optional(), self.timeouts.poll_interval())
    }

    async fn expect_state(&self, control: Control, state: ElementState) -> FormResult<()> {
        let selector = self.selector(control)?;
        let _ = wait::wait_for_state(&self.driver, &selector, state, self.required()).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation and readiness
    // ------------------------------------------------------------------

    /// Navigate to the form and bring it into a ready state.
    ///
    /// Title, form container and required inputs are hard requirements; the
    /// overlay sweep in between is best-effort.
    pub async fn navigate_to_form(&mut self) -> FormResult<ReadinessReport> {
        let url = self.form_url.clone();
        self.emit(
            FormEvent::new("navigation.start", EventCategory::Navigation)
                .with_attribute("url", &url),
        );
        self.driver.navigate(&url).await?;

        let pattern = Regex::new(&self.layout.title_pattern).map_err(|e| FormError::Config {
            message: format!("invalid title pattern: {e}"),
        })?;
        let _ = wait::wait_for_title(&self.driver, &pattern, self.required()).await?;
        let title = self.driver.title().await?;

        let removed = self.remove_obstructions().await?;
        self.expect_state(Control::FormContainer, ElementState::Visible).await?;
        let sweep = self.neutralize_interference().await;
        self.validate_required_elements_presence().await?;

        self.emit(
            FormEvent::new("navigation.ready", EventCategory::Navigation)
                .with_message(format!("form ready at {url}"))
                .with_attribute("title", &title)
                .with_attribute("removed", removed),
        );
        Ok(ReadinessReport {
            url,
            title,
            removed,
            sweep,
        })
    }

    async fn remove_obstructions(&self) -> FormResult<u64> {
        let mut removed = 0;
        for css in &self.layout.interference.removed {
            let script = format!(
                "(() => {{ const els = document.querySelectorAll({css:?}); els.forEach(el => el.remove()); return els.length; }})()"
            );
            removed += self.driver.execute_js(&script).await?.as_u64().unwrap_or(0);
        }
        if removed > 0 {
            self.emit(
                FormEvent::new("interference.removed", EventCategory::Interference)
                    .with_attribute("count", removed),
            );
        }
        Ok(removed)
    }

    /// Best-effort sweep of dismissable overlays and hideable frames.
    ///
    /// Waits for the page to settle, dismisses every configured overlay that
    /// becomes visible within the optional budget, then hides the configured
    /// elements. Failures are reported, never raised.
    pub async fn neutralize_interference(&self) -> SweepReport {
        wait::pause(std::time::Duration::from_millis(self.timeouts.settle_ms)).await;
        let mut report = SweepReport::default();

        for overlay in &self.layout.interference.dismissable {
            if !wait::probe_visible(&self.driver, overlay, self.optional()).await {
                continue;
            }
            match self.driver.click(overlay, ClickOptions::forced()).await {
                Ok(()) => {
                    self.emit(
                        FormEvent::new("interference.dismissed", EventCategory::Interference)
                            .with_attribute("selector", overlay),
                    );
                    report.dismissed.push(overlay.to_string());
                }
                Err(e) => {
                    self.emit(
                        FormEvent::new("interference.dismiss_failed", EventCategory::Interference)
                            .with_level(EventLevel::Debug)
                            .with_message(e.to_string())
                            .with_attribute("selector", overlay),
                    );
                    report.failed.push(overlay.to_string());
                }
            }
        }

        for css in &self.layout.interference.hidden {
            let script = format!(
                "(() => {{ const els = document.querySelectorAll({css:?}); els.forEach(el => {{ el.style.display = 'none'; }}); return els.length; }})()"
            );
            match self.driver.execute_js(&script).await {
                Ok(count) => report.hidden += count.as_u64().unwrap_or(0),
                Err(e) => self.emit(
                    FormEvent::new("interference.hide_failed", EventCategory::Interference)
                        .with_level(EventLevel::Debug)
                        .with_message(e.to_string())
                        .with_attribute("selector", css),
                ),
            }
        }

        self.emit(
            FormEvent::new("interference.swept", EventCategory::Interference)
                .with_attribute("dismissed", report.dismissed.len())
                .with_attribute("hidden", report.hidden),
        );
        report
    }

    /// Every required input is visible and editable within the required budget
    pub async fn validate_required_elements_presence(&self) -> FormResult<()> {
        for control in Control::REQUIRED_INPUTS {
            self.expect_state(control, ElementState::Visible).await?;
            self.expect_state(control, ElementState::Editable).await?;
        }
        self.emit(
            FormEvent::new("validation.elements_present", EventCategory::Validation)
                .with_attribute("count", Control::REQUIRED_INPUTS.len()),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Text fields
    // ------------------------------------------------------------------

    /// Fill a text input and read it back, re-filling per the fill policy.
    ///
    /// # Errors
    ///
    /// [`FormError::RetryExhausted`] when the last readback still differs and
    /// the policy verifies the final state.
    pub async fn fill_verified(&self, control: Control, value: &str) -> FormResult<FillOutcome> {
        let selector = self.selector(control)?;
        let field = control.field_name();
        let max_attempts = self.fill_policy.max_attempts.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            self.driver.fill(&selector, value).await?;
            let actual = self.driver.input_value(&selector).await?;
            self.emit(
                FormEvent::new("fill.readback", EventCategory::Fill)
                    .with_level(EventLevel::Debug)
                    .with_attribute("field", field)
                    .with_attribute("attempt", attempts)
                    .with_attribute("value", &actual),
            );
            if actual == value {
                self.emit(
                    FormEvent::new("fill.ok", EventCategory::Fill)
                        .with_attribute("field", field)
                        .with_attribute("attempts", attempts),
                );
                return Ok(FillOutcome {
                    field: field.to_string(),
                    attempts,
                    verified: true,
                });
            }
            if attempts >= max_attempts {
                if self.fill_policy.verify_final {
                    self.emit(
                        FormEvent::new("fill.exhausted", EventCategory::Fill)
                            .with_level(EventLevel::Error)
                            .with_attribute("field", field)
                            .with_attribute("actual", &actual),
                    );
                    return Err(FormError::RetryExhausted {
                        field: field.to_string(),
                        expected: value.to_string(),
                        actual,
                        attempts,
                    });
                }
                self.emit(
                    FormEvent::new("fill.unverified", EventCategory::Fill)
                        .with_level(EventLevel::Warn)
                        .with_attribute("field", field)
                        .with_attribute("actual", &actual),
                );
                return Ok(FillOutcome {
                    field: field.to_string(),
                    attempts,
                    verified: false,
                });
            }
            self.emit(
                FormEvent::new("fill.retry", EventCategory::Fill)
                    .with_level(EventLevel::Warn)
                    .with_message(format!("{field} read back {actual:?}, filling again"))
                    .with_attribute("field", field),
            );
        }
    }

    /// Fill the first name
    pub async fn fill_first_name(&self, value: &str) -> FormResult<FillOutcome> {
        self.fill_verified(Control::FirstName, value).await
    }

    /// Fill the last name
    pub async fn fill_last_name(&self, value: &str) -> FormResult<FillOutcome> {
        self.fill_verified(Control::LastName, value).await
    }

    /// Fill the email
    pub async fn fill_email(&self, value: &str) -> FormResult<FillOutcome> {
        self.fill_verified(Control::Email, value).await
    }

    /// Fill the mobile number once its input has rendered
    pub async fn fill_mobile(&self, value: &str) -> FormResult<FillOutcome> {
        self.expect_state(Control::Mobile, ElementState::Visible).await?;
        self.fill_verified(Control::Mobile, value).await
    }

    /// Fill the current address; no readback
    pub async fn fill_current_address(&self, value: &str) -> FormResult<()> {
        let selector = self.selector(Control::CurrentAddress)?;
        self.driver.fill(&selector, value).await?;
        self.emit(FormEvent::new("fill.address", EventCategory::Fill));
        Ok(())
    }

    /// Replace the date of birth by typing it into the picker input
    pub async fn fill_date_of_birth(&self, date: &str) -> FormResult<()> {
        let selector = self.selector(Control::DateOfBirth)?;
        self.driver.click(&selector, ClickOptions::default()).await?;
        self.driver.press_key(None, Key::SelectAll).await?;
        self.driver.press_key(None, Key::Delete).await?;
        self.driver.type_text(&selector, date).await?;
        self.driver.press_key(None, Key::Tab).await?;
        self.emit(
            FormEvent::new("fill.date_of_birth", EventCategory::Fill).with_attribute("value", date),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Choices
    // ------------------------------------------------------------------

    /// Select a gender by name (case-insensitive).
    ///
    /// An unknown name fails with [`FormError::InvalidChoice`] before anything
    /// is clicked.
    pub async fn select_gender(&self, gender: &str) -> FormResult<()> {
        let gender = gender.parse::<Gender>().inspect_err(|e| self.reject_choice(e))?;
        self.select_gender_choice(gender).await
    }

    /// Select a gender
    pub async fn select_gender_choice(&self, gender: Gender) -> FormResult<()> {
        let selector = self.selector(Control::for_gender(gender))?;
        self.driver.click(&selector, ClickOptions::forced()).await?;
        self.emit(
            FormEvent::new("choice.gender", EventCategory::Choice)
                .with_attribute("value", gender.as_str()),
        );
        Ok(())
    }

    /// Enter one subject into the autocomplete and commit it
    pub async fn select_subject(&self, subject: &str) -> FormResult<()> {
        let selector = self.selector(Control::Subjects)?;
        self.driver.click(&selector, ClickOptions::default()).await?;
        self.driver.type_text(&selector, subject).await?;
        self.driver.press_key(None, Key::Enter).await?;
        self.emit(
            FormEvent::new("choice.subject", EventCategory::Choice)
                .with_attribute("value", subject),
        );
        Ok(())
    }

    /// Toggle a hobby by name (case-insensitive).
    ///
    /// The name is checked first; an unknown hobby fails with
    /// [`FormError::InvalidChoice`] and neither the guard nor a click runs.
    pub async fn select_hobby(&mut self, hobby: &str) -> FormResult<()> {
        let hobby = hobby.parse::<Hobby>().inspect_err(|e| self.reject_choice(e))?;
        self.select_hobby_choice(hobby).await
    }

    /// Toggle a hobby, closing a leftover confirmation surface first
    pub async fn select_hobby_choice(&mut self, hobby: Hobby) -> FormResult<()> {
        let _ = self.ensure_no_modal_open().await?;
        let selector = self.selector(Control::for_hobby(hobby))?;
        self.driver.click(&selector, ClickOptions::forced()).await?;
        self.emit(
            FormEvent::new("choice.hobby", EventCategory::Choice)
                .with_attribute("value", hobby.as_str()),
        );
        Ok(())
    }

    /// Open the state dropdown and pick the option showing `state`
    pub async fn select_state(&self, state: &str) -> FormResult<()> {
        self.select_option(Control::State, Control::StateOption, state).await
    }

    /// Open the city dropdown and pick the option showing `city`.
    ///
    /// The city must belong to the chosen state; that is not checked here.
    pub async fn select_city(&self, city: &str) -> FormResult<()> {
        self.select_option(Control::City, Control::CityOption, city).await
    }

    async fn select_option(
        &self,
        dropdown: Control,
        option: Control,
        text: &str,
    ) -> FormResult<()> {
        let dropdown_selector = self.selector(dropdown)?;
        self.driver
            .click(&dropdown_selector, ClickOptions::default())
            .await?;
        let option_selector = self.layout.option(option, text)?;
        let _ = wait::wait_for_state(
            &self.driver,
            &option_selector,
            ElementState::Visible,
            self.required(),
        )
        .await?;
        self.driver
            .click(&option_selector, ClickOptions::default())
            .await?;
        self.emit(
            FormEvent::new("choice.dropdown", EventCategory::Choice)
                .with_attribute("control", dropdown)
                .with_attribute("value", text),
        );
        Ok(())
    }

    fn reject_choice(&self, error: &FormError) {
        self.emit(
            FormEvent::new("choice.rejected", EventCategory::Validation)
                .with_level(EventLevel::Error)
                .with_message(error.to_string()),
        );
    }

    /// Attach a local file to the picture input; passed through unchecked
    pub async fn upload_picture(&self, path: &Path) -> FormResult<()> {
        let selector = self.selector(Control::PictureUpload)?;
        self.driver.set_input_files(&selector, path).await?;
        self.emit(
            FormEvent::new("fill.picture", EventCategory::Fill)
                .with_attribute("path", path.display()),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Whole-record population and submission
    // ------------------------------------------------------------------

    /// Apply every present field of `record`, in page order.
    ///
    /// The record is validated before the page is touched.
    pub async fn populate(&mut self, record: &FormRecord) -> FormResult<()> {
        validate_for_submission(record).inspect_err(|e| {
            self.emit(
                FormEvent::new("validation.rejected", EventCategory::Validation)
                    .with_level(EventLevel::Error)
                    .with_message(e.to_string()),
            );
        })?;

        let _ = self.fill_first_name(&record.first_name).await?;
        let _ = self.fill_last_name(&record.last_name).await?;
        let _ = self.fill_email(&record.email).await?;
        if let Some(gender) = record.gender {
            self.select_gender_choice(gender).await?;
        }
        let _ = self.fill_mobile(&record.mobile).await?;
        if let Some(date) = &record.date_of_birth {
            self.fill_date_of_birth(date).await?;
        }
        for subject in &record.subjects {
            self.select_subject(subject).await?;
        }
        for hobby in &record.hobbies {
            self.select_hobby_choice(*hobby).await?;
        }
        if let Some(picture) = &record.picture {
            self.upload_picture(picture).await?;
        }
        if !record.address.is_empty() {
            self.fill_current_address(&record.address).await?;
        }
        if let Some(state) = &record.state {
            self.select_state(state).await?;
            if let Some(city) = &record.city {
                self.select_city(city).await?;
            }
        }
        self.emit(
            FormEvent::new("fill.record", EventCategory::Fill)
                .with_attribute("name", record.full_name()),
        );
        Ok(())
    }

    /// Click submit
    pub async fn submit_form(&self) -> FormResult<()> {
        let selector = self.selector(Control::Submit)?;
        self.driver.click(&selector, ClickOptions::default()).await?;
        self.emit(FormEvent::new("submission.clicked", EventCategory::Submission));
        Ok(())
    }

    /// Wait for the confirmation surface and its success title
    pub async fn await_confirmation(&self) -> FormResult<()> {
        self.expect_state(Control::Modal, ElementState::Visible).await?;
        let title = self.selector(Control::ModalTitle)?;
        let _ = wait::wait_for_text(
            &self.driver,
            &title,
            &self.layout.success_phrase,
            self.required(),
        )
        .await?;
        self.emit(FormEvent::new("submission.confirmed", EventCategory::Submission));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Confirmation surface
    // ------------------------------------------------------------------

    /// Current visibility of the confirmation surface; query errors read as closed
    pub async fn surface_state(&self) -> SurfaceState {
        let Ok(modal) = self.selector(Control::Modal) else {
            return SurfaceState::Closed;
        };
        if self.driver.is_visible(&modal).await.unwrap_or(false) {
            SurfaceState::Open
        } else {
            SurfaceState::Closed
        }
    }

    /// Read the confirmation table; the surface must be visible
    pub async fn confirmation_record(&self) -> FormResult<ConfirmationRecord> {
        self.expect_state(Control::Modal, ElementState::Visible).await?;
        let body = self.selector(Control::ModalBody)?;
        let rows = self.driver.table_rows(&body).await?;
        let record = ConfirmationRecord::from_rows(&rows);
        self.emit(
            FormEvent::new("submission.extracted", EventCategory::Submission)
                .with_level(EventLevel::Debug)
                .with_attribute("rows", record.len()),
        );
        Ok(record)
    }

    /// Read the required text inputs back from the page
    pub async fn form_values(&self) -> FormResult<FormValues> {
        let read = |control: Control| async move {
            let selector = self.selector(control)?;
            self.driver.input_value(&selector).await
        };
        Ok(FormValues {
            first_name: read(Control::FirstName).await?,
            last_name: read(Control::LastName).await?,
            email: read(Control::Email).await?,
            mobile: read(Control::Mobile).await?,
            address: read(Control::CurrentAddress).await?,
        })
    }

    /// Reconcile the record against the confirmation table
    pub async fn verify_confirmation(&self, record: &FormRecord) -> FormResult<ConfirmationRecord> {
        let confirmation = self.confirmation_record().await?;
        self.reconcile_and_report(&FormValues::from(record), &confirmation)?;
        Ok(confirmation)
    }

    /// Reconcile the live input values against the confirmation table
    pub async fn verify_form_matches_confirmation(&self) -> FormResult<Reconciliation> {
        let form_values = self.form_values().await?;
        let confirmation = self.confirmation_record().await?;
        self.reconcile_and_report(&form_values, &confirmation)?;
        Ok(Reconciliation {
            form_values,
            confirmation,
        })
    }

    fn reconcile_and_report(
        &self,
        expected: &FormValues,
        confirmation: &ConfirmationRecord,
    ) -> FormResult<()> {
        match reconcile(expected, confirmation) {
            Ok(()) => {
                self.emit(FormEvent::new("reconcile.ok", EventCategory::Reconciliation));
                Ok(())
            }
            Err(e) => {
                self.emit(
                    FormEvent::new("reconcile.mismatch", EventCategory::Reconciliation)
                        .with_level(EventLevel::Error)
                        .with_message(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// The surface shows the success title and every non-empty expected value
    /// appears in some table cell, label cells included
    pub async fn expect_confirmation_contains<S: AsRef<str>>(
        &self,
        expected: &[S],
    ) -> FormResult<()> {
        self.await_confirmation().await?;
        let confirmation = self.confirmation_record().await?;
        for value in expected.iter().map(AsRef::as_ref).filter(|v| !v.is_empty()) {
            if !confirmation.any_cell_contains(value) {
                return Err(FormError::MismatchFailure {
                    field: "confirmation".to_string(),
                    expected: value.to_string(),
                    actual: String::new(),
                });
            }
        }
        Ok(())
    }

    /// The "Picture" row equals `file_name`
    pub async fn uploaded_file_matches(&self, file_name: &str) -> FormResult<()> {
        let confirmation = self.confirmation_record().await?;
        let actual = confirmation.value_or_empty(LABEL_PICTURE);
        if actual == file_name {
            Ok(())
        } else {
            Err(FormError::MismatchFailure {
                field: "picture".to_string(),
                expected: file_name.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    /// Click the close control and wait for the surface to disappear
    pub async fn close_confirmation(&self) -> FormResult<()> {
        let close = self.selector(Control::ModalClose)?;
        self.driver.click(&close, ClickOptions::default()).await?;
        self.expect_state(Control::Modal, ElementState::Hidden).await?;
        self.emit(FormEvent::new("submission.closed", EventCategory::Submission));
        Ok(())
    }

    /// Make sure no confirmation surface covers the form.
    ///
    /// Closed is a no-op beyond one visibility query. Otherwise: click close
    /// within the dismiss budget, pause, re-check; press Escape if still open;
    /// reload when a step fails or the surface survives Escape. The only
    /// error is a failed reload.
    pub async fn ensure_no_modal_open(&mut self) -> FormResult<GuardOutcome> {
        if self.surface_state().await == SurfaceState::Closed {
            return Ok(GuardOutcome::AlreadyClosed);
        }
        self.emit(
            FormEvent::new("guard.open_detected", EventCategory::Guard)
                .with_level(EventLevel::Warn),
        );

        let outcome = match self.dismiss_surface().await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => self.reload_page("surface survived Escape").await?,
            Err(e) => self.reload_page(&e.to_string()).await?,
        };
        self.emit(
            FormEvent::new("guard.recovered", EventCategory::Guard)
                .with_attribute("outcome", format!("{outcome:?}")),
        );
        Ok(outcome)
    }

    async fn dismiss_surface(&self) -> FormResult<Option<GuardOutcome>> {
        let close = self.selector(Control::ModalClose)?;
        let dismiss_budget = std::time::Duration::from_millis(self.timeouts.dismiss_ms);
        tokio::time::timeout(
            dismiss_budget,
            self.driver.click(&close, ClickOptions::default()),
        )
        .await
        .map_err(|_| FormError::AssertionTimeout {
            waited_for: format!("{close} to accept a click"),
            ms: self.timeouts.dismiss_ms,
        })??;
        wait::pause(std::time::Duration::from_millis(self.timeouts.post_dismiss_ms)).await;
        if self.surface_state().await == SurfaceState::Closed {
            return Ok(Some(GuardOutcome::Dismissed));
        }

        self.emit(
            FormEvent::new("guard.escape", EventCategory::Guard).with_level(EventLevel::Warn),
        );
        self.driver.press_key(None, Key::Escape).await?;
        wait::pause(std::time::Duration::from_millis(self.timeouts.escape_ms)).await;
        if self.surface_state().await == SurfaceState::Closed {
            Ok(Some(GuardOutcome::Escaped))
        } else {
            Ok(None)
        }
    }

    async fn reload_page(&mut self, reason: &str) -> FormResult<GuardOutcome> {
        self.emit(
            FormEvent::new("guard.reload", EventCategory::Guard)
                .with_level(EventLevel::Warn)
                .with_message(reason.to_string()),
        );
        self.driver.reload().await?;
        wait::pause(std::time::Duration::from_millis(self.timeouts.reload_settle_ms)).await;
        Ok(GuardOutcome::Reloaded)
    }

    // ------------------------------------------------------------------
    // Whole cycle
    // ------------------------------------------------------------------

    /// Populate, submit, await the surface, reconcile against `record`, dismiss
    pub async fn submit_and_verify(
        &mut self,
        record: &FormRecord,
    ) -> FormResult<ConfirmationRecord> {
        self.populate(record).await?;
        self.submit_form().await?;
        self.await_confirmation().await?;
        let confirmation = self.verify_confirmation(record).await?;
        self.close_confirmation().await?;
        Ok(confirmation)
    }

    /// Capture the current page
    pub async fn screenshot(&self) -> FormResult<Screenshot> {
        self.driver.screenshot().await
    }

    /// Release the page
    pub async fn close(&mut self) -> FormResult<()> {
        self.driver.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventLog;
    use crate::mock::{ModalBehaviour, SimulatedForm};

    const URL: &str = "https://demoqa.com/automation-practice-form";

    fn page_for(sim: &SimulatedForm) -> (PracticeFormPage<SimulatedForm>, Arc<EventLog>) {
        let log = Arc::new(EventLog::new("unit"));
        let page = PracticeFormPage::new(sim.clone(), FormLayout::demoqa(), URL)
            .with_timeouts(Timeouts::tight())
            .with_observer(log.clone());
        (page, log)
    }

    async fn ready(sim: &SimulatedForm) -> (PracticeFormPage<SimulatedForm>, Arc<EventLog>) {
        let (mut page, log) = page_for(sim);
        let _ = page.navigate_to_form().await.unwrap();
        sim.clear_calls();
        (page, log)
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigation_removes_and_sweeps() {
            let sim = SimulatedForm::default()
                .with_ad("#fixedban")
                .with_ad("iframe[src*=\"doubleclick\"]")
                .with_overlay(".popup-close");
            let (mut page, log) = page_for(&sim);
            let report = page.navigate_to_form().await.unwrap();
            assert_eq!(report.title, "DEMOQA");
            assert_eq!(report.removed, 1);
            assert_eq!(report.sweep.dismissed, vec![".popup-close".to_string()]);
            assert_eq!(report.sweep.hidden, 1);
            assert!(sim.ads().is_empty());
            assert!(sim.overlays().is_empty());
            assert!(log.contains("navigation.ready"));
        }

        #[tokio::test]
        async fn test_wrong_title_times_out() {
            let sim = SimulatedForm::default().with_title("Something else");
            let (mut page, _) = page_for(&sim);
            let err = page.navigate_to_form().await.unwrap_err();
            assert!(matches!(err, FormError::AssertionTimeout { .. }));
        }

        #[tokio::test]
        async fn test_missing_required_input_fails_readiness() {
            let sim = SimulatedForm::default().with_hidden_control(Control::CurrentAddress);
            let (mut page, _) = page_for(&sim);
            let err = page.navigate_to_form().await.unwrap_err();
            match err {
                FormError::AssertionTimeout { waited_for, .. } => {
                    assert!(waited_for.contains("#currentAddress"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod fill_tests {
        use super::*;

        #[tokio::test]
        async fn test_single_glitch_recovered_by_refill() {
            let sim = SimulatedForm::default().with_fill_glitch(Control::Email, 1);
            let (page, log) = ready(&sim).await;
            let outcome = page.fill_email("jane@example.com").await.unwrap();
            assert_eq!(outcome.attempts, 2);
            assert!(outcome.verified);
            assert!(log.contains("fill.retry"));
        }

        #[tokio::test]
        async fn test_persistent_glitch_exhausts_retries() {
            let sim = SimulatedForm::default().with_fill_glitch(Control::FirstName, 5);
            let (page, _) = ready(&sim).await;
            match page.fill_first_name("Jane").await.unwrap_err() {
                FormError::RetryExhausted {
                    field,
                    expected,
                    actual,
                    attempts,
                } => {
                    assert_eq!(field, "firstName");
                    assert_eq!(expected, "Jane");
                    assert_eq!(actual, "Jan");
                    assert_eq!(attempts, 2);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(sim.call_count("fill:#firstName"), 2);
        }

        #[tokio::test]
        async fn test_legacy_policy_accepts_mismatch() {
            let sim = SimulatedForm::default().with_fill_glitch(Control::FirstName, 5);
            let (page, log) = ready(&sim).await;
            let page = page.with_fill_policy(FillPolicy::legacy());
            let outcome = page.fill_first_name("Jane").await.unwrap();
            assert!(!outcome.verified);
            assert!(log.contains("fill.unverified"));
        }

        #[tokio::test]
        async fn test_mobile_waits_for_render() {
            let sim = SimulatedForm::default();
            let mut driver = sim.clone().with_mobile_render_delay(3);
            driver.navigate(URL).await.unwrap();
            let (page, _) = page_for(&sim);
            page.fill_mobile("9876543210").await.unwrap();
            assert_eq!(sim.call_count("is_visible:#userNumber"), 4);
            assert_eq!(sim.value(Control::Mobile), "9876543210");
        }

        #[tokio::test]
        async fn test_date_of_birth_replaces_value() {
            let sim = SimulatedForm::default();
            let (page, _) = ready(&sim).await;
            page.fill_date_of_birth("18 Oct 2026").await.unwrap();
            page.fill_date_of_birth("15 Jul 1990").await.unwrap();
            assert_eq!(sim.value(Control::DateOfBirth), "15 Jul 1990");
        }
    }

    mod choice_tests {
        use super::*;

        #[tokio::test]
        async fn test_gender_case_insensitive() {
            let sim = SimulatedForm::default();
            let (page, _) = ready(&sim).await;
            page.select_gender("fEmAlE").await.unwrap();
            assert_eq!(sim.gender(), Some(Gender::Female));
        }

        #[tokio::test]
        async fn test_unknown_gender_clicks_nothing() {
            let sim = SimulatedForm::default();
            let (page, log) = ready(&sim).await;
            let err = page.select_gender("banana").await.unwrap_err();
            assert!(matches!(err, FormError::InvalidChoice { .. }));
            assert!(!sim.was_called("click"));
            assert!(log.contains("choice.rejected"));
        }

        #[tokio::test]
        async fn test_unknown_hobby_skips_guard() {
            let sim = SimulatedForm::default();
            let (mut page, _) = ready(&sim).await;
            assert!(page.select_hobby("Chess").await.is_err());
            assert!(sim.calls().is_empty());
        }

        #[tokio::test]
        async fn test_subjects_and_dropdowns() {
            let sim = SimulatedForm::default();
            let (page, _) = ready(&sim).await;
            page.select_subject("Maths").await.unwrap();
            page.select_subject("Physics").await.unwrap();
            page.select_state("NCR").await.unwrap();
            page.select_city("Delhi").await.unwrap();
            assert_eq!(sim.subjects(), vec!["Maths", "Physics"]);
            assert_eq!(
                sim.state_city(),
                (Some("NCR".to_string()), Some("Delhi".to_string()))
            );
        }
    }

    mod guard_tests {
        use super::*;

        #[tokio::test]
        async fn test_closed_is_single_query() {
            let sim = SimulatedForm::default();
            let (mut page, _) = ready(&sim).await;
            assert_eq!(
                page.ensure_no_modal_open().await.unwrap(),
                GuardOutcome::AlreadyClosed
            );
            assert_eq!(sim.calls(), vec!["is_visible:.modal-dialog".to_string()]);
        }

        #[tokio::test]
        async fn test_outcomes_per_behaviour() {
            let cases = [
                (ModalBehaviour::Normal, GuardOutcome::Dismissed),
                (ModalBehaviour::IgnoresClose, GuardOutcome::Escaped),
                (ModalBehaviour::CloseFails, GuardOutcome::Reloaded),
                (ModalBehaviour::Stuck, GuardOutcome::Reloaded),
            ];
            for (behaviour, expected) in cases {
                let sim = SimulatedForm::default().with_modal_behaviour(behaviour);
                let (mut page, _) = ready(&sim).await;
                sim.open_modal();
                assert_eq!(page.ensure_no_modal_open().await.unwrap(), expected);
                assert!(!sim.modal_open(), "{behaviour:?} left the modal open");
            }
        }
    }

    mod confirmation_tests {
        use super::*;
        use crate::record::{LABEL_MOBILE, LABEL_STUDENT_NAME};

        fn jane() -> FormRecord {
            FormRecord::new("Jane", "Smith", "jane.smith@example.com", "9876543210", "")
                .with_gender(Gender::Female)
        }

        #[tokio::test]
        async fn test_submit_and_verify_roundtrip() {
            let sim = SimulatedForm::default();
            let (mut page, log) = ready(&sim).await;
            let confirmation = page.submit_and_verify(&jane()).await.unwrap();
            assert_eq!(confirmation.get(LABEL_STUDENT_NAME), Some("Jane Smith"));
            assert_eq!(confirmation.get(LABEL_MOBILE), Some("9876543210"));
            assert!(!sim.modal_open());
            assert!(log.contains("reconcile.ok"));
            assert!(log.contains("submission.closed"));
        }

        #[tokio::test]
        async fn test_echo_mismatch_is_reported() {
            let sim = SimulatedForm::default().with_echo_override("Mobile", "0000000000");
            let (mut page, _) = ready(&sim).await;
            let err = page.submit_and_verify(&jane()).await.unwrap_err();
            assert!(matches!(err, FormError::MismatchFailure { field, .. } if field == "mobile"));
        }

        #[tokio::test]
        async fn test_invalid_record_rejected_before_page_mutation() {
            let sim = SimulatedForm::default();
            let (mut page, _) = ready(&sim).await;
            let record = FormRecord::new("", "", "invalid-email", "123", "");
            let err = page.populate(&record).await.unwrap_err();
            assert!(err.is_precondition());
            assert!(sim.calls().is_empty());
        }

        #[tokio::test]
        async fn test_unsubmittable_page_times_out() {
            let sim = SimulatedForm::default();
            let (page, _) = ready(&sim).await;
            let _ = page.fill_first_name("Jane").await.unwrap();
            page.submit_form().await.unwrap();
            let err = page.await_confirmation().await.unwrap_err();
            assert!(matches!(err, FormError::AssertionTimeout { .. }));
        }

        #[tokio::test]
        async fn test_expect_contains_and_picture() {
            let dir = tempfile::tempdir().unwrap();
            let picture = dir.path().join("avatar.png");
            std::fs::write(&picture, b"png").unwrap();

            let sim = SimulatedForm::default();
            let (mut page, _) = ready(&sim).await;
            page.populate(&jane().with_picture(&picture)).await.unwrap();
            page.submit_form().await.unwrap();
            page.expect_confirmation_contains(&["Jane Smith", "", "Female", "Student Email"])
                .await
                .unwrap();
            page.uploaded_file_matches("avatar.png").await.unwrap();
            assert!(page.uploaded_file_matches("other.png").await.is_err());
            assert!(page
                .expect_confirmation_contains(&["Nobody"])
                .await
                .is_err());
        }
    }
}
