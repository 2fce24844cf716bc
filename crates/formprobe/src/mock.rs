//! In-memory rendition of the practice form for tests.
//!
//! [`SimulatedForm`] implements [`FormDriver`] by resolving every selector
//! through a [`FormLayout`] and applying the interaction to a small page
//! model: text inputs, radio and checkbox groups, autocomplete subjects,
//! dependent dropdowns, file input and the confirmation modal. Every call is
//! recorded so tests can assert on what was (or was not) dispatched.
//!
//! Clones share the same page, so a test can keep a handle after moving the
//! driver into a page object.

use crate::driver::{FormDriver, Screenshot};
use crate::layout::{Control, FormLayout};
use crate::locator::{ClickOptions, Key, Selector};
use crate::record::{Gender, Hobby, LABEL_PICTURE};
use crate::result::{FormError, FormResult};
use crate::validators::{validate_email, validate_mobile};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Title served by the simulated host
pub const SIMULATED_TITLE: &str = "DEMOQA";

/// How the confirmation modal reacts to being dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalBehaviour {
    /// Close button closes it
    #[default]
    Normal,
    /// Close button is clickable but the modal stays; Escape closes it
    IgnoresClose,
    /// Clicking the close button fails
    CloseFails,
    /// Neither the close button nor Escape closes it
    Stuck,
}

const TEXT_INPUTS: [Control; 7] = [
    Control::FirstName,
    Control::LastName,
    Control::Email,
    Control::Mobile,
    Control::DateOfBirth,
    Control::Subjects,
    Control::CurrentAddress,
];

const MODAL_CONTROLS: [Control; 4] = [
    Control::Modal,
    Control::ModalTitle,
    Control::ModalBody,
    Control::ModalClose,
];

#[derive(Debug, Default)]
struct PageState {
    loaded: bool,
    url: String,
    title: String,
    values: HashMap<Control, String>,
    selected_all: Option<Control>,
    focused: Option<Control>,
    gender: Option<Gender>,
    hobbies: BTreeSet<Hobby>,
    subjects: Vec<String>,
    open_dropdown: Option<Control>,
    state: Option<String>,
    city: Option<String>,
    picture: Option<String>,
    modal_open: bool,
    modal_rows: Vec<Vec<String>>,
    ads: Vec<String>,
    hidden: Vec<String>,
    overlays: Vec<Selector>,
    mobile_hidden_polls: u32,
    fill_glitches: HashMap<Control, u32>,
    reloads: u32,
    submissions: u32,
    calls: Vec<String>,
}

#[derive(Debug, Default)]
struct PageScript {
    title: String,
    ads: Vec<String>,
    overlays: Vec<Selector>,
    mobile_render_delay: u32,
    hidden_controls: BTreeSet<Control>,
    modal_behaviour: ModalBehaviour,
    echo_overrides: BTreeMap<String, String>,
}

/// Simulated practice form page
#[derive(Debug, Clone)]
pub struct SimulatedForm {
    layout: Arc<FormLayout>,
    script: Arc<Mutex<PageScript>>,
    state: Arc<Mutex<PageState>>,
}

impl Default for SimulatedForm {
    fn default() -> Self {
        Self::new(FormLayout::demoqa())
    }
}

impl SimulatedForm {
    /// Create a well-behaved page for `layout`
    #[must_use]
    pub fn new(layout: FormLayout) -> Self {
        Self {
            layout: Arc::new(layout),
            script: Arc::new(Mutex::new(PageScript {
                title: SIMULATED_TITLE.to_string(),
                ..PageScript::default()
            })),
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    /// Serve a different document title
    #[must_use]
    pub fn with_title(self, title: &str) -> Self {
        self.script().title = title.to_string();
        self
    }

    /// Render an advertisement matching `css` on every load
    #[must_use]
    pub fn with_ad(self, css: &str) -> Self {
        self.script().ads.push(css.to_string());
        self
    }

    /// Render a dismissable overlay on every load; it intercepts unforced
    /// clicks on the form until dismissed
    #[must_use]
    pub fn with_overlay(self, selector: impl Into<Selector>) -> Self {
        self.script().overlays.push(selector.into());
        self
    }

    /// Mobile input reports invisible for the first `polls` visibility checks
    #[must_use]
    pub fn with_mobile_render_delay(self, polls: u32) -> Self {
        self.script().mobile_render_delay = polls;
        self
    }

    /// The first `drops` fills of `control` lose their last character
    #[must_use]
    pub fn with_fill_glitch(self, control: Control, drops: u32) -> Self {
        let _ = self.lock().fill_glitches.insert(control, drops);
        self
    }

    /// Never render `control`
    #[must_use]
    pub fn with_hidden_control(self, control: Control) -> Self {
        let _ = self.script().hidden_controls.insert(control);
        self
    }

    /// Set how the modal reacts to dismissal
    #[must_use]
    pub fn with_modal_behaviour(self, behaviour: ModalBehaviour) -> Self {
        self.script().modal_behaviour = behaviour;
        self
    }

    /// Echo `value` under `label` instead of the submitted value
    #[must_use]
    pub fn with_echo_override(self, label: &str, value: &str) -> Self {
        let _ = self
            .script()
            .echo_overrides
            .insert(label.to_string(), value.to_string());
        self
    }

    /// Open the confirmation modal without a submission, as a leftover from
    /// an earlier step would
    pub fn open_modal(&self) {
        let mut state = self.lock();
        state.modal_rows = Self::rows_for(&state, &BTreeMap::new());
        state.modal_open = true;
    }

    /// Every call received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Check if a call starting with `prefix` was received
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().calls.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Index of the first call starting with `prefix`
    #[must_use]
    pub fn first_call(&self, prefix: &str) -> Option<usize> {
        self.lock().calls.iter().position(|c| c.starts_with(prefix))
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current value of a text input
    #[must_use]
    pub fn value(&self, control: Control) -> String {
        self.lock().values.get(&control).cloned().unwrap_or_default()
    }

    /// Checked gender
    #[must_use]
    pub fn gender(&self) -> Option<Gender> {
        self.lock().gender
    }

    /// Ticked hobbies
    #[must_use]
    pub fn hobbies(&self) -> BTreeSet<Hobby> {
        self.lock().hobbies.clone()
    }

    /// Committed subjects
    #[must_use]
    pub fn subjects(&self) -> Vec<String> {
        self.lock().subjects.clone()
    }

    /// Chosen state and city
    #[must_use]
    pub fn state_city(&self) -> (Option<String>, Option<String>) {
        let state = self.lock();
        (state.state.clone(), state.city.clone())
    }

    /// Attached file name
    #[must_use]
    pub fn picture(&self) -> Option<String> {
        self.lock().picture.clone()
    }

    /// Whether the modal is open
    #[must_use]
    pub fn modal_open(&self) -> bool {
        self.lock().modal_open
    }

    /// Ads still rendered
    #[must_use]
    pub fn ads(&self) -> Vec<String> {
        self.lock().ads.clone()
    }

    /// Ads hidden rather than removed
    #[must_use]
    pub fn hidden_ads(&self) -> Vec<String> {
        self.lock().hidden.clone()
    }

    /// Overlays still rendered
    #[must_use]
    pub fn overlays(&self) -> Vec<Selector> {
        self.lock().overlays.clone()
    }

    /// Number of reloads
    #[must_use]
    pub fn reload_count(&self) -> u32 {
        self.lock().reloads
    }

    /// Number of accepted submissions
    #[must_use]
    pub fn submission_count(&self) -> u32 {
        self.lock().submissions
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn script(&self) -> MutexGuard<'_, PageScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }

    fn load(&self, url: &str) {
        let (title, ads, overlays, mobile_delay) = {
            let script = self.script();
            (
                script.title.clone(),
                script.ads.clone(),
                script.overlays.clone(),
                script.mobile_render_delay,
            )
        };
        let mut state = self.lock();
        let calls = std::mem::take(&mut state.calls);
        let reloads = state.reloads;
        let submissions = state.submissions;
        let fill_glitches = std::mem::take(&mut state.fill_glitches);
        *state = PageState {
            loaded: true,
            url: url.to_string(),
            title,
            ads,
            overlays,
            mobile_hidden_polls: mobile_delay,
            fill_glitches,
            reloads,
            submissions,
            calls,
            ..PageState::default()
        };
    }

    fn resolve(&self, selector: &Selector) -> FormResult<Control> {
        self.layout
            .control_for(selector)
            .ok_or_else(|| FormError::element(selector, "no element matches"))
    }

    fn option_of(&self, selector: &Selector) -> Option<(Control, String)> {
        let Selector::CssWithText { css, text } = selector else {
            return None;
        };
        [Control::StateOption, Control::CityOption]
            .into_iter()
            .find(|c| {
                self.layout
                    .selector(*c)
                    .is_ok_and(|s| s.css_part() == css.as_str())
            })
            .map(|c| (c, text.clone()))
    }

    fn rows_for(state: &PageState, overrides: &BTreeMap<String, String>) -> Vec<Vec<String>> {
        let value = |c: Control| state.values.get(&c).cloned().unwrap_or_default();
        let mut rows = vec![
            (
                "Student Name",
                format!("{} {}", value(Control::FirstName), value(Control::LastName)),
            ),
            ("Student Email", value(Control::Email)),
            (
                "Gender",
                state.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
            ),
            ("Mobile", value(Control::Mobile)),
            ("Date of Birth", value(Control::DateOfBirth)),
            ("Subjects", state.subjects.join(", ")),
            (
                "Hobbies",
                state
                    .hobbies
                    .iter()
                    .map(Hobby::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            (LABEL_PICTURE, state.picture.clone().unwrap_or_default()),
            ("Address", value(Control::CurrentAddress)),
            (
                "State and City",
                [state.state.clone(), state.city.clone()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        ];
        for (label, value) in &mut rows {
            if let Some(over) = overrides.get(*label) {
                value.clone_from(over);
            }
        }
        // header row renders `th` cells only
        let mut table = vec![Vec::new()];
        table.extend(
            rows.into_iter()
                .map(|(label, value)| vec![label.to_string(), value]),
        );
        table
    }

    fn accepts_submission(state: &PageState) -> bool {
        let value = |c: Control| state.values.get(&c).cloned().unwrap_or_default();
        let email = value(Control::Email);
        !value(Control::FirstName).is_empty()
            && !value(Control::LastName).is_empty()
            && state.gender.is_some()
            && validate_mobile(&value(Control::Mobile))
            && (email.is_empty() || validate_email(&email))
    }

    fn control_visible(&self, state: &mut PageState, control: Control) -> bool {
        if !state.loaded || self.script().hidden_controls.contains(&control) {
            return false;
        }
        if MODAL_CONTROLS.contains(&control) {
            return state.modal_open;
        }
        match control {
            Control::Mobile if state.mobile_hidden_polls > 0 => {
                state.mobile_hidden_polls -= 1;
                false
            }
            Control::StateOption | Control::CityOption => {
                state.open_dropdown == Some(dropdown_of(control))
            }
            _ => true,
        }
    }

    fn click_control(
        &self,
        state: &mut PageState,
        control: Control,
        selector: &Selector,
        options: ClickOptions,
    ) -> FormResult<()> {
        if !MODAL_CONTROLS.contains(&control) && !options.force {
            if let Some(overlay) = state.overlays.first() {
                return Err(FormError::element(
                    selector,
                    format!("click intercepted by {overlay}"),
                ));
            }
            if state.modal_open {
                return Err(FormError::element(selector, "click intercepted by modal"));
            }
        }
        state.focused = Some(control);
        match control {
            Control::GenderMale => state.gender = Some(Gender::Male),
            Control::GenderFemale => state.gender = Some(Gender::Female),
            Control::GenderOther => state.gender = Some(Gender::Other),
            Control::HobbySports | Control::HobbyReading | Control::HobbyMusic => {
                let hobby = match control {
                    Control::HobbySports => Hobby::Sports,
                    Control::HobbyReading => Hobby::Reading,
                    _ => Hobby::Music,
                };
                if !state.hobbies.remove(&hobby) {
                    let _ = state.hobbies.insert(hobby);
                }
            }
            Control::State => state.open_dropdown = Some(Control::State),
            Control::City => {
                if state.state.is_none() {
                    return Err(FormError::element(selector, "city is disabled"));
                }
                state.open_dropdown = Some(Control::City);
            }
            Control::Submit => {
                if Self::accepts_submission(state) {
                    let overrides = self.script().echo_overrides.clone();
                    state.modal_rows = Self::rows_for(state, &overrides);
                    state.modal_open = true;
                    state.submissions += 1;
                }
            }
            Control::ModalClose => {
                if !state.modal_open {
                    return Err(FormError::element(selector, "element is not visible"));
                }
                let behaviour = self.script().modal_behaviour;
                match behaviour {
                    ModalBehaviour::Normal => state.modal_open = false,
                    ModalBehaviour::CloseFails => {
                        return Err(FormError::element(selector, "close button detached"));
                    }
                    ModalBehaviour::IgnoresClose | ModalBehaviour::Stuck => {}
                }
            }
            Control::Modal | Control::ModalTitle | Control::ModalBody => {
                if !state.modal_open {
                    return Err(FormError::element(selector, "element is not visible"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

const fn dropdown_of(option: Control) -> Control {
    match option {
        Control::CityOption => Control::City,
        _ => Control::State,
    }
}

fn quoted(css: &str) -> String {
    format!("{css:?}")
}

#[async_trait]
impl FormDriver for SimulatedForm {
    async fn navigate(&mut self, url: &str) -> FormResult<()> {
        self.record(format!("navigate:{url}"));
        self.load(url);
        Ok(())
    }

    async fn title(&self) -> FormResult<String> {
        self.record("title".to_string());
        Ok(self.lock().title.clone())
    }

    async fn current_url(&self) -> FormResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn reload(&mut self) -> FormResult<()> {
        self.record("reload".to_string());
        let url = {
            let mut state = self.lock();
            state.reloads += 1;
            state.url.clone()
        };
        self.load(&url);
        Ok(())
    }

    async fn execute_js(&self, script: &str) -> FormResult<serde_json::Value> {
        self.record("execute_js".to_string());
        let mut state = self.lock();
        if !state.loaded {
            return Err(FormError::ScriptError {
                message: "no document loaded".to_string(),
            });
        }
        let matching: Vec<String> = state
            .ads
            .iter()
            .filter(|css| script.contains(&quoted(css)))
            .cloned()
            .collect();
        state.ads.retain(|css| !matching.contains(css));
        if script.contains("display") {
            state.hidden.extend(matching.iter().cloned());
        }
        Ok(json!(matching.len()))
    }

    async fn fill(&self, selector: &Selector, value: &str) -> FormResult<()> {
        self.record(format!("fill:{selector}={value}"));
        let control = self.resolve(selector)?;
        if !TEXT_INPUTS.contains(&control) {
            return Err(FormError::element(selector, "element is not an input"));
        }
        let mut state = self.lock();
        let stored = match state.fill_glitches.get_mut(&control) {
            Some(drops) if *drops > 0 => {
                *drops -= 1;
                let mut chars = value.chars();
                let _ = chars.next_back();
                chars.as_str().to_string()
            }
            _ => value.to_string(),
        };
        let _ = state.values.insert(control, stored);
        state.focused = Some(control);
        Ok(())
    }

    async fn input_value(&self, selector: &Selector) -> FormResult<String> {
        self.record(format!("input_value:{selector}"));
        let control = self.resolve(selector)?;
        Ok(self.value(control))
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> FormResult<()> {
        self.record(format!("type:{selector}={text}"));
        let control = self.resolve(selector)?;
        if !TEXT_INPUTS.contains(&control) {
            return Err(FormError::element(selector, "element is not an input"));
        }
        let mut state = self.lock();
        state.values.entry(control).or_default().push_str(text);
        state.focused = Some(control);
        state.selected_all = None;
        Ok(())
    }

    async fn press_key(&self, selector: Option<&Selector>, key: Key) -> FormResult<()> {
        match selector {
            Some(s) => self.record(format!("press:{s}:{key}")),
            None => self.record(format!("press:{key}")),
        }
        let target = match selector {
            Some(s) => Some(self.resolve(s)?),
            None => self.lock().focused,
        };
        let behaviour = self.script().modal_behaviour;
        let mut state = self.lock();
        match key {
            Key::Escape => {
                if state.modal_open && behaviour != ModalBehaviour::Stuck {
                    state.modal_open = false;
                }
            }
            Key::SelectAll => state.selected_all = target,
            Key::Delete => {
                if let Some(control) = target.filter(|c| state.selected_all == Some(*c)) {
                    let _ = state.values.insert(control, String::new());
                    state.selected_all = None;
                }
            }
            Key::Enter => {
                if target == Some(Control::Subjects) {
                    let typed = state.values.remove(&Control::Subjects).unwrap_or_default();
                    if !typed.is_empty() {
                        state.subjects.push(typed);
                    }
                }
            }
            Key::Tab => state.focused = None,
        }
        Ok(())
    }

    async fn click(&self, selector: &Selector, options: ClickOptions) -> FormResult<()> {
        if options.force {
            self.record(format!("click:{selector} (force)"));
        } else {
            self.record(format!("click:{selector}"));
        }
        let mut state = self.lock();
        if !state.loaded {
            return Err(FormError::element(selector, "no document loaded"));
        }
        if let Some(pos) = state.overlays.iter().position(|o| o == selector) {
            let _ = state.overlays.remove(pos);
            return Ok(());
        }
        if let Some((option, text)) = self.option_of(selector) {
            let dropdown = dropdown_of(option);
            if state.open_dropdown != Some(dropdown) {
                return Err(FormError::element(selector, "dropdown is closed"));
            }
            if dropdown == Control::State {
                state.state = Some(text);
                state.city = None;
            } else {
                state.city = Some(text);
            }
            state.open_dropdown = None;
            return Ok(());
        }
        let control = self.resolve(selector)?;
        self.click_control(&mut state, control, selector, options)
    }

    async fn set_input_files(&self, selector: &Selector, path: &Path) -> FormResult<()> {
        self.record(format!("set_input_files:{selector}={}", path.display()));
        if self.resolve(selector)? != Control::PictureUpload {
            return Err(FormError::element(selector, "element is not a file input"));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FormError::InputError {
                message: format!("{} has no file name", path.display()),
            })?;
        self.lock().picture = Some(name);
        Ok(())
    }

    async fn is_visible(&self, selector: &Selector) -> FormResult<bool> {
        self.record(format!("is_visible:{selector}"));
        let mut state = self.lock();
        if state.overlays.contains(selector) {
            return Ok(true);
        }
        if let Some((option, _)) = self.option_of(selector) {
            return Ok(self.control_visible(&mut state, option));
        }
        match self.layout.control_for(selector) {
            Some(control) => Ok(self.control_visible(&mut state, control)),
            None => Ok(false),
        }
    }

    async fn is_editable(&self, selector: &Selector) -> FormResult<bool> {
        self.record(format!("is_editable:{selector}"));
        let loaded = self.lock().loaded;
        Ok(loaded
            && self
                .layout
                .control_for(selector)
                .is_some_and(|c| TEXT_INPUTS.contains(&c)))
    }

    async fn text_content(&self, selector: &Selector) -> FormResult<Option<String>> {
        self.record(format!("text_content:{selector}"));
        let state = self.lock();
        let Some(control) = self.layout.control_for(selector) else {
            return Ok(None);
        };
        if MODAL_CONTROLS.contains(&control) && !state.modal_open {
            return Ok(None);
        }
        Ok(match control {
            Control::ModalTitle => Some("Thanks for submitting the form".to_string()),
            Control::Modal | Control::ModalBody => Some(
                state
                    .modal_rows
                    .iter()
                    .map(|r| r.join(" "))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            other => state.values.get(&other).cloned(),
        })
    }

    async fn table_rows(&self, selector: &Selector) -> FormResult<Vec<Vec<String>>> {
        self.record(format!("table_rows:{selector}"));
        let state = self.lock();
        match self.layout.control_for(selector) {
            Some(Control::ModalBody | Control::Modal) if state.modal_open => {
                Ok(state.modal_rows.clone())
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn screenshot(&self) -> FormResult<Screenshot> {
        self.record("screenshot".to_string());
        Ok(Screenshot::new(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]))
    }

    async fn close(&mut self) -> FormResult<()> {
        self.record("close".to_string());
        self.lock().loaded = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(layout: &FormLayout, control: Control) -> Selector {
        layout.selector(control).unwrap().clone()
    }

    async fn loaded() -> (SimulatedForm, FormLayout) {
        let layout = FormLayout::demoqa();
        let mut page = SimulatedForm::new(layout.clone());
        page.navigate("https://demoqa.com/automation-practice-form")
            .await
            .unwrap();
        (page, layout)
    }

    mod input_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_readback() {
            let (page, layout) = loaded().await;
            let first = sel(&layout, Control::FirstName);
            page.fill(&first, "Jane").await.unwrap();
            assert_eq!(page.input_value(&first).await.unwrap(), "Jane");
            assert!(page.was_called("fill:#firstName=Jane"));
        }

        #[tokio::test]
        async fn test_fill_glitch_drops_last_char_once() {
            let (page, layout) = loaded().await;
            let page = page.with_fill_glitch(Control::Email, 1);
            let email = sel(&layout, Control::Email);
            page.fill(&email, "a@b.co").await.unwrap();
            assert_eq!(page.value(Control::Email), "a@b.c");
            page.fill(&email, "a@b.co").await.unwrap();
            assert_eq!(page.value(Control::Email), "a@b.co");
        }

        #[tokio::test]
        async fn test_unknown_selector_is_element_error() {
            let (page, _) = loaded().await;
            let err = page.fill(&Selector::css("#nope"), "x").await.unwrap_err();
            assert!(matches!(err, FormError::ElementError { .. }));
        }

        #[tokio::test]
        async fn test_select_all_delete_type() {
            let (page, layout) = loaded().await;
            let dob = sel(&layout, Control::DateOfBirth);
            page.type_text(&dob, "18 Oct 2026").await.unwrap();
            page.press_key(Some(&dob), Key::SelectAll).await.unwrap();
            page.press_key(Some(&dob), Key::Delete).await.unwrap();
            page.type_text(&dob, "15 Jul 1990").await.unwrap();
            assert_eq!(page.value(Control::DateOfBirth), "15 Jul 1990");
        }

        #[tokio::test]
        async fn test_subject_committed_on_enter() {
            let (page, layout) = loaded().await;
            let subjects = sel(&layout, Control::Subjects);
            page.type_text(&subjects, "Maths").await.unwrap();
            page.press_key(Some(&subjects), Key::Enter).await.unwrap();
            assert_eq!(page.subjects(), vec!["Maths"]);
            assert_eq!(page.value(Control::Subjects), "");
        }
    }

    mod click_tests {
        use super::*;

        #[tokio::test]
        async fn test_overlay_intercepts_unforced_clicks() {
            let (page, layout) = loaded().await;
            let mut page = page.with_overlay(".popup-close");
            page.navigate("https://demoqa.com/automation-practice-form")
                .await
                .unwrap();
            let male = sel(&layout, Control::GenderMale);
            assert!(page.click(&male, ClickOptions::default()).await.is_err());
            page.click(&male, ClickOptions::forced()).await.unwrap();
            assert_eq!(page.gender(), Some(Gender::Male));
        }

        #[tokio::test]
        async fn test_hobby_toggles() {
            let (page, layout) = loaded().await;
            let music = sel(&layout, Control::HobbyMusic);
            page.click(&music, ClickOptions::forced()).await.unwrap();
            assert!(page.hobbies().contains(&Hobby::Music));
            page.click(&music, ClickOptions::forced()).await.unwrap();
            assert!(page.hobbies().is_empty());
        }

        #[tokio::test]
        async fn test_dropdown_options() {
            let (page, layout) = loaded().await;
            let city_option = layout.option(Control::CityOption, "Delhi").unwrap();
            assert!(page
                .click(&sel(&layout, Control::City), ClickOptions::default())
                .await
                .is_err());
            page.click(&sel(&layout, Control::State), ClickOptions::default())
                .await
                .unwrap();
            page.click(
                &layout.option(Control::StateOption, "NCR").unwrap(),
                ClickOptions::default(),
            )
            .await
            .unwrap();
            assert!(page.click(&city_option, ClickOptions::default()).await.is_err());
            page.click(&sel(&layout, Control::City), ClickOptions::default())
                .await
                .unwrap();
            assert!(page.is_visible(&city_option).await.unwrap());
            page.click(&city_option, ClickOptions::default()).await.unwrap();
            assert_eq!(
                page.state_city(),
                (Some("NCR".to_string()), Some("Delhi".to_string()))
            );
        }

        #[tokio::test]
        async fn test_submit_requires_mandatory_fields() {
            let (page, layout) = loaded().await;
            let submit = sel(&layout, Control::Submit);
            page.click(&submit, ClickOptions::default()).await.unwrap();
            assert!(!page.modal_open());

            page.fill(&sel(&layout, Control::FirstName), "Jane").await.unwrap();
            page.fill(&sel(&layout, Control::LastName), "Smith").await.unwrap();
            page.fill(&sel(&layout, Control::Mobile), "9876543210").await.unwrap();
            page.click(&sel(&layout, Control::GenderFemale), ClickOptions::forced())
                .await
                .unwrap();
            page.click(&submit, ClickOptions::default()).await.unwrap();
            assert!(page.modal_open());
            let rows = page.table_rows(&sel(&layout, Control::ModalBody)).await.unwrap();
            assert!(rows.contains(&vec!["Student Name".to_string(), "Jane Smith".to_string()]));
        }
    }

    mod modal_tests {
        use super::*;

        #[tokio::test]
        async fn test_close_behaviours() {
            let (page, layout) = loaded().await;
            let close = sel(&layout, Control::ModalClose);

            page.open_modal();
            page.click(&close, ClickOptions::default()).await.unwrap();
            assert!(!page.modal_open());
            assert!(page.click(&close, ClickOptions::default()).await.is_err());

            let page = page.with_modal_behaviour(ModalBehaviour::IgnoresClose);
            page.open_modal();
            page.click(&close, ClickOptions::default()).await.unwrap();
            assert!(page.modal_open());
            page.press_key(None, Key::Escape).await.unwrap();
            assert!(!page.modal_open());
        }

        #[tokio::test]
        async fn test_reload_resets_page() {
            let (page, layout) = loaded().await;
            let mut page = page.with_modal_behaviour(ModalBehaviour::Stuck);
            page.fill(&sel(&layout, Control::FirstName), "Jane").await.unwrap();
            page.open_modal();
            page.press_key(None, Key::Escape).await.unwrap();
            assert!(page.modal_open());
            page.reload().await.unwrap();
            assert!(!page.modal_open());
            assert_eq!(page.value(Control::FirstName), "");
            assert_eq!(page.reload_count(), 1);
        }
    }

    mod script_tests {
        use super::*;

        #[tokio::test]
        async fn test_ads_removed_by_matching_script() {
            let mut page = SimulatedForm::default().with_ad("#fixedban");
            page.navigate("https://demoqa.com").await.unwrap();
            let removed = page
                .execute_js("document.querySelectorAll(\"#fixedban\").forEach(el => el.remove())")
                .await
                .unwrap();
            assert_eq!(removed, json!(1));
            assert!(page.ads().is_empty());
        }

        #[tokio::test]
        async fn test_script_before_load_fails() {
            let page = SimulatedForm::default();
            assert!(page.execute_js("1").await.is_err());
        }
    }
}
