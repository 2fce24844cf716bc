//! Suite configuration: wait budgets, fill policy and host settings.

use crate::layout::{Control, FormLayout};
use crate::locator::Selector;
use crate::result::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default base URL of the practice form host
pub const DEFAULT_FORM_BASE_URL: &str = "https://demoqa.com";

/// Default base URL of the REST sandbox
pub const DEFAULT_API_BASE_URL: &str = "https://reqres.in/api";

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Budget for required elements and states; exceeding it is fatal
    pub required_ms: u64,
    /// Budget for optional overlays; exceeding it means "not present"
    pub optional_ms: u64,
    /// Pause before sweeping for overlays after navigation
    pub settle_ms: u64,
    /// Budget for the guard's dismiss click
    pub dismiss_ms: u64,
    /// Pause after the guard's dismiss click
    pub post_dismiss_ms: u64,
    /// Pause after the guard's Escape key
    pub escape_ms: u64,
    /// Pause after the guard reloads the page
    pub reload_settle_ms: u64,
    /// Polling interval of every bounded wait
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            required_ms: 5_000,
            optional_ms: 1_000,
            settle_ms: 2_000,
            dismiss_ms: 2_000,
            post_dismiss_ms: 1_000,
            escape_ms: 500,
            reload_settle_ms: 2_000,
            poll_interval_ms: 50,
        }
    }
}

impl Timeouts {
    /// Budgets for pages that answer immediately (simulated pages, local fixtures)
    #[must_use]
    pub const fn tight() -> Self {
        Self {
            required_ms: 200,
            optional_ms: 20,
            settle_ms: 0,
            dismiss_ms: 50,
            post_dismiss_ms: 0,
            escape_ms: 0,
            reload_settle_ms: 0,
            poll_interval_ms: 5,
        }
    }

    /// Set the required budget
    #[must_use]
    pub const fn with_required(mut self, ms: u64) -> Self {
        self.required_ms = ms;
        self
    }

    /// Set the optional budget
    #[must_use]
    pub const fn with_optional(mut self, ms: u64) -> Self {
        self.optional_ms = ms;
        self
    }

    /// Required budget as Duration
    #[must_use]
    pub const fn required(&self) -> Duration {
        Duration::from_millis(self.required_ms)
    }

    /// Optional budget as Duration
    #[must_use]
    pub const fn optional(&self) -> Duration {
        Duration::from_millis(self.optional_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// How text fields are filled and verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPolicy {
    /// Total fill attempts per field, including the first
    pub max_attempts: u32,
    /// Fail with `RetryExhausted` if the last attempt still reads back wrong
    pub verify_final: bool,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            verify_final: true,
        }
    }
}

impl FillPolicy {
    /// One re-fill after a mismatch, second mismatch accepted silently
    #[must_use]
    pub const fn legacy() -> Self {
        Self {
            max_attempts: 2,
            verify_final: false,
        }
    }

    /// Set the attempt count (at least one)
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Chromium executable override
    pub chromium_path: Option<String>,
    /// Keep the chromium sandbox (disable in containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 900,
        }
    }
}

/// Complete suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the form host
    pub form_base_url: String,
    /// Base URL of the REST sandbox
    pub api_base_url: String,
    /// API key sent as `x-api-key`, if the sandbox requires one
    pub api_key: Option<String>,
    /// Browser settings
    pub browser: BrowserSettings,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Fill policy
    pub fill_policy: FillPolicy,
    /// Directory for reports and failure screenshots
    pub output_dir: String,
    /// Selector overrides applied on top of the demoqa layout
    pub layout_overrides: BTreeMap<Control, Selector>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            form_base_url: DEFAULT_FORM_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            browser: BrowserSettings::default(),
            timeouts: Timeouts::default(),
            fill_policy: FillPolicy::default(),
            output_dir: "target/formprobe".to_string(),
            layout_overrides: BTreeMap::new(),
        }
    }
}

impl SuiteConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys take their defaults
    pub fn load(path: &Path) -> FormResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FormError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_yaml(&text)
    }

    /// Parse from YAML text
    pub fn from_yaml(text: &str) -> FormResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> FormResult<()> {
        for (name, url) in [
            ("form_base_url", &self.form_base_url),
            ("api_base_url", &self.api_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(FormError::Config {
                    message: format!("{name} must be an http(s) URL, got {url:?}"),
                });
            }
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(FormError::Config {
                message: "timeouts.poll_interval_ms must be positive".to_string(),
            });
        }
        if self.fill_policy.max_attempts == 0 {
            return Err(FormError::Config {
                message: "fill_policy.max_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Layout with the configured overrides applied
    #[must_use]
    pub fn layout(&self) -> FormLayout {
        FormLayout::demoqa().with_overrides(&self.layout_overrides)
    }

    /// Absolute URL of the form page
    #[must_use]
    pub fn form_url(&self, layout: &FormLayout) -> String {
        format!(
            "{}/{}",
            self.form_base_url.trim_end_matches('/'),
            layout.path.trim_start_matches('/')
        )
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Set timeouts
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
}
