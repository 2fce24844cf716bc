//! `FormDriver` - abstract browser automation seam.
//!
//! The page object only ever talks to this trait. Two implementations ship
//! with the crate:
//!
//! - `CdpDriver` (feature `browser`) drives Chromium over CDP via chromiumoxide
//! - [`SimulatedForm`](crate::mock::SimulatedForm) plays the practice form in
//!   memory and records every call, for tests
//!
//! Every method returns as soon as the runtime confirms completion; bounded
//! waiting is layered on top in [`crate::wait`].

use crate::locator::{ClickOptions, Key, Selector};
use crate::result::FormResult;
use async_trait::async_trait;
use std::path::Path;

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Write the PNG to disk
    pub fn save(&self, path: &Path) -> FormResult<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// Navigate to URL and wait for the load to settle
    async fn navigate(&mut self, url: &str) -> FormResult<()>;

    /// Current document title
    async fn title(&self) -> FormResult<String>;

    /// Current URL
    async fn current_url(&self) -> FormResult<String>;

    /// Reload the page from scratch
    async fn reload(&mut self) -> FormResult<()>;

    /// Evaluate JavaScript in page context
    async fn execute_js(&self, script: &str) -> FormResult<serde_json::Value>;

    /// Replace the value of an input or textarea
    async fn fill(&self, selector: &Selector, value: &str) -> FormResult<()>;

    /// Value currently held by an input or textarea
    async fn input_value(&self, selector: &Selector) -> FormResult<String>;

    /// Type text key by key into an element, appending to its value
    async fn type_text(&self, selector: &Selector, text: &str) -> FormResult<()>;

    /// Press a key on an element, or on the focused element when `None`
    async fn press_key(&self, selector: Option<&Selector>, key: Key) -> FormResult<()>;

    /// Click an element
    async fn click(&self, selector: &Selector, options: ClickOptions) -> FormResult<()>;

    /// Associate a local file with a file input
    async fn set_input_files(&self, selector: &Selector, path: &Path) -> FormResult<()>;

    /// Whether a matching element is rendered and visible (no waiting)
    async fn is_visible(&self, selector: &Selector) -> FormResult<bool>;

    /// Whether a matching element accepts input (no waiting)
    async fn is_editable(&self, selector: &Selector) -> FormResult<bool>;

    /// Text content of the first match, `None` when nothing matches
    async fn text_content(&self, selector: &Selector) -> FormResult<Option<String>>;

    /// Cell texts of every `tr` under the first match, row by row
    async fn table_rows(&self, selector: &Selector) -> FormResult<Vec<Vec<String>>>;

    /// Take screenshot
    async fn screenshot(&self) -> FormResult<Screenshot>;

    /// Release the page
    async fn close(&mut self) -> FormResult<()>;
}
