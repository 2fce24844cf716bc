//! Selector abstraction for locating page elements.
//!
//! A [`Selector`] is a pure description; resolving it against a live page is
//! the driver's job. Each selector can render itself as a JavaScript
//! expression so drivers without a native query API can evaluate it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    /// CSS selector (e.g., "#firstName")
    Css(String),
    /// CSS selector narrowed to elements whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Narrow this selector to elements containing `text`
    ///
    /// An existing text filter is replaced.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let css = match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        };
        Self::CssWithText {
            css,
            text: text.into(),
        }
    }

    /// The CSS part of the selector
    #[must_use]
    pub fn css_part(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// Convert to a JavaScript expression yielding the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::CssWithText { css, text } => {
                format!("(Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?})) || null)")
            }
        }
    }

    /// Convert to a JavaScript expression yielding every match as an array
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))")
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::CssWithText { css, text } => write!(f, "{css} >> text={text:?}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::css(css)
    }
}

/// Options for click dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickOptions {
    /// Dispatch the click on the element directly, bypassing
    /// pointer-interceptability checks (covered or off-screen elements)
    pub force: bool,
}

impl ClickOptions {
    /// Forced click
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

/// Keys the form interaction needs to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Commit an autocomplete entry
    Enter,
    /// Move focus out of a field
    Tab,
    /// Cancel a modal
    Escape,
    /// Delete the current selection
    Delete,
    /// Select all text in the focused input (Ctrl+A)
    SelectAll,
}

impl Key {
    /// DOM key name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Escape => "Escape",
            Self::Delete => "Delete",
            Self::SelectAll => "Control+A",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
