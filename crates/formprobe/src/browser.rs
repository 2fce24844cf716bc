//! Chromium driver over the DevTools protocol.
//!
//! Element queries go through [`Selector::to_query`] so that text-filtered
//! selectors resolve the same way here as in every other driver. Actions
//! that need real input events (typing, key presses, pointer clicks) tag the
//! resolved element and hand it to chromiumoxide.

use crate::config::BrowserSettings;
use crate::driver::{FormDriver, Screenshot};
use crate::locator::{ClickOptions, Key, Selector};
use crate::result::{FormError, FormResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;

const TARGET_ATTRIBUTE: &str = "data-formprobe-target";

/// Key event data for a DOM key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyDefinition {
    key: &'static str,
    code: &'static str,
    key_code: i64,
    text: Option<&'static str>,
}

const fn key_definition(key: Key) -> KeyDefinition {
    match key {
        Key::Enter => KeyDefinition {
            key: "Enter",
            code: "Enter",
            key_code: 13,
            text: Some("\r"),
        },
        Key::Tab => KeyDefinition {
            key: "Tab",
            code: "Tab",
            key_code: 9,
            text: None,
        },
        Key::Escape => KeyDefinition {
            key: "Escape",
            code: "Escape",
            key_code: 27,
            text: None,
        },
        Key::Delete => KeyDefinition {
            key: "Delete",
            code: "Delete",
            key_code: 46,
            text: None,
        },
        Key::SelectAll => KeyDefinition {
            key: "a",
            code: "KeyA",
            key_code: 65,
            text: None,
        },
    }
}

/// Modifier bit for Control
const MODIFIER_CTRL: i64 = 2;

fn input_error(e: impl std::fmt::Display) -> FormError {
    FormError::InputError {
        message: e.to_string(),
    }
}

fn script_error(e: impl std::fmt::Display) -> FormError {
    FormError::ScriptError {
        message: e.to_string(),
    }
}

/// Driver backed by a real chromium instance
#[derive(Debug)]
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    handle: tokio::task::JoinHandle<()>,
}

impl CdpDriver {
    /// Launch chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if chromium cannot be started
    pub async fn launch(settings: &BrowserSettings) -> FormResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(None);

        if !settings.headless {
            builder = builder.with_head();
        }

        if !settings.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|message| FormError::BrowserLaunchError { message })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FormError::BrowserLaunchError {
                message: e.to_string(),
            })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page =
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| FormError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        tracing::info!(
            headless = settings.headless,
            width = settings.viewport_width,
            height = settings.viewport_height,
            "chromium launched"
        );

        Ok(Self {
            browser,
            page,
            handle,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: &str) -> FormResult<T> {
        let result = self.page.evaluate(script).await.map_err(script_error)?;
        let value = result.value().cloned().unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(script_error)
    }

    /// Resolve a selector to a protocol element.
    ///
    /// The match is tagged with a fresh attribute value so that text-filtered
    /// selectors, which CSS alone cannot express, land on the same node the
    /// query helpers see.
    async fn resolve(&self, selector: &Selector) -> FormResult<Element> {
        let tag = uuid::Uuid::new_v4().to_string();
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; el.setAttribute({TARGET_ATTRIBUTE:?}, {tag:?}); return true; }})()",
            selector.to_query()
        );
        if !self.eval::<bool>(&script).await? {
            return Err(FormError::element(selector, "no matching element"));
        }
        self.page
            .find_element(format!("[{TARGET_ATTRIBUTE}=\"{tag}\"]"))
            .await
            .map_err(|e| FormError::element(selector, e.to_string()))
    }

    async fn query_element<T: DeserializeOwned>(
        &self,
        selector: &Selector,
        body: &str,
    ) -> FormResult<Option<T>> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return null; {body} }})()",
            selector.to_query()
        );
        self.eval(&script).await
    }

    async fn dispatch_key(&self, key: Key) -> FormResult<()> {
        let def = key_definition(key);
        let modifiers = if key == Key::SelectAll { MODIFIER_CTRL } else { 0 };

        let mut down = DispatchKeyEventParams::builder()
            .r#type(if def.text.is_some() {
                DispatchKeyEventType::KeyDown
            } else {
                DispatchKeyEventType::RawKeyDown
            })
            .key(def.key)
            .code(def.code)
            .windows_virtual_key_code(def.key_code)
            .native_virtual_key_code(def.key_code)
            .modifiers(modifiers);
        if let Some(text) = def.text {
            down = down.text(text);
        }
        self.page
            .execute(down.build().map_err(input_error)?)
            .await
            .map_err(input_error)?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(def.key)
            .code(def.code)
            .windows_virtual_key_code(def.key_code)
            .native_virtual_key_code(def.key_code)
            .modifiers(modifiers)
            .build()
            .map_err(input_error)?;
        self.page.execute(up).await.map_err(input_error)?;

        // Ctrl+A is not bound to select-all by synthetic events on every platform
        if key == Key::SelectAll {
            self.eval::<serde_json::Value>(
                "(() => { const el = document.activeElement; if (el && el.select) el.select(); return null; })()",
            )
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FormDriver for CdpDriver {
    async fn navigate(&mut self, url: &str) -> FormResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| FormError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&self) -> FormResult<String> {
        let title = self.page.get_title().await.map_err(script_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn current_url(&self) -> FormResult<String> {
        let url = self.page.url().await.map_err(script_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn reload(&mut self) -> FormResult<()> {
        self.page
            .reload()
            .await
            .map_err(|e| FormError::NavigationError {
                url: "reload".to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn execute_js(&self, script: &str) -> FormResult<serde_json::Value> {
        self.eval(script).await
    }

    async fn fill(&self, selector: &Selector, value: &str) -> FormResult<()> {
        // Clear through the native setter so framework-managed inputs notice
        let cleared = self
            .query_element::<bool>(
                selector,
                "const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value'); \
                 if (setter && setter.set) { setter.set.call(el, ''); } else { el.value = ''; } \
                 el.dispatchEvent(new Event('input', { bubbles: true })); return true;",
            )
            .await?;
        if cleared.is_none() {
            return Err(FormError::element(selector, "no matching element"));
        }
        if value.is_empty() {
            return Ok(());
        }
        let element = self.resolve(selector).await?;
        element
            .focus()
            .await
            .map_err(|e| FormError::element(selector, e.to_string()))?;
        element.type_str(value).await.map_err(input_error)?;
        Ok(())
    }

    async fn input_value(&self, selector: &Selector) -> FormResult<String> {
        self.query_element::<String>(
            selector,
            "return el.value === undefined ? '' : String(el.value);",
        )
        .await?
            .ok_or_else(|| FormError::element(selector, "no matching element"))
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> FormResult<()> {
        let element = self.resolve(selector).await?;
        element
            .focus()
            .await
            .map_err(|e| FormError::element(selector, e.to_string()))?;
        element.type_str(text).await.map_err(input_error)?;
        Ok(())
    }

    async fn press_key(&self, selector: Option<&Selector>, key: Key) -> FormResult<()> {
        if let Some(selector) = selector {
            self.resolve(selector)
                .await?
                .focus()
                .await
                .map_err(|e| FormError::element(selector, e.to_string()))?;
        }
        self.dispatch_key(key).await
    }

    async fn click(&self, selector: &Selector, options: ClickOptions) -> FormResult<()> {
        if options.force {
            let clicked = self
                .query_element::<bool>(selector, "el.click(); return true;")
                .await?;
            return clicked
                .map(|_| ())
                .ok_or_else(|| FormError::element(selector, "no matching element"));
        }

        let hit = self
            .query_element::<String>(
                selector,
                "el.scrollIntoView({ block: 'center', inline: 'center' }); \
                 const r = el.getBoundingClientRect(); \
                 if (r.width === 0 || r.height === 0) return 'hidden'; \
                 const top = document.elementFromPoint(r.x + r.width / 2, r.y + r.height / 2); \
                 return (top && (top === el || el.contains(top))) ? 'ok' : 'covered';",
            )
            .await?;
        match hit.as_deref() {
            None => Err(FormError::element(selector, "no matching element")),
            Some("ok") => {
                self.resolve(selector)
                    .await?
                    .click()
                    .await
                    .map_err(|e| FormError::element(selector, e.to_string()))?;
                Ok(())
            }
            Some("covered") => Err(FormError::element(
                selector,
                "click intercepted by another element",
            )),
            Some(_) => Err(FormError::element(selector, "element is not visible")),
        }
    }

    async fn set_input_files(&self, selector: &Selector, path: &Path) -> FormResult<()> {
        let element = self.resolve(selector).await?;
        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(input_error)?;
        self.page.execute(params).await.map_err(input_error)?;
        Ok(())
    }

    async fn is_visible(&self, selector: &Selector) -> FormResult<bool> {
        let visible = self
            .query_element::<bool>(
                selector,
                "const style = window.getComputedStyle(el); \
                 return el.getClientRects().length > 0 && style.visibility !== 'hidden' && style.display !== 'none';",
            )
            .await?;
        Ok(visible.unwrap_or(false))
    }

    async fn is_editable(&self, selector: &Selector) -> FormResult<bool> {
        let editable = self
            .query_element::<bool>(selector, "return !el.disabled && !el.readOnly;")
            .await?;
        Ok(editable.unwrap_or(false))
    }

    async fn text_content(&self, selector: &Selector) -> FormResult<Option<String>> {
        self.query_element(selector, "return el.textContent;").await
    }

    async fn table_rows(&self, selector: &Selector) -> FormResult<Vec<Vec<String>>> {
        self.query_element(
            selector,
            "return Array.from(el.querySelectorAll('tr')).map(tr => \
                 Array.from(tr.querySelectorAll('td')).map(td => td.textContent));",
        )
        .await?
        .ok_or_else(|| FormError::element(selector, "no matching table"))
    }

    async fn screenshot(&self) -> FormResult<Screenshot> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| FormError::ScreenshotError {
                message: e.to_string(),
            })?;

        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| FormError::ScreenshotError {
                message: e.to_string(),
            })?;
        Ok(Screenshot::new(data))
    }

    async fn close(&mut self) -> FormResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| FormError::BrowserLaunchError {
                message: e.to_string(),
            })?;
        self.handle.abort();
        tracing::info!("chromium closed");
        Ok(())
    }
}
