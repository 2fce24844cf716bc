//! Bounded wait mechanisms.
//!
//! Every wait polls the driver until its condition holds or the budget runs
//! out. Required waits turn an exhausted budget into
//! [`FormError::AssertionTimeout`]; optional probes report absence instead.

use crate::driver::FormDriver;
use crate::locator::Selector;
use crate::result::{FormError, FormResult};
use regex::Regex;
use std::time::{Duration, Instant};

/// State an element can be waited into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Rendered and visible
    Visible,
    /// Absent or not visible
    Hidden,
    /// Visible and accepting input
    Editable,
}

impl ElementState {
    /// Short name used in timeout messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Editable => "editable",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget and cadence of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Total budget
    pub timeout: Duration,
    /// Delay between checks
    pub poll_interval: Duration,
}

impl WaitOptions {
    /// Create wait options
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Budget in milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of checks performed
    pub checks: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll `check` until it yields `true` or the budget is spent.
///
/// The condition is always evaluated at least once, so a zero budget still
/// observes the current state. Errors from `check` propagate immediately.
pub async fn poll_until<F, Fut>(
    mut check: F,
    options: WaitOptions,
    waited_for: &str,
) -> FormResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = FormResult<bool>>,
{
    let start = Instant::now();
    let mut checks = 0;
    loop {
        checks += 1;
        if check().await? {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                checks,
                waited_for: waited_for.to_string(),
            });
        }
        if start.elapsed() >= options.timeout {
            return Err(FormError::AssertionTimeout {
                waited_for: waited_for.to_string(),
                ms: options.timeout_ms(),
            });
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

async fn in_state<D: FormDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    state: ElementState,
) -> FormResult<bool> {
    match state {
        ElementState::Visible => driver.is_visible(selector).await,
        ElementState::Hidden => Ok(!driver.is_visible(selector).await?),
        ElementState::Editable => {
            Ok(driver.is_visible(selector).await? && driver.is_editable(selector).await?)
        }
    }
}

/// Wait for an element to reach a state; fatal on timeout
pub async fn wait_for_state<D: FormDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    state: ElementState,
    options: WaitOptions,
) -> FormResult<WaitResult> {
    let waited_for = format!("{selector} to be {state}");
    poll_until(|| in_state(driver, selector, state), options, &waited_for).await
}

/// Wait for an element's text to contain `needle`; fatal on timeout
pub async fn wait_for_text<D: FormDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    needle: &str,
    options: WaitOptions,
) -> FormResult<WaitResult> {
    let waited_for = format!("{selector} to contain {needle:?}");
    poll_until(
        || async move {
            Ok(driver
                .text_content(selector)
                .await?
                .is_some_and(|text| text.contains(needle)))
        },
        options,
        &waited_for,
    )
    .await
}

/// Wait for the document title to match `pattern`; fatal on timeout
pub async fn wait_for_title<D: FormDriver + ?Sized>(
    driver: &D,
    pattern: &Regex,
    options: WaitOptions,
) -> FormResult<WaitResult> {
    let waited_for = format!("title to match /{}/", pattern.as_str());
    poll_until(
        || async move { Ok(pattern.is_match(&driver.title().await?)) },
        options,
        &waited_for,
    )
    .await
}

/// Optional probe: does the element become visible within the budget?
///
/// Timeouts and driver errors both read as "not present".
pub async fn probe_visible<D: FormDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    options: WaitOptions,
) -> bool {
    wait_for_state(driver, selector, ElementState::Visible, options)
        .await
        .is_ok()
}

/// Fixed pause; a zero duration returns immediately
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn opts(timeout_ms: u64) -> WaitOptions {
        WaitOptions::new(Duration::from_millis(timeout_ms), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_poll_until_immediate_success() {
        let result = poll_until(|| async { Ok(true) }, opts(0), "ready")
            .await
            .unwrap();
        assert_eq!(result.checks, 1);
        assert_eq!(result.waited_for, "ready");
    }

    #[tokio::test]
    async fn test_poll_until_eventual_success() {
        let counter = AtomicU32::new(0);
        let result = poll_until(
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 3) }
            },
            opts(1_000),
            "fourth check",
        )
        .await
        .unwrap();
        assert_eq!(result.checks, 4);
    }

    #[tokio::test]
    async fn test_poll_until_timeout() {
        let err = poll_until(|| async { Ok(false) }, opts(10), "never")
            .await
            .unwrap_err();
        match err {
            FormError::AssertionTimeout { waited_for, ms } => {
                assert_eq!(waited_for, "never");
                assert_eq!(ms, 10);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let err = poll_until(
            || async {
                Err::<bool, _>(FormError::ScriptError {
                    message: "boom".to_string(),
                })
            },
            opts(1_000),
            "x",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FormError::ScriptError { .. }));
    }

    #[test]
    fn test_element_state_display() {
        assert_eq!(ElementState::Editable.to_string(), "editable");
    }
}
