//! Live run against demoqa in chromium.
//!
//! Needs a chromium install and network access:
//! `cargo test -p formprobe --features browser -- --ignored`

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use formprobe::fixtures::{minimal_form_data, valid_form_data};
use formprobe::{CdpDriver, PracticeFormPage, SuiteConfig};

async fn live_page() -> PracticeFormPage<CdpDriver> {
    let mut config = SuiteConfig::default();
    config.browser.sandbox = false;
    let driver = CdpDriver::launch(&config.browser).await.unwrap();
    let mut page = PracticeFormPage::from_config(driver, &config);
    let _ = page.navigate_to_form().await.unwrap();
    page
}

#[tokio::test]
#[ignore = "requires chromium and network access"]
async fn test_live_minimal_submission() {
    let mut page = live_page().await;
    let record = minimal_form_data();
    page.populate(&record).await.unwrap();
    page.submit_form().await.unwrap();
    page.await_confirmation().await.unwrap();
    let _ = page.verify_form_matches_confirmation().await.unwrap();
    page.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires chromium and network access"]
async fn test_live_complete_submission() {
    let mut page = live_page().await;
    let confirmation = page.submit_and_verify(&valid_form_data()).await.unwrap();
    assert_eq!(confirmation.value_or_empty("State and City"), "NCR Delhi");
    page.close().await.unwrap();
}
