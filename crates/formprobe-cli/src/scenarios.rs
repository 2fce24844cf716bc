//! Practice form scenarios.
//!
//! Each scenario starts from a fresh navigation, so a failure in one never
//! leaks page state into the next.

use crate::commands::ScenarioName;
use formprobe::fixtures::{
    boundary_values, generate_valid_record, invalid_form_data, minimal_form_data, test_users,
    valid_form_data,
};
use formprobe::{
    FormDriver, FormError, FormRecord, FormResult, Gender, Hobby, PracticeFormPage, SurfaceState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

async fn submit_one<D: FormDriver>(
    page: &mut PracticeFormPage<D>,
    record: &FormRecord,
) -> FormResult<usize> {
    let _ = page.navigate_to_form().await?;
    let confirmation = page.submit_and_verify(record).await?;
    Ok(confirmation.len())
}

/// Run one scenario; the returned string summarises what was checked
pub async fn run_scenario<D: FormDriver>(
    page: &mut PracticeFormPage<D>,
    scenario: ScenarioName,
    seed: u64,
) -> FormResult<String> {
    match scenario {
        ScenarioName::Minimal => {
            let rows = submit_one(page, &minimal_form_data()).await?;
            Ok(format!("required fields echoed in {rows} rows"))
        }
        ScenarioName::Complete => {
            let rows = submit_one(page, &valid_form_data()).await?;
            Ok(format!("complete record echoed in {rows} rows"))
        }
        ScenarioName::Users => {
            let users = test_users();
            for user in &users {
                let _ = submit_one(page, user).await?;
            }
            Ok(format!("{} users submitted", users.len()))
        }
        ScenarioName::Generated => {
            let record = generate_valid_record(&mut StdRng::seed_from_u64(seed));
            let _ = submit_one(page, &record).await?;
            Ok(format!("seed {seed}: {}", record.full_name()))
        }
        ScenarioName::Boundary => {
            let b = boundary_values();
            let pairs = [
                (b.long_name.as_str(), b.short_name.as_str(), b.min_mobile.as_str()),
                (
                    b.special_characters.as_str(),
                    b.unicode_characters.as_str(),
                    b.max_mobile.as_str(),
                ),
            ];
            for (first, last, mobile) in pairs {
                let record = FormRecord::new(first, last, "boundary@example.com", mobile, "")
                    .with_gender(Gender::Other);
                let _ = submit_one(page, &record).await?;
            }
            Ok(format!("{} boundary records echoed", pairs.len()))
        }
        ScenarioName::Invalid => {
            let _ = page.navigate_to_form().await?;
            match page.populate(&invalid_form_data()).await {
                Err(e @ FormError::ValidationFailure { .. }) => Ok(format!("rejected: {e}")),
                Err(e) => Err(e),
                Ok(()) => Err(FormError::validation(
                    "record",
                    "malformed record was accepted",
                )),
            }
        }
        ScenarioName::Guard => {
            let _ = page.navigate_to_form().await?;
            page.populate(&minimal_form_data()).await?;
            page.submit_form().await?;
            page.await_confirmation().await?;
            // modal is deliberately left open
            page.select_hobby_choice(Hobby::Reading).await?;
            match page.surface_state().await {
                SurfaceState::Closed => Ok("leftover modal cleared before hobby click".to_string()),
                SurfaceState::Open => Err(FormError::validation(
                    "modal",
                    "still open after the guard ran",
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formprobe::{FormLayout, ModalBehaviour, SimulatedForm, Timeouts};

    fn simulated(sim: &SimulatedForm) -> PracticeFormPage<SimulatedForm> {
        PracticeFormPage::new(
            sim.clone(),
            FormLayout::demoqa(),
            "https://demoqa.com/automation-practice-form",
        )
        .with_timeouts(Timeouts::tight())
    }

    #[tokio::test]
    async fn test_every_scenario_passes_on_a_healthy_page() {
        let sim = SimulatedForm::default();
        let mut page = simulated(&sim);
        for scenario in ScenarioName::ALL {
            let summary = run_scenario(&mut page, scenario, 42)
                .await
                .unwrap_or_else(|e| panic!("{scenario:?}: {e}"));
            assert!(!summary.is_empty());
        }
        // minimal, complete, 2 users, generated, 2 boundary, guard
        assert_eq!(sim.submission_count(), 8);
    }

    #[tokio::test]
    async fn test_guard_scenario_survives_stuck_modal() {
        let sim = SimulatedForm::default().with_modal_behaviour(ModalBehaviour::Stuck);
        let mut page = simulated(&sim);
        let summary = run_scenario(&mut page, ScenarioName::Guard, 0).await.unwrap();
        assert!(summary.contains("cleared"));
        assert_eq!(sim.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_minimal_fails_on_echo_mismatch() {
        let sim = SimulatedForm::default().with_echo_override("Mobile", "0000000000");
        let mut page = simulated(&sim);
        let err = run_scenario(&mut page, ScenarioName::Minimal, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::MismatchFailure { .. }));
    }
}
