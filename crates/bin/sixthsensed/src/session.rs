//! Scripted cooking session driven through the oven facade.

use std::time::Duration;

use sixthsense_app::oven::{EditOutcome, Oven};
use sixthsense_app::ports::ApplianceTransport;
use sixthsense_domain::cavity::{Cavity, CavityState};
use sixthsense_domain::command::CookRequest;
use sixthsense_domain::cook::{CookMode, CookProgram};
use sixthsense_domain::error::SixthSenseError;
use sixthsense_domain::id::TimerId;
use sixthsense_domain::kitchen_timer::KitchenTimerState;
use sixthsense_domain::time::format_hms;

const POLL: Duration = Duration::from_secs(1);

async fn wait_until<T>(oven: &Oven<T>, done: impl Fn(&Oven<T>) -> bool) {
    while !done(oven) {
        tokio::time::sleep(POLL).await;
    }
}

/// Bake in the upper cavity, retime it, switch to convection, run a kitchen
/// timer alongside and stop once the timer rings.
///
/// # Errors
///
/// Returns the first write the appliance rejects.
pub async fn run<T>(oven: &Oven<T>) -> Result<(), SixthSenseError>
where
    T: ApplianceTransport + Send + Sync + 'static,
{
    let cavity = Cavity::Upper;
    if !oven.cavity_exists(cavity) {
        tracing::warn!(%cavity, "cavity not present, nothing to do");
        return Ok(());
    }

    oven.set_light(cavity, true).await?;
    oven.start_cook(cavity, CookRequest::new(CookMode::Bake, 180.0).cook_time(30 * 60))
        .await?;

    wait_until(oven, |oven| oven.cavity_state(cavity) == Some(CavityState::Cooking)).await;
    tracing::info!(
        %cavity,
        temperature = oven.temperature(cavity),
        remaining = %format_hms(oven.cook_time(cavity)),
        "preheat finished"
    );

    let edit = oven.edit_cook_duration(cavity, 45 * 60);
    if edit.outcome().await? == EditOutcome::Written {
        tracing::info!(%cavity, remaining = %format_hms(oven.cook_time(cavity)), "cook time extended");
    }

    let change = oven
        .change_program(cavity, CookProgram::standard(CookMode::ConvectBake))
        .await?;
    if let Some(restore) = change.restore {
        // A failed restore is logged by the task itself.
        let _ = restore.await;
    }
    tracing::info!(
        %cavity,
        mode = ?oven.cook_mode(cavity),
        remaining = %format_hms(oven.cook_time(cavity)),
        transitioned = change.transitioned,
        "switched to convection"
    );

    let timer = oven.kitchen_timer(TimerId::FIRST);
    timer.start(10 * 60).await?;
    wait_until(oven, |oven| {
        oven.kitchen_timer(TimerId::FIRST).state() == Some(KitchenTimerState::Completed)
            || !oven.cavity_state(cavity).is_some_and(CavityState::is_active)
    })
    .await;
    tracing::info!(timer = %timer.id(), "kitchen timer rang");

    oven.stop(cavity, true).await?;
    oven.set_light(cavity, false).await?;
    tracing::info!(%cavity, "session finished");
    Ok(())
}
