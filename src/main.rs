use anyhow::Context;
use pool_guide::guide::model::GuideModel;
use pool_guide::guide::overlay::{primary_screen_size, run_overlay};
use pool_guide::guide::settings::GuideSettings;
use pool_guide::guide::{settings_store, GuideSession};
use pool_guide::logging;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let (settings, load_error) = match settings_store::load() {
        Ok(settings) => (settings, None),
        Err(err) => (GuideSettings::default(), Some(err)),
    };

    logging::init(
        settings.debug_logging,
        settings.log_file.as_ref().map(PathBuf::from),
    );
    if let Some(err) = load_error {
        tracing::warn!(error = %format!("{err:#}"), "failed to load guide settings, using defaults");
    }

    let screen = primary_screen_size().context("query primary screen size")?;
    let model = GuideModel::default_layout(screen, settings.ghost_radius);
    tracing::info!(
        width = screen.width,
        height = screen.height,
        pockets = model.pockets().len(),
        "starting pool guide overlay"
    );

    let session = GuideSession::new(model, settings.tuning());
    if let Err(err) = run_overlay(session, settings.style()) {
        tracing::error!(error = %format!("{err:#}"), "guide overlay failed");
        return Err(err);
    }
    Ok(())
}
