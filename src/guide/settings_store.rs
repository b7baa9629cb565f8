use crate::guide::settings::GuideSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const GUIDE_SETTINGS_FILE_NAME: &str = "guide_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(GUIDE_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<GuideSettings> {
    let path = resolve_settings_path()?;
    load_from_path(&path)
}

/// Missing and empty files both yield the defaults.
pub fn load_from_path(path: &Path) -> Result<GuideSettings> {
    if !path.exists() {
        return Ok(GuideSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read guide settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(GuideSettings::default());
    }

    let mut loaded: GuideSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize guide settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &GuideSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create guide settings parent folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize guide settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write guide settings file {}", path.display()))
}
