use crate::settings::OverlaySettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "overlay_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Settings as loaded plus what happened while loading them.
///
/// Loading runs before the logger exists, since the logger is configured from
/// these settings. Call [`LoadedSettings::report`] once logging is up.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: OverlaySettings,
    pub path: PathBuf,
    /// The file held degenerate geometry that was replaced.
    pub repaired: bool,
    /// No file existed; defaults are in use.
    pub created: bool,
    /// Writing the defaults out on first run failed.
    pub write_error: Option<anyhow::Error>,
}

impl LoadedSettings {
    pub fn report(&self) {
        let path = self.path.display();
        if self.repaired {
            tracing::warn!(%path, "overlay settings contained invalid geometry; using corrected values");
        }
        match &self.write_error {
            Some(err) => tracing::warn!(%path, "could not write default overlay settings: {err:#}"),
            None if self.created => tracing::info!(%path, "wrote default overlay settings"),
            None => tracing::debug!(%path, "loaded overlay settings"),
        }
    }
}

/// Loads the settings next to the executable. On first run the defaults are
/// written out so they can be edited.
pub fn load_or_init() -> Result<LoadedSettings> {
    let path = resolve_settings_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<LoadedSettings> {
    if let Some(mut settings) = load_from_path(path)? {
        let repaired = settings.sanitize();
        return Ok(LoadedSettings {
            settings,
            path: path.to_path_buf(),
            repaired,
            created: false,
            write_error: None,
        });
    }

    let settings = OverlaySettings::default();
    let write_error = save_to_path(path, &settings).err();
    Ok(LoadedSettings {
        settings,
        path: path.to_path_buf(),
        repaired: false,
        created: true,
        write_error,
    })
}

/// Reads the file as stored, without repairing it.
pub fn load_from_path(path: &Path) -> Result<Option<OverlaySettings>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read overlay settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Some(OverlaySettings::default()));
    }

    let loaded: OverlaySettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize overlay settings file {}", path.display()))?;
    Ok(Some(loaded))
}

pub fn save_to_path(path: &Path, settings: &OverlaySettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create overlay settings folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize overlay settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write overlay settings file {}", path.display()))
}
