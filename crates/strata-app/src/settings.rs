// Settings persistence: renderer tuning stored as JSON in the platform config
// dir, e.g. ~/.config/strata/settings.json on Linux.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strata_renderer::{BatchConfig, BlurConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataSettings {
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub blur: BlurConfig,
}

/// The simulated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pixel size.
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            scale: 1.0,
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("strata").join("settings.json"))
}

pub fn load_settings() -> StrataSettings {
    let path = match settings_path() {
        Some(p) => p,
        None => return StrataSettings::default(),
    };

    match std::fs::read_to_string(&path) {
        Ok(data) => parse_settings(&data).unwrap_or_else(|e| {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            StrataSettings::default()
        }),
        Err(_) => StrataSettings::default(),
    }
}

fn parse_settings(data: &str) -> Result<StrataSettings, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn save_settings(settings: &StrataSettings) {
    let path = match settings_path() {
        Some(p) => p,
        None => {
            log::warn!("Cannot determine settings path");
            return;
        }
    };

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("Failed to create config dir {}: {}", parent.display(), e);
            return;
        }
    }

    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                log::error!("Failed to write {}: {}", path.display(), e);
            } else {
                log::info!("Wrote {}", path.display());
            }
        }
        Err(e) => {
            log::error!("Failed to serialize settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let settings = parse_settings("{}").unwrap();
        assert_eq!(settings, StrataSettings::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let settings = parse_settings(r#"{"blur": {"passes": 3}, "output": {"scale": 2.0}}"#).unwrap();
        assert_eq!(settings.blur.passes, 3);
        assert_eq!(settings.blur.size, BlurConfig::default().size);
        assert_eq!(settings.output.scale, 2.0);
        assert_eq!(settings.output.width, 1920);
        assert_eq!(settings.batch, BatchConfig::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_settings("{ batch: ").is_err());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut settings = StrataSettings::default();
        settings.batch.instancing = false;
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(parse_settings(&json).unwrap(), settings);
    }
}
