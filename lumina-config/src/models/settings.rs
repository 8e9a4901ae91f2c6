use serde::{Deserialize, Serialize};

/// User-changeable UI settings, persisted next to the options file.
///
/// Unlike [`Options`](super::Options) these may be edited at runtime from the
/// web UI and are exposed to clients as part of the client config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub language: String,
    pub features: FeatureSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureSettings {
    pub upload: bool,
    pub import: bool,
    pub labels: bool,
    pub places: bool,
    pub archive: bool,
    pub download: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            language: "en".to_string(),
            features: FeatureSettings::default(),
        }
    }
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            upload: true,
            import: true,
            labels: true,
            places: true,
            archive: true,
            download: true,
        }
    }
}

impl Settings {
    /// Reject settings the UI could not render.
    pub fn validate(&self) -> Result<(), String> {
        if self.theme.trim().is_empty() {
            return Err("theme must not be empty".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("language must not be empty".to_string());
        }
        Ok(())
    }
}
