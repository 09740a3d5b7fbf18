//! Company branding defaults
//!
//! A single blob under `company-settings` holding the company details, logo
//! and default template that new drafts are seeded from. Drafts take a copy
//! at creation; later edits here never reach existing drafts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{lenient_enum, CompanyField, CompanyInfo, ParseError, Template};
use crate::storage::{KeyValueStore, StorageError, StorageResult};

/// Storage key for branding settings
pub const SETTINGS_KEY: &str = "company-settings";

/// Where an unreadable settings blob is copied before it is overwritten
pub const SETTINGS_BACKUP_KEY: &str = "company-settings.corrupt";

/// Branding defaults for new drafts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[serde(default)]
    pub company: CompanyInfo,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub default_template: Template,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

/// A settable settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Company(CompanyField),
    LogoUrl,
    DefaultTemplate,
    ThemeColor,
}

impl SettingsField {
    pub const NAMES: &'static str =
        "name, email, phone, address, website, logo_url, default_template, theme_color";
}

impl FromStr for SettingsField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logo_url" | "logourl" | "logo" => Ok(SettingsField::LogoUrl),
            "default_template" | "defaulttemplate" | "template" => {
                Ok(SettingsField::DefaultTemplate)
            }
            "theme_color" | "themecolor" => Ok(SettingsField::ThemeColor),
            other => other
                .parse::<CompanyField>()
                .map(SettingsField::Company)
                .map_err(|_| ParseError::new("settings field", s, Self::NAMES)),
        }
    }
}

impl CompanySettings {
    /// Set one field from text; fails only for an unknown template name
    pub fn update_field(&mut self, field: SettingsField, value: &str) -> Result<(), ParseError> {
        match field {
            SettingsField::Company(f) => self.company.set(f, value),
            SettingsField::LogoUrl => self.logo_url = value.to_string(),
            SettingsField::DefaultTemplate => self.default_template = value.parse()?,
            SettingsField::ThemeColor => {
                self.theme_color = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.to_string())
                };
            }
        }
        Ok(())
    }
}

/// Reads and writes `CompanySettings` through a key-value backend
pub struct SettingsStore<B> {
    backend: B,
}

impl<B: KeyValueStore> SettingsStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Load settings; absent or unreadable data yields defaults
    pub fn load(&self) -> CompanySettings {
        let raw = match self.backend.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CompanySettings::default(),
            Err(e) => {
                warn!(error = %e, "could not read settings, using defaults");
                return CompanySettings::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "stored settings are malformed, using defaults");
            CompanySettings::default()
        })
    }

    /// Replace the stored settings
    pub fn save(&self, settings: &CompanySettings) -> StorageResult<()> {
        if let Some(raw) = self.backend.get(SETTINGS_KEY)? {
            if serde_json::from_str::<CompanySettings>(&raw).is_err() {
                warn!(
                    backup = SETTINGS_BACKUP_KEY,
                    "backing up malformed settings before overwriting"
                );
                self.backend.set(SETTINGS_BACKUP_KEY, &raw)?;
            }
        }

        let json = serde_json::to_string(settings).map_err(|e| StorageError::Serialize {
            key: SETTINGS_KEY.to_string(),
            source: e,
        })?;
        self.backend.set(SETTINGS_KEY, &json)
    }
}
