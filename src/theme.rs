use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    storage::{Storage, THEME_KEY},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Icon of the toggle control; shows the theme you would switch to.
    pub fn icon(self) -> &'static str {
        match self {
            ThemePreference::Light => "🌙",
            ThemePreference::Dark => "☀️",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    // anything but "dark" falls back to light
    pub fn parse(stored: &str) -> Self {
        if stored == "dark" {
            ThemePreference::Dark
        } else {
            ThemePreference::Light
        }
    }

    pub async fn load(storage: &Storage) -> Result<Self, AppError> {
        let stored = storage.get(THEME_KEY).await?;
        Ok(stored.as_deref().map(Self::parse).unwrap_or_default())
    }

    pub async fn save(self, storage: &Storage) -> Result<(), AppError> {
        storage.set(THEME_KEY, self.as_str()).await?;
        Ok(())
    }

    pub async fn toggle(storage: &Storage) -> Result<Self, AppError> {
        let next = Self::load(storage).await?.toggled();
        next.save(storage).await?;
        Ok(next)
    }
}
