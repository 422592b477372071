use crate::domain::error::{AppError, Result};
use crate::domain::settings::AdminSettings;
use std::sync::RwLock;
use validator::Validate;

pub struct AdminSettingsStore {
    settings: RwLock<AdminSettings>,
}

impl AdminSettingsStore {
    pub fn new(initial: AdminSettings) -> Self {
        Self {
            settings: RwLock::new(initial),
        }
    }

    pub fn snapshot(&self) -> AdminSettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, settings: AdminSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = settings;
        Ok(())
    }
}
