use crate::config::{load_config_with_fallback_from_path, save_config_to_path};
use crate::reminders::{Authorization, PermissionSource};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reminder permission stored in the `reminders` field of the config file.
///
/// Requesting permission while undetermined grants it provisionally, the
/// desktop counterpart of a quiet provisional grant.
#[derive(Debug, Clone)]
pub struct ConfigPermissions {
    path: PathBuf,
}

impl ConfigPermissions {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl PermissionSource for ConfigPermissions {
    fn current_authorization(&self) -> Authorization {
        let loaded = load_config_with_fallback_from_path(&self.path);
        if let Some(err) = loaded.error {
            warn!(error = %err, "config unreadable; reminder permission undetermined");
        }
        loaded.config.authorization()
    }

    fn request_authorization(&self) {
        let loaded = load_config_with_fallback_from_path(&self.path);
        if loaded.error.is_some() || loaded.config.reminders.is_some() {
            return;
        }

        let mut config = loaded.config;
        config.reminders = Some(Authorization::Provisional);
        match save_config_to_path(&self.path, &config) {
            Ok(()) => info!("reminders provisionally authorized"),
            Err(err) => warn!(error = %err, "could not record reminder permission"),
        }
    }
}
