use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub(super) const CONFIG_PATH_ENV: &str = "RELAY_DASHBOARD_CONFIG";

/// Get the path to the config.json file
/// Honours RELAY_DASHBOARD_CONFIG, then looks in the install root (parent of the bin folder)
pub(super) fn get_config_path() -> PathBuf {
    if let Ok(custom) = env::var(CONFIG_PATH_ENV) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    // Executable is at: install_root/bin/relay-dashboard
    // Config should be at: install_root/config.json
    if let Ok(exe_path) = env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            if config_path.exists() {
                debug!(path = %config_path.display(), "Using config next to install root");
                return config_path;
            }
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    PathBuf::from("config.json")
}
