/*
 * Locates the per-user directories the application keeps its files in: the
 * stored outline, host preferences and the log file all live in the local
 * (non-roaming) configuration directory of the application.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Returns the local configuration directory for `app_name`, creating it when
 * it does not exist yet. `None` means the platform offered no home directory
 * or the directory could not be created; callers treat that as "nowhere to
 * persist".
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving local config dir for '{app_name}'");
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if !config_path.exists() {
        if let Err(e) = fs::create_dir_all(config_path) {
            log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory {config_path:?}");
    }
    Some(config_path.to_path_buf())
}
