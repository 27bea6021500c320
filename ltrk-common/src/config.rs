//! Configuration loading and root folder resolution

use crate::Result;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "LTRK_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "leadtrk.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `LTRK_ROOT_FOLDER` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(config_path) = config_file_path() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Platform config file location (`<config dir>/leadtrk/config.toml`)
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadtrk").join("config.toml"))
}

/// Compiled default root folder (`<data dir>/leadtrk`, or `./leadtrk-data`
/// when the platform data directory cannot be determined)
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("leadtrk"))
        .unwrap_or_else(|| PathBuf::from("leadtrk-data"))
}

/// Database file path inside the given root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// HTTP port, from CLI override or the settings table (default 5730)
pub async fn resolve_http_port(pool: &SqlitePool, cli_port: Option<u16>) -> Result<u16> {
    if let Some(port) = cli_port {
        return Ok(port);
    }

    let value = crate::db::init::get_setting_or(pool, "http_port", "5730").await?;
    Ok(value.parse::<u16>().unwrap_or(5730))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_wins() {
        let root = resolve_root_folder(Some("/tmp/ltrk-cli-root"));
        assert_eq!(root, PathBuf::from("/tmp/ltrk-cli-root"));
    }

    #[test]
    fn database_path_is_under_root() {
        let root = PathBuf::from("/srv/leadtrk");
        assert_eq!(
            database_path(&root),
            PathBuf::from("/srv/leadtrk/leadtrk.db")
        );
    }

    #[test]
    fn default_root_is_nonempty() {
        assert!(!default_root_folder().as_os_str().is_empty());
    }
}
