//! Config file discovery.

use kinship_core::{ConfigError, KinshipConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding the per-project config.
pub const CONFIG_DIR: &str = ".kinship";
pub const CONFIG_FILE: &str = "config.json";

/// Path of the project config inside `root`.
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kinship").join(CONFIG_FILE))
}

/// Loads the effective config.
///
/// Lookup order: the explicit path, `<cwd>/.kinship/config.json`, the user
/// config dir, then built-in defaults. An explicit path must exist.
pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<KinshipConfig, ConfigError> {
    if let Some(path) = explicit {
        return KinshipConfig::load(path);
    }

    let candidates = std::iter::once(project_config_path(cwd)).chain(user_config_path());
    for path in candidates {
        if path.is_file() {
            return KinshipConfig::load(&path);
        }
    }

    debug!("no config file found; using default column markers");
    Ok(KinshipConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::ColumnMarkers;
    use tempfile::tempdir;

    #[test]
    fn test_project_config_is_found() {
        let dir = tempdir().unwrap();
        let config = KinshipConfig::with_markers(ColumnMarkers::danish());
        config.save(&project_config_path(dir.path())).unwrap();

        let loaded = load(None, dir.path()).unwrap();
        assert_eq!(loaded.markers, ColumnMarkers::danish());
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempdir().unwrap();
        KinshipConfig::with_markers(ColumnMarkers::danish())
            .save(&project_config_path(dir.path()))
            .unwrap();

        let explicit = dir.path().join("english.json");
        KinshipConfig::default().save(&explicit).unwrap();

        let loaded = load(Some(&explicit), dir.path()).unwrap();
        assert_eq!(loaded.markers, ColumnMarkers::default());
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load(Some(&dir.path().join("missing.json")), dir.path()).is_err());
    }
}
