//! Save data configuration (savedata.toml)
//!
//! File names and the virtual save root are injected through
//! [`SavedataConfig`] instead of being global constants, so tests and tools
//! can point the core at an isolated root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Save data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SavedataConfig {
    /// Virtual paths and bundle file names
    #[serde(default)]
    pub paths: PathsConfig,
    /// Storage medium settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Virtual save root and the fixed file names inside each slot directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Save root on the virtual filesystem (default: `ms0:/PSP/SAVEDATA/`)
    #[serde(default = "default_root")]
    pub root: String,
    /// Primary icon image (default: `ICON0.PNG`)
    #[serde(default = "default_icon0")]
    pub icon0: String,
    /// Animated icon (default: `ICON1.PMF`)
    #[serde(default = "default_icon1")]
    pub icon1: String,
    /// Background picture (default: `PIC1.PNG`)
    #[serde(default = "default_pic1")]
    pub pic1: String,
    /// Sound clip (default: `SND0.AT3`)
    #[serde(default = "default_snd0")]
    pub snd0: String,
    /// Manifest (default: `PARAM.SFO`)
    #[serde(default = "default_sfo")]
    pub sfo: String,
}

/// Storage medium configuration for host-backed memory sticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Allocation unit in bytes (default: 32 KB)
    #[serde(default = "default_cluster_size")]
    pub cluster_size: u32,
    /// Reported free space in bytes (default: 1 GB)
    #[serde(default = "default_free_space")]
    pub free_space: u64,
    /// Host directory backing `ms0:` (default: platform data dir)
    #[serde(default)]
    pub host_dir: Option<PathBuf>,
}

fn default_root() -> String {
    "ms0:/PSP/SAVEDATA/".to_string()
}
fn default_icon0() -> String {
    "ICON0.PNG".to_string()
}
fn default_icon1() -> String {
    "ICON1.PMF".to_string()
}
fn default_pic1() -> String {
    "PIC1.PNG".to_string()
}
fn default_snd0() -> String {
    "SND0.AT3".to_string()
}
fn default_sfo() -> String {
    "PARAM.SFO".to_string()
}

fn default_cluster_size() -> u32 {
    0x8000
}
fn default_free_space() -> u64 {
    1024 * 1024 * 1024
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            icon0: default_icon0(),
            icon1: default_icon1(),
            pic1: default_pic1(),
            snd0: default_snd0(),
            sfo: default_sfo(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cluster_size: default_cluster_size(),
            free_space: default_free_space(),
            host_dir: None,
        }
    }
}

impl StorageConfig {
    /// Configured host directory, falling back to [`default_host_dir`].
    pub fn resolved_host_dir(&self) -> Option<PathBuf> {
        self.host_dir.clone().or_else(default_host_dir)
    }
}

/// Returns the platform-specific directory backing the memory stick.
///
/// On Linux: `~/.local/share/savedata/memstick`
///
/// Returns `None` if the home directory cannot be determined.
pub fn default_host_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "savedata", "savedata")
        .map(|dirs| dirs.data_dir().join("memstick"))
}

/// Returns the platform-specific path of `savedata.toml`.
///
/// On Linux: `~/.config/savedata/savedata.toml`
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "savedata", "savedata")
        .map(|dirs| dirs.config_dir().join("savedata.toml"))
}

/// Loads the configuration from `path`.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load(path: &Path) -> SavedataConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "using default save data config");
            return SavedataConfig::default();
        }
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid save data config, using defaults");
            SavedataConfig::default()
        }
    }
}

/// Saves the configuration to `path`, creating parent directories.
pub fn save(path: &Path, config: &SavedataConfig) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_memory_stick_layout() {
        let config = SavedataConfig::default();
        assert_eq!(config.paths.root, "ms0:/PSP/SAVEDATA/");
        assert_eq!(config.paths.sfo, "PARAM.SFO");
        assert_eq!(config.paths.icon0, "ICON0.PNG");
        assert_eq!(config.storage.cluster_size, 0x8000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: SavedataConfig = toml::from_str(
            r#"
            [storage]
            cluster_size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.cluster_size, 1024);
        assert_eq!(config.storage.free_space, 1024 * 1024 * 1024);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("savedata.toml");

        let mut config = SavedataConfig::default();
        config.paths.root = "ms0:/TEST/".to_string();
        config.storage.host_dir = Some(PathBuf::from("/tmp/stick"));
        save(&path, &config).unwrap();

        assert_eq!(load(&path), config);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(load(&missing), SavedataConfig::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "paths = 3").unwrap();
        assert_eq!(load(&bad), SavedataConfig::default());
    }
}
