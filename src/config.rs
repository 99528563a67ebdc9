//! Runtime settings. Environment first, command-line overrides on top.

use std::env;
use std::path::{Path, PathBuf};

/// Directories searched, in order, for the Kismet alert config
pub const DEFAULT_CONFIG_DIRS: &[&str] = &["/etc/kismet", "/usr/local/etc"];

/// Kismet's alert config, which receives the include directive
pub const HOST_CONFIG_NAME: &str = "kismet_alerts.conf";

/// Generated rule file, written next to the host config
pub const RULE_FILE_NAME: &str = "kismet_target_alerts.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    pub config_dirs: Vec<PathBuf>,
    pub host_config_name: String,
    pub rule_file_name: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            config_dirs: DEFAULT_CONFIG_DIRS.iter().map(PathBuf::from).collect(),
            host_config_name: HOST_CONFIG_NAME.to_string(),
            rule_file_name: RULE_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub target: TargetSettings,
    /// Where the per-category target files live
    pub targets_dir: PathBuf,
}

impl Settings {
    /// Read `KISMET_CONFIG_DIRS` (colon separated) and `KISMET_TARGETS_DIR`.
    pub fn from_env() -> Self {
        let config_dirs = env::var("KISMET_CONFIG_DIRS")
            .ok()
            .map(|val| parse_dir_list(&val))
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| TargetSettings::default().config_dirs);

        let targets_dir = env::var("KISMET_TARGETS_DIR")
            .ok()
            .filter(|val| !val.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Settings {
            target: TargetSettings {
                config_dirs: config_dirs.iter().map(|d| absolutize(d)).collect(),
                ..TargetSettings::default()
            },
            targets_dir: absolutize(&targets_dir),
        }
    }

    pub fn with_config_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        if !dirs.is_empty() {
            self.target.config_dirs = dirs.iter().map(|d| absolutize(d)).collect();
        }
        self
    }

    pub fn with_targets_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.targets_dir = absolutize(&dir);
        }
        self
    }
}

fn parse_dir_list(val: &str) -> Vec<PathBuf> {
    val.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Resolve relative paths once so the include directive always names an absolute path
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => {
            let joined = cwd.join(path);
            // Drop a leading "./" component so paths read cleanly in config files
            joined
                .components()
                .filter(|c| !matches!(c, std::path::Component::CurDir))
                .collect()
        }
        Err(_) => path.to_path_buf(),
    }
}
