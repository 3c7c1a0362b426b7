//! Configuration for feedgrid.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (FEEDGRID_HOME, FEEDGRID_CATALOG)
//! 2. Config file (.feedgrid/config.yaml)
//! 3. Defaults (~/.feedgrid)
//!
//! Config file discovery:
//! - Searches current directory and parents for .feedgrid/config.yaml
//! - Paths in config file are relative to the project root (the parent of .feedgrid/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::gesture::{GestureThresholds, DEFAULT_COMMIT_THRESHOLD_PX, DEFAULT_DOMINANCE_THRESHOLD_PX};
use crate::core::preload::DEFAULT_PRELOAD_TIMEOUT;
use crate::core::window::DEFAULT_MAX_VISIBLE;
use crate::core::FeedSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub gesture: Option<GestureConfig>,
    #[serde(default)]
    pub preload: Option<PreloadConfig>,
    #[serde(default)]
    pub episodes: Option<EpisodesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Catalog JSON file (relative to the project root)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GestureConfig {
    pub dominance_threshold_px: Option<f64>,
    pub commit_threshold_px: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreloadConfig {
    pub timeout_ms: Option<u64>,
    pub depth: Option<usize>,
    pub prefetch_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodesConfig {
    pub max_visible: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to feedgrid home
    pub home: PathBuf,
    /// Catalog file
    pub catalog: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Drag thresholds
    pub gesture: GestureThresholds,
    /// Preload settings
    pub preload: PreloadSettings,
    /// Episode indicator settings
    pub episodes: EpisodeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadSettings {
    pub timeout_ms: u64,
    /// Neighbor hops to warm around the current node
    pub depth: usize,
    /// Leading bytes fetched per resource (0 = whole resource)
    pub prefetch_bytes: u64,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PRELOAD_TIMEOUT.as_millis() as u64,
            depth: 1,
            prefetch_bytes: 512 * 1024,
        }
    }
}

impl PreloadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSettings {
    pub max_visible: usize,
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl ResolvedConfig {
    /// Settings for a feed session
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            thresholds: self.gesture,
            preload_depth: self.preload.depth,
            max_visible: self.episodes.max_visible,
        }
    }
}

/// Environment overrides, captured once so resolution stays testable
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    home: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            home: std::env::var("FEEDGRID_HOME").ok().map(PathBuf::from),
            catalog: std::env::var("FEEDGRID_CATALOG").ok().map(PathBuf::from),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".feedgrid").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file, and env overrides
fn resolve_config(
    default_home: PathBuf,
    config_file: Option<(PathBuf, ConfigFile)>,
    env: EnvOverrides,
) -> Result<ResolvedConfig> {
    let home = env.home.clone().unwrap_or(default_home);

    let Some((config_path, config)) = config_file else {
        let catalog = env.catalog.unwrap_or_else(|| home.join("catalog.json"));
        return Ok(ResolvedConfig {
            home,
            catalog,
            config_file: None,
            gesture: GestureThresholds::default(),
            preload: PreloadSettings::default(),
            episodes: EpisodeSettings::default(),
        });
    };

    // Base directory is the parent of .feedgrid/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let catalog = if let Some(env_catalog) = env.catalog {
        env_catalog
    } else if let Some(ref path) = config.catalog.path {
        resolve_path(base_dir, path)
    } else {
        home.join("catalog.json")
    };

    let gesture = GestureThresholds {
        dominance_px: config
            .gesture
            .as_ref()
            .and_then(|g| g.dominance_threshold_px)
            .unwrap_or(DEFAULT_DOMINANCE_THRESHOLD_PX),
        commit_px: config
            .gesture
            .as_ref()
            .and_then(|g| g.commit_threshold_px)
            .unwrap_or(DEFAULT_COMMIT_THRESHOLD_PX),
    };

    anyhow::ensure!(
        gesture.dominance_px >= 0.0 && gesture.commit_px > gesture.dominance_px,
        "Invalid gesture thresholds in {}: need 0 <= dominance ({}) < commit ({})",
        config_path.display(),
        gesture.dominance_px,
        gesture.commit_px
    );

    let defaults = PreloadSettings::default();
    let preload = PreloadSettings {
        timeout_ms: config
            .preload
            .as_ref()
            .and_then(|p| p.timeout_ms)
            .unwrap_or(defaults.timeout_ms),
        depth: config
            .preload
            .as_ref()
            .and_then(|p| p.depth)
            .unwrap_or(defaults.depth),
        prefetch_bytes: config
            .preload
            .as_ref()
            .and_then(|p| p.prefetch_bytes)
            .unwrap_or(defaults.prefetch_bytes),
    };

    let episodes = EpisodeSettings {
        max_visible: config
            .episodes
            .as_ref()
            .and_then(|e| e.max_visible)
            .unwrap_or(DEFAULT_MAX_VISIBLE),
    };

    Ok(ResolvedConfig {
        home,
        catalog,
        config_file: Some(config_path),
        gesture,
        preload,
        episodes,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".feedgrid");

    let config_file = match find_config_file() {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    resolve_config(default_home, config_file, EnvOverrides::from_env())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the catalog path
pub fn catalog_path() -> Result<PathBuf> {
    Ok(config()?.catalog.clone())
}
