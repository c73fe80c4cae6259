//! Editor configuration
//!
//! Stored as RON. Every section defaults independently so files written by
//! older versions keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Frame in which move deltas and placements are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditFrame {
    #[default]
    World,
    /// Frame of the sphere's owning link
    Local,
}

/// Defaults for newly created spheres and display hints for the renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphereConfig {
    pub default_radius: f32,
    /// Local-frame center of new spheres
    pub default_center: [f32; 3],
    /// Floor applied to absolute radius edits coming from sliders
    pub min_radius: f32,
    pub opacity: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            default_radius: 0.05,
            default_center: [0.0; 3],
            min_radius: 1.0e-4,
            opacity: 0.5,
        }
    }
}

/// Editing behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub move_frame: EditFrame,
    /// Maximum undo entries (0 disables undo)
    pub history_depth: usize,
    /// Make a newly added sphere the active sphere
    pub select_new_spheres: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            move_frame: EditFrame::World,
            history_depth: 50,
            select_new_spheres: true,
        }
    }
}

/// Robot geometry visibility
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_visual: bool,
    pub show_collision: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_visual: true,
            show_collision: false,
        }
    }
}

/// Where robots selected by name are looked up
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobotConfig {
    pub search_paths: Vec<PathBuf>,
}

impl RobotConfig {
    /// Find `<dir>/<name>.urdf` or `<dir>/<name>/urdf/<name>.urdf`
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let file = format!("{name}.urdf");
        self.search_paths.iter().find_map(|dir| {
            [dir.join(&file), dir.join(name).join("urdf").join(&file)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub spheres: SphereConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub robots: RobotConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config file found, using defaults");
            return Self::new();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config file {:?}: {}", path, e);
            Self::new()
        })
    }

    /// Save the configuration, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, self.to_ron_string()?).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
