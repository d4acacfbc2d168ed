//! Demo configuration (window, assets, scene tuning). Loaded from globe.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "globe.ron";

/// Persistent settings. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub vsync: bool,

    /// Equirectangular globe image, relative to the working directory.
    #[serde(default = "default_texture_path")]
    pub texture_path: PathBuf,
    /// Abort instead of painting a procedural globe when the image can't be loaded.
    #[serde(default)]
    pub require_texture: bool,

    #[serde(default = "default_globe_segments")]
    pub globe_segments: u32,
    #[serde(default = "default_globe_rings")]
    pub globe_rings: u32,
    /// Globe spin in radians per second.
    #[serde(default = "default_one")]
    pub globe_spin_rate: f32,

    #[serde(default = "default_star_count")]
    pub star_count: usize,
    #[serde(default = "default_star_min_distance")]
    pub star_min_distance: f32,
    #[serde(default = "default_star_max_distance")]
    pub star_max_distance: f32,
    #[serde(default = "default_star_orbit_radius")]
    pub star_orbit_radius: f32,
    /// Uniform scale applied to each star's model matrix.
    #[serde(default = "default_star_scale")]
    pub star_scale: f32,
    /// Ring revolution in radians per second.
    #[serde(default = "default_one")]
    pub revolution_rate: f32,

    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,

    #[serde(default = "default_true")]
    pub show_satellite: bool,
    #[serde(default = "default_true")]
    pub show_constellations: bool,

    /// Linear RGBA background.
    #[serde(default = "default_clear_color")]
    pub clear_color: [f64; 4],
}

fn default_window_width() -> u32 {
    800
}
fn default_window_height() -> u32 {
    600
}
fn default_title() -> String {
    "Textured Globe with Orbiting Stars".to_string()
}
fn default_true() -> bool {
    true
}
fn default_texture_path() -> PathBuf {
    PathBuf::from("earth_texture.jpg")
}
fn default_globe_segments() -> u32 {
    64
}
fn default_globe_rings() -> u32 {
    32
}
fn default_one() -> f32 {
    1.0
}
fn default_star_count() -> usize {
    300
}
fn default_star_min_distance() -> f32 {
    8.0
}
fn default_star_max_distance() -> f32 {
    10.0
}
fn default_star_orbit_radius() -> f32 {
    3.0
}
fn default_star_scale() -> f32 {
    0.05
}
fn default_camera_distance() -> f32 {
    5.0
}
fn default_fov() -> f32 {
    45.0
}
fn default_clear_color() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            title: default_title(),
            vsync: default_true(),
            texture_path: default_texture_path(),
            require_texture: false,
            globe_segments: default_globe_segments(),
            globe_rings: default_globe_rings(),
            globe_spin_rate: default_one(),
            star_count: default_star_count(),
            star_min_distance: default_star_min_distance(),
            star_max_distance: default_star_max_distance(),
            star_orbit_radius: default_star_orbit_radius(),
            star_scale: default_star_scale(),
            revolution_rate: default_one(),
            camera_distance: default_camera_distance(),
            fov_degrees: default_fov(),
            show_satellite: default_true(),
            show_constellations: default_true(),
            clear_color: default_clear_color(),
        }
    }
}

impl GlobeConfig {
    /// Load config from `globe.ron`. A missing file is created with defaults;
    /// an invalid one is reported and ignored.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path);
            return config;
        }
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) => log::warn!("Could not read config at {:?}: {}, using defaults", path, e),
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Write config to `path`. Logs on error.
    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_setup() {
        let config = GlobeConfig::default();
        assert_eq!((config.window_width, config.window_height), (800, 600));
        assert_eq!(config.title, "Textured Globe with Orbiting Stars");
        assert_eq!(config.texture_path, PathBuf::from("earth_texture.jpg"));
        assert_eq!((config.globe_segments, config.globe_rings), (64, 32));
        assert_eq!(config.star_count, 300);
        assert_eq!(config.star_scale, 0.05);
        assert_eq!(config.camera_distance, 5.0);
        assert!(!config.require_texture);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = GlobeConfig::from_ron("(star_count: 12, vsync: false)").unwrap();
        assert_eq!(config.star_count, 12);
        assert!(!config.vsync);
        assert_eq!(config.globe_segments, 64);
        assert_eq!(config.fov_degrees, 45.0);
    }

    #[test]
    fn round_trips_through_ron() {
        let mut config = GlobeConfig::default();
        config.show_satellite = false;
        config.clear_color = [0.1, 0.2, 0.3, 1.0];
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(GlobeConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("globe-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "(star_count: \"lots\")").unwrap();
        assert_eq!(GlobeConfig::load_from(&path), GlobeConfig::default());

        let missing = dir.join("absent.ron");
        assert_eq!(GlobeConfig::load_from(&missing), GlobeConfig::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
