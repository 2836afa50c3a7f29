//! Configuration parsing and management for Kagami

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, KagamiError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub avatar: AvatarConfig,
    pub render: RenderConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            avatar: AvatarConfig::default(),
            render: RenderConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, KagamiError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, KagamiError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, KagamiError> {
        // Try config paths in order
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), KagamiError> {
        // Validate tracker settings
        if self.tracker.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracker.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        if self.tracker.auto_launch {
            let path = std::path::Path::new(&self.tracker.script);
            if !path.exists() {
                tracing::warn!(
                    "Tracker auto_launch enabled but script not found at: {}",
                    self.tracker.script
                );
            }
        }

        // Validate render settings
        if !(1..=240).contains(&self.render.tick_hz) {
            return Err(ConfigError::InvalidValue {
                field: "render.tick_hz".to_string(),
                message: "Tick rate must be between 1 and 240 Hz".to_string(),
            }
            .into());
        }

        // Validate avatar settings
        if self.avatar.library.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "avatar.library".to_string(),
                message: "At least one avatar must be configured".to_string(),
            }
            .into());
        }

        if !self.avatar.library.contains_key(&self.avatar.default) {
            return Err(ConfigError::InvalidValue {
                field: "avatar.default".to_string(),
                message: format!("Avatar '{}' is not in the library", self.avatar.default),
            }
            .into());
        }

        if let Some(model) = self.avatar.library.get(&self.avatar.default) {
            if !Path::new(model).exists() {
                tracing::warn!(
                    "Default avatar model not found at: {} (loading will fail)",
                    model
                );
            }
        }

        // Validate HTTP settings
        if self.http.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Face tracker input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// UDP port to receive tracking data on
    pub port: u16,
    /// Listen address for UDP socket
    pub listen_address: String,
    /// Auto-launch the Python tracker subprocess
    pub auto_launch: bool,
    /// Path to face_tracker.py script
    pub script: String,
    /// Camera device index
    pub camera_device: u32,
    /// Camera capture width
    pub capture_width: u32,
    /// Camera capture height
    pub capture_height: u32,
    /// Camera capture FPS
    pub capture_fps: u32,
    /// Path to the face landmarker model file
    pub model_path: String,
    /// Auto-restart subprocess on crash
    pub auto_restart: bool,
    /// Delay before restarting crashed subprocess (seconds)
    pub restart_delay_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            port: 12480,
            listen_address: "127.0.0.1".to_string(),
            auto_launch: true,
            script: "scripts/face_tracker.py".to_string(),
            camera_device: 0,
            capture_width: 640,
            capture_height: 480,
            capture_fps: 30,
            model_path: "assets/face_landmarker.task".to_string(),
            auto_restart: true,
            restart_delay_secs: 3,
        }
    }
}

/// Avatar model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Avatar to load on startup
    pub default: String,
    /// Avatar name to GLB model path mapping
    pub library: HashMap<String, String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        let mut library = HashMap::new();
        library.insert(
            "masculine".to_string(),
            "assets/avatars/masculine.glb".to_string(),
        );
        library.insert(
            "feminine".to_string(),
            "assets/avatars/feminine.glb".to_string(),
        );

        Self {
            default: "masculine".to_string(),
            library,
        }
    }
}

/// Animation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Animation tick rate in Hz
    pub tick_hz: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Enable HTTP server
    pub enabled: bool,
    /// HTTP server host
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("kagami");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/kagami");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/kagami");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("kagami");
        }
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracker.listen_address, "127.0.0.1");
        assert_eq!(config.tracker.capture_fps, 30);
        assert_eq!(config.render.tick_hz, 60);
        assert!(config.http.enabled);
        assert_eq!(config.avatar.default, "masculine");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [tracker]
            port = 9001
            camera_device = 2

            [render]
            tick_hz = 30

            [http]
            port = 3000
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.tracker.port, 9001);
        assert_eq!(config.tracker.camera_device, 2);
        assert_eq!(config.render.tick_hz, 30);
        assert_eq!(config.http.port, 3000);
        // Unspecified sections fall back to defaults
        assert_eq!(config.avatar.default, "masculine");
    }

    #[test]
    fn test_validate_rejects_unknown_default_avatar() {
        let mut config = Config::default();
        config.avatar.default = "missing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tick_rate() {
        let mut config = Config::default();
        config.render.tick_hz = 0;
        assert!(config.validate().is_err());
    }
}
