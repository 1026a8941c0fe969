use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RenderError, Result};

/// Renderer settings, usually read from a TOML file next to the host app.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render only when something requested a frame, instead of every tick.
    pub frame_control: bool,
    /// Enables the features that need optional GPU support (depth textures).
    pub high_quality: bool,
    /// Sun shadows on buildings and the map plane.
    pub shadows: bool,
    /// Edge length of the square sun depth map.
    pub shadow_map_size: u32,
    /// Opacity of the shadow overlay on the map plane, 0..=1.
    pub shadow_strength: f32,
    /// Edge length of the square off-screen picking target.
    pub picking_size: u32,
    pub show_backfaces: bool,
    /// Image used for building walls. A white placeholder is used without one.
    pub wall_texture: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            frame_control: false,
            high_quality: true,
            shadows: true,
            shadow_map_size: 2048,
            shadow_strength: 0.75,
            picking_size: 512,
            show_backfaces: false,
            wall_texture: None,
            log_filter: None,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(source: &str) -> Result<RenderConfig> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<RenderConfig> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        RenderConfig::from_toml_str(&source)
    }

    /// Whether the passes that sample scene depth can run on this context.
    pub fn wants_shadows(&self, depth_texture_supported: bool) -> bool {
        self.shadows && depth_texture_supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RenderConfig::from_toml_str("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.picking_size, 512);
        assert!(!config.frame_control);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = RenderConfig::from_toml_str(
            r#"
frame_control = true
shadows = false
picking_size = 256
wall_texture = "textures/wall.png"
"#,
        )
        .unwrap();
        assert!(config.frame_control);
        assert!(!config.shadows);
        assert_eq!(config.picking_size, 256);
        assert_eq!(config.wall_texture, Some(PathBuf::from("textures/wall.png")));
        assert_eq!(config.shadow_map_size, 2048);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let result = RenderConfig::from_toml_str("picking_size = \"big\"");
        assert!(matches!(result, Err(RenderError::Config(_))));
    }

    #[test]
    fn shadows_need_depth_textures() {
        let config = RenderConfig::default();
        assert!(config.wants_shadows(true));
        assert!(!config.wants_shadows(false));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = RenderConfig::load("/nonexistent/mapscene.toml");
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }
}
