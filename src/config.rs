use std::fs;
use std::path::Path;

use glam::Vec2;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::texture::pack_rgb;

/// Top-level settings, read from TOML. Every field has a default so a partial
/// (or empty) file is valid.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub render: RenderConfig,
    pub controls: ControlsConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
    /// Packed `0xRRGGBB` colors.
    pub ceiling_color: u32,
    pub floor_color: u32,
    /// Fill for columns whose ray leaves the map.
    pub void_color: u32,
    /// Darken y-facing walls.
    pub face_shading: bool,
    /// Rows of the internal framebuffer; width follows the window aspect.
    pub internal_height: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 66.0,
            ceiling_color: pack_rgb(75, 75, 75),
            floor_color: pack_rgb(100, 100, 100),
            void_color: pack_rgb(0, 0, 0),
            face_shading: true,
            internal_height: 240,
        }
    }
}

impl RenderConfig {
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
    pub start: Vec2,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            turn_speed: 7.5,
            start: Vec2::new(22.0, 11.5),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Like [`EngineConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(EngineError::ConfigIo { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!("{} not found, using default config", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        let fov = self.render.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(EngineError::InvalidConfig(format!(
                "fov_degrees must be in (0, 180), got {fov}"
            )));
        }
        if self.render.internal_height == 0 {
            return Err(EngineError::InvalidConfig(
                "internal_height must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!((config.render.fov() - 66f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [render]
            fov_degrees = 90.0
            face_shading = false

            [controls]
            start = [3.5, 4.5]
            "#,
        )
        .unwrap();
        assert_eq!(config.render.fov_degrees, 90.0);
        assert!(!config.render.face_shading);
        assert_eq!(config.render.internal_height, 240);
        assert_eq!(config.controls.start, Vec2::new(3.5, 4.5));
        assert_eq!(config.controls.move_speed, 10.0);
    }

    #[test]
    fn rejects_bad_values() {
        let err = EngineConfig::from_toml_str("[render]\nfov_degrees = 180.0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = EngineConfig::from_toml_str("[render]\nfov = 1").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("grid_raycaster_no_such_config.toml");
        let config = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(matches!(
            EngineConfig::load(&path),
            Err(EngineError::ConfigIo { .. })
        ));
    }
}
