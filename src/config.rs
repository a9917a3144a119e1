//! Scene configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! textured cylinder with checkerboard region textures.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::pipeline::Shading;
use crate::shapes::CylinderParams;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    #[default]
    Textured,
    Flat,
}

impl From<ShadingMode> for Shading {
    fn from(mode: ShadingMode) -> Self {
        match mode {
            ShadingMode::Textured => Shading::Textured,
            ShadingMode::Flat => Shading::Flat,
        }
    }
}

/// Image files for the three texture regions
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TexturePaths {
    pub lateral: PathBuf,
    pub top_cap: PathBuf,
    pub base_cap: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub shape: CylinderParams,
    pub material: Material,
    pub shading: ShadingMode,
    pub textures: Option<TexturePaths>,
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject shapes the mesh builder cannot handle
    pub fn validate(&self) -> Result<()> {
        let shape = &self.shape;

        if shape.stack_count == 0 {
            return Err(Error::InvalidShape("stack_count must be at least 1".into()));
        }
        if shape.sector_count == 0 {
            return Err(Error::InvalidShape("sector_count must be at least 1".into()));
        }

        for (name, value) in [
            ("top_radius", shape.top_radius),
            ("base_radius", shape.base_radius),
            ("height", shape.height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidShape(format!(
                    "{} must be finite and >= 0.0, got {}",
                    name, value
                )));
            }
        }

        if shape.top_radius == 0.0 && shape.base_radius == 0.0 {
            return Err(Error::InvalidShape(
                "top_radius and base_radius cannot both be 0.0".into(),
            ));
        }

        if shape.sector_count < 3 {
            warn!(
                sector_count = shape.sector_count,
                "fewer than 3 sectors produces a zero-area shape"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SceneConfig::from_toml("").expect("empty config");
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.shading, ShadingMode::Textured);
        assert!(config.textures.is_none());
    }

    #[test]
    fn parses_full_scene() {
        let text = r#"
            shading = "flat"

            [shape]
            top_radius = 0.0
            base_radius = 1.5
            height = 3.0
            stack_count = 6
            sector_count = 48

            [material]
            ambient = [0.1, 0.1, 0.1]
            diffuse = [0.9, 0.2, 0.2]
            specular = [1.0, 1.0, 1.0]
            shininess = 64.0

            [textures]
            lateral = "side.png"
            top_cap = "top.png"
            base_cap = "base.png"
        "#;

        let config = SceneConfig::from_toml(text).expect("full config");

        assert_eq!(config.shading, ShadingMode::Flat);
        assert_eq!(config.shape, CylinderParams::new(0.0, 1.5, 3.0, 6, 48));
        assert_eq!(config.material.diffuse, Vec3::new(0.9, 0.2, 0.2));
        assert_eq!(config.material.shininess, 64.0);
        let textures = config.textures.expect("textures");
        assert_eq!(textures.top_cap, PathBuf::from("top.png"));
    }

    #[test]
    fn partial_shape_keeps_other_defaults() {
        let config = SceneConfig::from_toml("[shape]\nsector_count = 8\n").expect("config");

        assert_eq!(config.shape.sector_count, 8);
        assert_eq!(config.shape.stack_count, CylinderParams::default().stack_count);
    }

    #[test]
    fn zero_stack_count_is_rejected() {
        let err = SceneConfig::from_toml("[shape]\nstack_count = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn zero_sector_count_is_rejected() {
        let err = SceneConfig::from_toml("[shape]\nsector_count = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn double_apex_is_rejected() {
        let err = SceneConfig::from_toml("[shape]\ntop_radius = 0.0\nbase_radius = 0.0\n")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn negative_height_is_rejected() {
        let err = SceneConfig::from_toml("[shape]\nheight = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn two_sectors_are_allowed() {
        let config = SceneConfig::from_toml("[shape]\nsector_count = 2\n").expect("config");
        assert_eq!(config.shape.sector_count, 2);
    }

    #[test]
    fn unknown_shading_is_a_parse_error() {
        let err = SceneConfig::from_toml("shading = \"wireframe\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SceneConfig::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
