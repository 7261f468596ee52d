//! Export options for package generation

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_JOINT_EFFORT, DEFAULT_JOINT_VELOCITY, DEFAULT_MESH_DIR};

use super::ExportError;

/// Export options for package generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Directory the package directory is created in
    pub output_dir: PathBuf,
    /// Robot name override (defaults to the first token of the scene name)
    pub robot_name: Option<String>,
    /// Mesh directory inside the package
    pub mesh_dir: String,
    /// Fail instead of warn when several occurrences claim the base link
    pub strict_base_link: bool,
    /// Effort written on joint limits
    pub joint_effort: f64,
    /// Velocity written on joint limits
    pub joint_velocity: f64,
    /// Extra package files copied over the generated package
    pub template_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            robot_name: None,
            mesh_dir: DEFAULT_MESH_DIR.to_string(),
            strict_base_link: false,
            joint_effort: DEFAULT_JOINT_EFFORT,
            joint_velocity: DEFAULT_JOINT_VELOCITY,
            template_dir: None,
        }
    }
}

impl ExportOptions {
    /// Load options from a RON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ExportError::Io(e.to_string()))?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ExportError> {
        ron::from_str(text).map_err(|e| ExportError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let options =
            ExportOptions::from_ron_str(r#"(strict_base_link: true, robot_name: Some("rover"))"#)
                .unwrap();
        assert!(options.strict_base_link);
        assert_eq!(options.robot_name.as_deref(), Some("rover"));
        assert_eq!(options.mesh_dir, "meshes");
        assert_eq!(options.joint_effort, 100.0);
    }

    #[test]
    fn test_invalid_config() {
        let result = ExportOptions::from_ron_str("(joint_effort: \"lots\")");
        assert!(matches!(result, Err(ExportError::Config(_))));
    }
}
