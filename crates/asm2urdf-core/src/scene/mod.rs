//! Read-only snapshot of a CAD assembly
//!
//! The host document is captured once into plain values before any name
//! resolution happens, so the exporter never mutates the source design.

mod joint;
mod types;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::PACKAGE_SUFFIX;

pub use joint::{JointGeometryRef, JointMotion, LimitRange, MotionKind, SceneJoint};
pub use types::{Body, Component, Occurrence, PhysicalProperties, RigidTransform};

/// Raw scene data for (de)serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneData {
    name: String,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    occurrences: Vec<Occurrence>,
    #[serde(default)]
    joints: Vec<SceneJoint>,
}

/// Assembly snapshot: components, occurrences and joints
#[derive(Debug, Clone, Serialize)]
#[serde(into = "SceneData")]
pub struct Scene {
    /// Root component name (may carry a version token)
    pub name: String,
    pub components: Vec<Component>,
    /// Occurrences in host traversal order
    pub occurrences: Vec<Occurrence>,
    /// Joints in host order
    pub joints: Vec<SceneJoint>,
    component_index: HashMap<String, usize>,
    occurrence_index: HashMap<String, usize>,
}

impl From<Scene> for SceneData {
    fn from(scene: Scene) -> Self {
        Self {
            name: scene.name,
            components: scene.components,
            occurrences: scene.occurrences,
            joints: scene.joints,
        }
    }
}

impl From<SceneData> for Scene {
    fn from(data: SceneData) -> Self {
        let mut scene = Self {
            name: data.name,
            components: data.components,
            occurrences: data.occurrences,
            joints: data.joints,
            component_index: HashMap::new(),
            occurrence_index: HashMap::new(),
        };
        scene.rebuild_indices();
        scene
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = SceneData::deserialize(deserializer)?;
        Ok(Scene::from(data))
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self::from(SceneData {
            name: name.into(),
            components: Vec::new(),
            occurrences: Vec::new(),
            joints: Vec::new(),
        })
    }

    /// Load a scene snapshot, format chosen by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let format = SceneFormat::from_path(path);
        let text = std::fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        match format {
            SceneFormat::Ron => Self::from_ron_str(&text),
            SceneFormat::Json => Self::from_json_str(&text),
            SceneFormat::Unknown => Err(SceneError::UnsupportedFormat(
                path.to_string_lossy().to_string(),
            )),
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        serde_json::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Rebuild ID indices (first entry wins on duplicates)
    pub fn rebuild_indices(&mut self) {
        self.component_index.clear();
        self.occurrence_index.clear();
        for (i, component) in self.components.iter().enumerate() {
            self.component_index.entry(component.id.clone()).or_insert(i);
        }
        for (i, occurrence) in self.occurrences.iter().enumerate() {
            self.occurrence_index.entry(occurrence.id.clone()).or_insert(i);
        }
    }

    pub fn add_component(&mut self, component: Component) {
        self.component_index
            .entry(component.id.clone())
            .or_insert(self.components.len());
        self.components.push(component);
    }

    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrence_index
            .entry(occurrence.id.clone())
            .or_insert(self.occurrences.len());
        self.occurrences.push(occurrence);
    }

    pub fn add_joint(&mut self, joint: SceneJoint) {
        self.joints.push(joint);
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.component_index.get(id).map(|&i| &self.components[i])
    }

    pub fn occurrence(&self, id: &str) -> Option<&Occurrence> {
        self.occurrence_index.get(id).map(|&i| &self.occurrences[i])
    }

    /// Display name of the component an occurrence references
    pub fn component_name(&self, occurrence: &Occurrence) -> Option<&str> {
        self.component(&occurrence.component)
            .map(|c| c.name.as_str())
    }

    /// Robot name: first whitespace token of the root name
    pub fn robot_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or("robot")
            .to_string()
    }

    /// ROS package name derived from the robot name
    pub fn package_name(&self) -> String {
        format!("{}{}", self.robot_name(), PACKAGE_SUFFIX)
    }

    /// Check references between occurrences, components and joints
    pub fn validate(&self) -> Result<(), Vec<SceneError>> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for occurrence in &self.occurrences {
            if !seen.insert(occurrence.id.as_str()) {
                errors.push(SceneError::DuplicateOccurrence(occurrence.id.clone()));
            }
            if self.component(&occurrence.component).is_none() {
                errors.push(SceneError::UnknownComponent {
                    occurrence: occurrence.id.clone(),
                    component: occurrence.component.clone(),
                });
            }
        }

        for joint in &self.joints {
            for id in [&joint.occurrence_one, &joint.occurrence_two] {
                if self.occurrence(id).is_none() {
                    errors.push(SceneError::UnknownOccurrence {
                        joint: joint.name.clone(),
                        occurrence: id.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Scene file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Ron,
    Json,
    Unknown,
}

impl SceneFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("ron") => SceneFormat::Ron,
            Some("json") => SceneFormat::Json,
            _ => SceneFormat::Unknown,
        }
    }
}

/// Scene loading and consistency errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Failed to parse scene: {0}")]
    Parse(String),
    #[error("Unsupported scene format: {0} (expected .ron or .json)")]
    UnsupportedFormat(String),
    #[error("Duplicate occurrence id: {0}")]
    DuplicateOccurrence(String),
    #[error("Occurrence {occurrence} references unknown component {component}")]
    UnknownComponent {
        occurrence: String,
        component: String,
    },
    #[error("Joint {joint} references unknown occurrence {occurrence}")]
    UnknownOccurrence { joint: String, occurrence: String },
}
