//! Mesh export coordination
//!
//! The coordinator decides which occurrence produces which mesh file; the
//! geometry itself is written by a [`MeshExporter`] collaborator.

mod stl;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::naming::NameResolver;
use crate::scene::{Component, Occurrence, Scene};

pub use stl::StlMeshExporter;

/// Writes the geometry of one occurrence to a mesh file
pub trait MeshExporter {
    /// File extension without the dot
    fn extension(&self) -> &str;

    fn export(
        &mut self,
        occurrence: &Occurrence,
        component: &Component,
        path: &Path,
    ) -> Result<(), MeshError>;
}

/// Mesh writing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Write error: {0}")]
    Write(String),
    #[error("Component {0} has no triangles")]
    Empty(String),
    #[error("Body '{body}' references missing vertex {index}")]
    InvalidIndex { body: String, index: u32 },
    #[error("Body '{body}' has {indices} indices, not a whole number of triangles")]
    IncompleteTriangle { body: String, indices: usize },
    #[error("Occurrence references unknown component {0}")]
    UnknownComponent(String),
}

/// A mesh that could not be written; the run continues
#[derive(Debug, Clone, PartialEq)]
pub struct MeshExportFailure {
    pub occurrence: String,
    pub mesh: String,
    pub reason: MeshError,
}

/// Outcome of a mesh export pass
#[derive(Debug, Clone, Default)]
pub struct MeshExportSummary {
    /// Files written, in export order
    pub exported: Vec<PathBuf>,
    /// Occurrences skipped as superseded or already exported
    pub skipped: Vec<String>,
    pub failures: Vec<MeshExportFailure>,
}

/// Tracks which mesh names were written during one export run
#[derive(Debug, Default)]
pub struct MeshExportCoordinator {
    exported: HashSet<String>,
}

impl MeshExportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an occurrence resolving to `mesh_name` still needs exporting
    pub fn should_export(&self, occurrence: &Occurrence, mesh_name: &str) -> bool {
        !occurrence.superseded && !self.exported.contains(mesh_name)
    }

    /// Record a mesh as written; returns false if it already was
    pub fn mark_exported(&mut self, mesh_name: impl Into<String>) -> bool {
        self.exported.insert(mesh_name.into())
    }

    pub fn is_exported(&self, mesh_name: &str) -> bool {
        self.exported.contains(mesh_name)
    }

    /// Link name -> mesh name for every named occurrence with geometry
    pub fn link_meshes(scene: &Scene, names: &mut NameResolver) -> BTreeMap<String, String> {
        let mut pairs = BTreeMap::new();
        for occurrence in scene.occurrences.iter().filter(|o| !o.superseded) {
            let Some(component) = scene.component(&occurrence.component) else {
                continue;
            };
            if !component.has_bodies() {
                continue;
            }
            if let Some(link) = names.lookup_link_name(&occurrence.id) {
                let link = link.to_string();
                pairs.insert(link, names.mesh_name_for(&component.name));
            }
        }
        pairs
    }

    /// Export one mesh per unique mesh name into `mesh_dir`
    pub fn export_all(
        &mut self,
        scene: &Scene,
        names: &mut NameResolver,
        exporter: &mut dyn MeshExporter,
        mesh_dir: &Path,
    ) -> MeshExportSummary {
        let mut summary = MeshExportSummary::default();

        for occurrence in &scene.occurrences {
            if occurrence.superseded {
                summary.skipped.push(occurrence.id.clone());
                continue;
            }

            let Some(component) = scene.component(&occurrence.component) else {
                summary.failures.push(MeshExportFailure {
                    occurrence: occurrence.id.clone(),
                    mesh: String::new(),
                    reason: MeshError::UnknownComponent(occurrence.component.clone()),
                });
                continue;
            };
            if !component.has_bodies() {
                continue;
            }

            let mesh = names.mesh_name_for(&component.name);
            if !self.should_export(occurrence, &mesh) {
                tracing::debug!("Skipping duplicate: {} (already exported)", mesh);
                summary.skipped.push(occurrence.id.clone());
                continue;
            }

            let path = mesh_dir.join(format!("{}.{}", mesh, exporter.extension()));
            tracing::info!("Exporting: {}", path.display());
            match exporter.export(occurrence, component, &path) {
                Ok(()) => {
                    self.mark_exported(mesh);
                    summary.exported.push(path);
                }
                Err(reason) => {
                    tracing::warn!("Component {} has something wrong: {}", component.name, reason);
                    summary.failures.push(MeshExportFailure {
                        occurrence: occurrence.id.clone(),
                        mesh,
                        reason,
                    });
                }
            }
        }

        summary
    }
}
