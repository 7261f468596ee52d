//! Binary STL mesh export

use std::io::BufWriter;
use std::path::Path;

use glam::DVec3;

use crate::constants::CM_TO_MM;
use crate::scene::{Component, Occurrence};

use super::{MeshError, MeshExporter};

/// Writes every body of a component as one binary STL, placed in world
/// space by the occurrence transform.
#[derive(Debug, Clone, Copy)]
pub struct StlMeshExporter {
    /// Factor from host units to file units
    pub unit_scale: f64,
}

impl Default for StlMeshExporter {
    fn default() -> Self {
        Self {
            unit_scale: CM_TO_MM,
        }
    }
}

impl StlMeshExporter {
    /// Collect world-space triangles for a component occurrence
    pub fn triangles(
        &self,
        occurrence: &Occurrence,
        component: &Component,
    ) -> Result<Vec<stl_io::Triangle>, MeshError> {
        let mut triangles = Vec::new();

        for body in &component.bodies {
            let world: Vec<DVec3> = body
                .vertices
                .iter()
                .map(|v| occurrence.transform.transform_point(DVec3::from_array(*v)) * self.unit_scale)
                .collect();

            let chunks = body.indices.chunks_exact(3);
            if !chunks.remainder().is_empty() {
                return Err(MeshError::IncompleteTriangle {
                    body: body.name.clone(),
                    indices: body.indices.len(),
                });
            }
            for chunk in chunks {
                let corner = |i: u32| {
                    world
                        .get(i as usize)
                        .copied()
                        .ok_or_else(|| MeshError::InvalidIndex {
                            body: body.name.clone(),
                            index: i,
                        })
                };
                let (v0, v1, v2) = (corner(chunk[0])?, corner(chunk[1])?, corner(chunk[2])?);

                triangles.push(stl_io::Triangle {
                    normal: stl_io::Normal::new(to_f32(triangle_normal(v0, v1, v2))),
                    vertices: [
                        stl_io::Vertex::new(to_f32(v0)),
                        stl_io::Vertex::new(to_f32(v1)),
                        stl_io::Vertex::new(to_f32(v2)),
                    ],
                });
            }
        }

        Ok(triangles)
    }
}

impl MeshExporter for StlMeshExporter {
    fn extension(&self) -> &str {
        "stl"
    }

    fn export(
        &mut self,
        occurrence: &Occurrence,
        component: &Component,
        path: &Path,
    ) -> Result<(), MeshError> {
        let triangles = self.triangles(occurrence, component)?;
        if triangles.is_empty() {
            return Err(MeshError::Empty(component.name.clone()));
        }

        let file = std::fs::File::create(path).map_err(|e| MeshError::Io(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        stl_io::write_stl(&mut writer, triangles.iter())
            .map_err(|e| MeshError::Write(e.to_string()))?;

        Ok(())
    }
}

fn triangle_normal(v0: DVec3, v1: DVec3, v2: DVec3) -> DVec3 {
    let cross = (v1 - v0).cross(v2 - v0);
    if cross.length() > 0.0 {
        cross.normalize()
    } else {
        DVec3::Z
    }
}

fn to_f32(v: DVec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}
