//! Occurrence, component and body types for the assembly snapshot

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Rigid transform as reported by the host: a row-major 4x4 homogeneous
/// matrix with the translation in elements 3, 7 and 11.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RigidTransform(pub [f64; 16]);

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Pure translation (centimeters)
    pub fn from_translation(xyz: [f64; 3]) -> Self {
        let mut m = Self::IDENTITY.0;
        m[3] = xyz[0];
        m[7] = xyz[1];
        m[11] = xyz[2];
        Self(m)
    }

    /// Build from a glam matrix
    pub fn from_mat4(mat: DMat4) -> Self {
        // glam is column-major, the host layout is row-major
        Self(mat.transpose().to_cols_array())
    }

    /// Convert to a glam matrix
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.0).transpose()
    }

    /// Translation column
    pub fn translation(&self) -> DVec3 {
        DVec3::new(self.0[3], self.0[7], self.0[11])
    }

    /// Rotate by the 3x3 block, then add the translation column
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.to_mat4().transform_point3(point)
    }
}

/// Physical properties of an occurrence, in host units and world frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalProperties {
    /// Mass in kg
    pub mass: f64,
    /// Center of mass in centimeters
    pub center_of_mass: [f64; 3],
    /// Moments of inertia about the world origin, kg*cm^2:
    /// [xx, yy, zz, xy, yz, xz]
    pub moments_of_inertia: [f64; 6],
}

/// Triangle mesh of a rigid body, component-local centimeters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl Body {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A named part definition; display names are not unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bodies: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn has_bodies(&self) -> bool {
        !self.bodies.is_empty()
    }
}

/// An instanced placement of a component in the assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Run-unique occurrence identifier
    pub id: String,
    /// ID of the referenced component
    pub component: String,
    #[serde(default)]
    pub transform: RigidTransform,
    #[serde(default)]
    pub physical: PhysicalProperties,
    /// Stale duplicate left over from an earlier duplication pass
    #[serde(default)]
    pub superseded: bool,
}

impl Occurrence {
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            transform: RigidTransform::IDENTITY,
            physical: PhysicalProperties::default(),
            superseded: false,
        }
    }

    pub fn with_transform(mut self, transform: RigidTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_physical(mut self, physical: PhysicalProperties) -> Self {
        self.physical = physical;
        self
    }

    pub fn superseded(mut self) -> Self {
        self.superseded = true;
        self
    }
}
