//! Inertia tensor conversions

use serde::{Deserialize, Serialize};

use crate::constants::round6;

/// Inertia tensor (symmetric 3x3 matrix), kg*m^2
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InertiaMatrix {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub ixy: f64,
    pub iyz: f64,
    pub ixz: f64,
}

impl InertiaMatrix {
    /// Build from host ordering [xx, yy, zz, xy, yz, xz]
    pub fn from_moments(moments: [f64; 6]) -> Self {
        let [ixx, iyy, izz, ixy, iyz, ixz] = moments;
        Self {
            ixx,
            iyy,
            izz,
            ixy,
            iyz,
            ixz,
        }
    }

    /// Shift a tensor taken about the world origin to the center of mass
    /// (parallel axis theorem). Products keep the host sign convention.
    pub fn about_center_of_mass(&self, center_of_mass: [f64; 3], mass: f64) -> Self {
        let [x, y, z] = center_of_mass;
        Self {
            ixx: round6(self.ixx - mass * (y * y + z * z)),
            iyy: round6(self.iyy - mass * (x * x + z * z)),
            izz: round6(self.izz - mass * (x * x + y * y)),
            ixy: round6(self.ixy + mass * x * y),
            iyz: round6(self.iyz + mass * y * z),
            ixz: round6(self.ixz + mass * x * z),
        }
    }

    /// Multiply every component by a unit scale factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ixx: self.ixx * factor,
            iyy: self.iyy * factor,
            izz: self.izz * factor,
            ixy: self.ixy * factor,
            iyz: self.iyz * factor,
            ixz: self.ixz * factor,
        }
    }

    /// Get as array in URDF attribute order [ixx, iyy, izz, ixy, iyz, ixz]
    pub fn to_array(&self) -> [f64; 6] {
        [self.ixx, self.iyy, self.izz, self.ixy, self.iyz, self.ixz]
    }
}
