//! Global constants for asm2urdf-core

/// Link name reserved for the root of the kinematic tree
pub const BASE_LINK_NAME: &str = "base_link";

/// Host lengths are centimeters, URDF lengths are meters
pub const CM_PER_M: f64 = 100.0;

/// Scale from host moments of inertia (kg*cm^2) to URDF (kg*m^2)
pub const KG_CM2_TO_KG_M2: f64 = 0.0001;

/// Scale from host lengths (centimeters) to exported mesh units (millimeters)
pub const CM_TO_MM: f64 = 10.0;

/// Scale written on mesh references so millimeter meshes load in meters
pub const MESH_SCALE: f64 = 0.001;

/// Number of decimals kept on every exported float
pub const ROUND_DECIMALS: i32 = 6;

/// Absolute per-axis tolerance when comparing joint origin candidates
pub const ORIGIN_TOLERANCE: f64 = 1e-6;

/// Default effort limit written on revolute/prismatic joints
pub const DEFAULT_JOINT_EFFORT: f64 = 100.0;

/// Default velocity limit written on revolute/prismatic joints
pub const DEFAULT_JOINT_VELOCITY: f64 = 100.0;

/// Default mesh output directory inside the package
pub const DEFAULT_MESH_DIR: &str = "meshes";

/// Suffix appended to the robot name to form the package name
pub const PACKAGE_SUFFIX: &str = "_description";

/// Round to the exported precision
pub fn round6(value: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DECIMALS);
    let rounded = (value * factor).round() / factor;
    // Avoid emitting "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}
