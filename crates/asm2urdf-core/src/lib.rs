//! Assembly to URDF export core
//!
//! This crate turns a snapshot of a CAD assembly into a ROS robot description
//! package:
//! - Scene: read-only snapshot of occurrences, components and joints
//! - NameResolver: run-scoped authority for unique link and mesh names
//! - Extractors: joint and inertial dictionaries keyed by resolved names
//! - MeshExportCoordinator: one mesh file per unique mesh name
//! - Export: URDF/xacro, launch and package file generation

pub mod constants;
pub mod export;
pub mod extract;
pub mod inertia;
pub mod mesh;
pub mod naming;
pub mod scene;

pub use constants::*;
pub use export::*;
pub use extract::*;
pub use inertia::*;
pub use mesh::*;
pub use naming::*;
pub use scene::*;
