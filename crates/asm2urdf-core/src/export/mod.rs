//! Robot description package export
//!
//! Export runs in two stages:
//! - [`prepare`] resolves names and builds the joint and inertial
//!   dictionaries without touching the filesystem
//! - [`export_package`] writes the xacro, launch and package files, then
//!   drives the mesh coordinator

mod launch;
mod options;
mod package;
mod xml;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::constants::{BASE_LINK_NAME, PACKAGE_SUFFIX};
use crate::extract::{
    ExtractError, InertialDict, JointKind, JointsDict, extract_inertials, extract_joints,
};
use crate::mesh::{MeshExportCoordinator, MeshExportFailure, MeshExporter};
use crate::naming::NameResolver;
use crate::scene::{Scene, SceneError};

pub use launch::{
    generate_controller_launch, generate_controller_yaml, generate_display_launch,
    generate_gazebo_launch,
};
pub use options::ExportOptions;
pub use package::{
    copy_package, generate_cmakelists, generate_package_xml, generate_rviz_config,
    update_cmakelists, update_package_xml,
};
pub use xml::{
    generate_gazebo, generate_materials_xacro, generate_robot_body, generate_robot_xacro,
    generate_transmissions, link_placements, xml_escape,
};

/// Export errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("Scene validation failed: {0:?}")]
    Scene(Vec<SceneError>),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("There is no base_link. Please set base_link and run again.")]
    NoBaseLinkFound,
    #[error("More than one occurrence claims base_link: {0:?}")]
    AmbiguousBaseLink(Vec<String>),
    #[error("Link {0} has no inertial entry")]
    MissingInertial(String),
    #[error("Joint {joint} attaches to link {link}, which is not placed in the tree")]
    UnplacedLink { joint: String, link: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid export config: {0}")]
    Config(String),
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e.to_string())
    }
}

/// Everything the writers need, computed before any file is touched
#[derive(Debug)]
pub struct ExportPlan {
    pub robot_name: String,
    pub package_name: String,
    pub resolver: NameResolver,
    pub inertials: InertialDict,
    pub joints: JointsDict,
    /// Link name -> mesh name, for links with geometry
    pub link_meshes: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

/// Outcome of a full package export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub package_dir: PathBuf,
    pub links: usize,
    pub joints: usize,
    pub meshes_exported: Vec<PathBuf>,
    pub mesh_failures: Vec<MeshExportFailure>,
    pub warnings: Vec<String>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.mesh_failures.is_empty() && self.warnings.is_empty()
    }
}

/// Resolve names and build both dictionaries
pub fn prepare(scene: &Scene, options: &ExportOptions) -> Result<ExportPlan, ExportError> {
    scene.validate().map_err(ExportError::Scene)?;

    let robot_name = options
        .robot_name
        .clone()
        .unwrap_or_else(|| scene.robot_name());
    let package_name = format!("{}{}", robot_name, PACKAGE_SUFFIX);
    let mut warnings = Vec::new();

    let mut resolver = NameResolver::new();
    let inertials = extract_inertials(scene, &mut resolver);
    let joints = extract_joints(scene, &mut resolver).into_result()?;

    if !inertials.contains_key(BASE_LINK_NAME) {
        tracing::error!("There is no base_link component");
        return Err(ExportError::NoBaseLinkFound);
    }

    let claimants = resolver.base_link_claimants();
    if claimants.len() > 1 {
        if options.strict_base_link {
            return Err(ExportError::AmbiguousBaseLink(claimants.to_vec()));
        }
        let message = format!(
            "{} occurrences claim base_link; {} keeps it, the rest are suffixed: {:?}",
            claimants.len(),
            claimants[0],
            &claimants[1..]
        );
        tracing::warn!("{}", message);
        warnings.push(message);
    }

    let children: BTreeSet<&str> = joints.values().map(|j| j.child.as_str()).collect();
    for (name, joint) in &joints {
        if !inertials.contains_key(&joint.child) {
            return Err(ExportError::MissingInertial(joint.child.clone()));
        }
        if joint.parent != BASE_LINK_NAME && !children.contains(joint.parent.as_str()) {
            return Err(ExportError::UnplacedLink {
                joint: name.clone(),
                link: joint.parent.clone(),
            });
        }
        if !matches!(
            joint.joint_type,
            JointKind::Fixed | JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic
        ) {
            let message = format!(
                "Joint {} has type {}, which URDF consumers may not support",
                name,
                joint.joint_type.name()
            );
            tracing::warn!("{}", message);
            warnings.push(message);
        }
    }

    for link in inertials.keys() {
        if link != BASE_LINK_NAME && !children.contains(link.as_str()) {
            let message = format!("Link {} is not connected by any joint and is left out", link);
            tracing::warn!("{}", message);
            warnings.push(message);
        }
    }

    let link_meshes = MeshExportCoordinator::link_meshes(scene, &mut resolver);
    resolver.log_mapping();

    tracing::info!(
        "Prepared {}: {} links, {} joints",
        robot_name,
        inertials.len(),
        joints.len()
    );

    Ok(ExportPlan {
        robot_name,
        package_name,
        resolver,
        inertials,
        joints,
        link_meshes,
        warnings,
    })
}

/// Prepare, write the package tree and export meshes
pub fn export_package(
    scene: &Scene,
    options: &ExportOptions,
    exporter: &mut dyn MeshExporter,
) -> Result<ExportReport, ExportError> {
    let mut plan = prepare(scene, options)?;

    let package_dir = options.output_dir.join(&plan.package_name);
    let urdf_dir = package_dir.join("urdf");
    let launch_dir = package_dir.join("launch");
    let mesh_dir = package_dir.join(&options.mesh_dir);
    for dir in [&urdf_dir, &launch_dir, &mesh_dir] {
        std::fs::create_dir_all(dir)?;
    }
    tracing::info!("Writing package to {}", package_dir.display());

    let robot = plan.robot_name.clone();
    let package = plan.package_name.clone();

    write_file(
        &urdf_dir.join(format!("{robot}.xacro")),
        &generate_robot_xacro(&plan, options, exporter.extension())?,
    )?;
    write_file(&urdf_dir.join("materials.xacro"), &generate_materials_xacro(&robot))?;
    write_file(&urdf_dir.join(format!("{robot}.trans")), &generate_transmissions(&plan))?;
    write_file(&urdf_dir.join(format!("{robot}.gazebo")), &generate_gazebo(&plan))?;

    write_file(&launch_dir.join("display.launch"), &generate_display_launch(&robot, &package))?;
    write_file(&launch_dir.join("gazebo.launch"), &generate_gazebo_launch(&robot, &package))?;
    write_file(
        &launch_dir.join("controller.launch"),
        &generate_controller_launch(&plan),
    )?;
    write_file(&launch_dir.join("controller.yaml"), &generate_controller_yaml(&plan))?;
    write_file(&launch_dir.join("urdf.rviz"), &generate_rviz_config())?;

    let cmakelists = package_dir.join("CMakeLists.txt");
    let package_xml = package_dir.join("package.xml");
    write_file(&cmakelists, &generate_cmakelists())?;
    write_file(&package_xml, &generate_package_xml())?;
    if let Some(template_dir) = &options.template_dir {
        copy_package(template_dir, &package_dir)?;
    }
    update_cmakelists(&cmakelists, &package)?;
    update_package_xml(&package_xml, &package)?;

    let mut coordinator = MeshExportCoordinator::new();
    let meshes = coordinator.export_all(scene, &mut plan.resolver, exporter, &mesh_dir);

    let mut warnings = plan.warnings;
    for failure in &meshes.failures {
        warnings.push(format!(
            "Mesh for {} was not written: {}",
            failure.occurrence, failure.reason
        ));
    }

    tracing::info!(
        "Exported {}: {} meshes, {} mesh failures",
        package,
        meshes.exported.len(),
        meshes.failures.len()
    );

    Ok(ExportReport {
        package_dir,
        links: link_placements(&plan.joints).len(),
        joints: plan.joints.len(),
        meshes_exported: meshes.exported,
        mesh_failures: meshes.failures,
        warnings,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents)
        .map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))
}
