//! XML generation for the robot description files

use std::collections::{BTreeMap, HashSet};

use crate::constants::{BASE_LINK_NAME, MESH_SCALE, round6};
use crate::extract::{InertialEntry, JointEntry, JointKind, JointsDict};

use super::{ExportError, ExportOptions, ExportPlan};

const XACRO_NS: &str = "http://www.ros.org/wiki/xacro";
const MATERIAL_NAME: &str = "silver";
const GAZEBO_COLOR: &str = "Gazebo/Silver";

/// World placement of every link: `base_link` at the origin, every joint
/// child at its joint position.
pub fn link_placements(joints: &JointsDict) -> BTreeMap<String, [f64; 3]> {
    let mut placements = BTreeMap::new();
    placements.insert(BASE_LINK_NAME.to_string(), [0.0; 3]);
    for joint in joints.values() {
        placements.insert(joint.child.clone(), joint.xyz);
    }
    placements
}

/// Full `<robot>.xacro` document
pub fn generate_robot_xacro(
    plan: &ExportPlan,
    options: &ExportOptions,
    mesh_extension: &str,
) -> Result<String, ExportError> {
    let package = &plan.package_name;
    let robot = &plan.robot_name;

    let mut xacro = String::new();
    xacro.push_str(&format!(
        "<?xml version=\"1.0\" ?>\n<robot name=\"{}\" xmlns:xacro=\"{}\">\n\n",
        xml_escape(robot),
        XACRO_NS
    ));
    for file in ["materials.xacro".to_string(), format!("{robot}.trans"), format!("{robot}.gazebo")] {
        xacro.push_str(&format!(
            "<xacro:include filename=\"$(find {})/urdf/{}\" />\n",
            package, file
        ));
    }
    xacro.push('\n');
    xacro.push_str(&generate_robot_body(plan, options, mesh_extension)?);
    xacro.push_str("</robot>\n");
    Ok(xacro)
}

/// Links followed by joints, without the enclosing `<robot>` element
pub fn generate_robot_body(
    plan: &ExportPlan,
    options: &ExportOptions,
    mesh_extension: &str,
) -> Result<String, ExportError> {
    let placements = link_placements(&plan.joints);
    let mut body = String::new();

    let mut written = HashSet::new();
    let link_order = std::iter::once(BASE_LINK_NAME)
        .chain(plan.joints.values().map(|j| j.child.as_str()));
    for name in link_order {
        if !written.insert(name) {
            continue;
        }
        let inertial = plan
            .inertials
            .get(name)
            .ok_or_else(|| ExportError::MissingInertial(name.to_string()))?;
        let placement = placements.get(name).copied().unwrap_or_default();
        let mesh_uri = plan.link_meshes.get(name).map(|mesh| {
            format!(
                "package://{}/{}/{}.{}",
                plan.package_name, options.mesh_dir, mesh, mesh_extension
            )
        });
        write_link(&mut body, name, inertial, placement, mesh_uri.as_deref());
    }

    for (name, joint) in &plan.joints {
        let parent = placements
            .get(&joint.parent)
            .ok_or_else(|| ExportError::UnplacedLink {
                joint: name.clone(),
                link: joint.parent.clone(),
            })?;
        let origin = sub(joint.xyz, *parent);
        write_joint(&mut body, name, joint, origin, options);
    }

    Ok(body)
}

fn write_link(
    urdf: &mut String,
    name: &str,
    inertial: &InertialEntry,
    placement: [f64; 3],
    mesh_uri: Option<&str>,
) {
    urdf.push_str(&format!("<link name=\"{}\">\n", xml_escape(name)));

    let center_of_mass = sub(inertial.center_of_mass, placement);
    let i = &inertial.inertia;
    urdf.push_str("  <inertial>\n");
    urdf.push_str(&format!(
        "    <origin xyz=\"{}\" rpy=\"0 0 0\"/>\n",
        fmt_xyz(center_of_mass)
    ));
    urdf.push_str(&format!("    <mass value=\"{}\"/>\n", inertial.mass));
    urdf.push_str(&format!(
        "    <inertia ixx=\"{}\" iyy=\"{}\" izz=\"{}\" ixy=\"{}\" iyz=\"{}\" ixz=\"{}\"/>\n",
        i.ixx, i.iyy, i.izz, i.ixy, i.iyz, i.ixz
    ));
    urdf.push_str("  </inertial>\n");

    // Links without geometry carry mass only
    if let Some(uri) = mesh_uri {
        let offset = fmt_xyz(placement.map(|v| -v));
        let geometry = format!(
            "    <geometry>\n      <mesh filename=\"{}\" scale=\"{s} {s} {s}\"/>\n    </geometry>\n",
            xml_escape(uri),
            s = MESH_SCALE
        );

        urdf.push_str("  <visual>\n");
        urdf.push_str(&format!("    <origin xyz=\"{}\" rpy=\"0 0 0\"/>\n", offset));
        urdf.push_str(&geometry);
        urdf.push_str(&format!("    <material name=\"{}\"/>\n", MATERIAL_NAME));
        urdf.push_str("  </visual>\n");

        urdf.push_str("  <collision>\n");
        urdf.push_str(&format!("    <origin xyz=\"{}\" rpy=\"0 0 0\"/>\n", offset));
        urdf.push_str(&geometry);
        urdf.push_str("  </collision>\n");
    }

    urdf.push_str("</link>\n\n");
}

fn write_joint(
    urdf: &mut String,
    name: &str,
    joint: &JointEntry,
    origin: [f64; 3],
    options: &ExportOptions,
) {
    urdf.push_str(&format!(
        "<joint name=\"{}\" type=\"{}\">\n",
        xml_escape(name),
        joint.joint_type.name()
    ));
    urdf.push_str(&format!(
        "  <origin xyz=\"{}\" rpy=\"0 0 0\"/>\n",
        fmt_xyz(origin)
    ));
    urdf.push_str(&format!("  <parent link=\"{}\"/>\n", xml_escape(&joint.parent)));
    urdf.push_str(&format!("  <child link=\"{}\"/>\n", xml_escape(&joint.child)));

    if joint.joint_type.has_axis() {
        urdf.push_str(&format!("  <axis xyz=\"{}\"/>\n", fmt_xyz(joint.axis)));
    }

    if joint.joint_type.has_limits() {
        urdf.push_str(&format!(
            "  <limit upper=\"{}\" lower=\"{}\" effort=\"{}\" velocity=\"{}\"/>\n",
            joint.upper_limit, joint.lower_limit, options.joint_effort, options.joint_velocity
        ));
    }

    urdf.push_str("</joint>\n\n");
}

/// `materials.xacro`
pub fn generate_materials_xacro(robot_name: &str) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<robot name=\"{}\" xmlns:xacro=\"{}\" >\n\n\
         <material name=\"{}\">\n  <color rgba=\"0.700 0.700 0.700 1.000\"/>\n</material>\n\n\
         </robot>\n",
        xml_escape(robot_name),
        XACRO_NS,
        MATERIAL_NAME
    )
}

/// `<robot>.trans`: one simple transmission per moving joint
pub fn generate_transmissions(plan: &ExportPlan) -> String {
    let mut trans = format!(
        "<?xml version=\"1.0\" ?>\n<robot name=\"{}\" xmlns:xacro=\"{}\" >\n\n",
        xml_escape(&plan.robot_name),
        XACRO_NS
    );

    for (name, joint) in &plan.joints {
        if joint.joint_type == JointKind::Fixed {
            continue;
        }
        let name = xml_escape(name);
        trans.push_str(&format!("<transmission name=\"{name}_tran\">\n"));
        trans.push_str("  <type>transmission_interface/SimpleTransmission</type>\n");
        trans.push_str(&format!("  <joint name=\"{name}\">\n"));
        trans.push_str(
            "    <hardwareInterface>hardware_interface/EffortJointInterface</hardwareInterface>\n",
        );
        trans.push_str("  </joint>\n");
        trans.push_str(&format!("  <actuator name=\"{name}_actr\">\n"));
        trans.push_str(
            "    <hardwareInterface>hardware_interface/EffortJointInterface</hardwareInterface>\n",
        );
        trans.push_str("    <mechanicalReduction>1</mechanicalReduction>\n");
        trans.push_str("  </actuator>\n");
        trans.push_str("</transmission>\n\n");
    }

    trans.push_str("</robot>\n");
    trans
}

/// `<robot>.gazebo`: control plugin plus per-link surface settings
pub fn generate_gazebo(plan: &ExportPlan) -> String {
    let mut gazebo = format!(
        "<?xml version=\"1.0\" ?>\n<robot name=\"{}\" xmlns:xacro=\"{}\" >\n\n",
        xml_escape(&plan.robot_name),
        XACRO_NS
    );
    gazebo.push_str(&format!(
        "<xacro:property name=\"body_color\" value=\"{}\" />\n\n",
        GAZEBO_COLOR
    ));
    gazebo.push_str("<gazebo>\n  <plugin name=\"control\" filename=\"libgazebo_ros_control.so\"/>\n</gazebo>\n\n");

    let mut written = HashSet::new();
    let links = std::iter::once(BASE_LINK_NAME)
        .chain(plan.joints.values().map(|j| j.child.as_str()));
    for link in links {
        if !written.insert(link) {
            continue;
        }
        gazebo.push_str(&format!("<gazebo reference=\"{}\">\n", xml_escape(link)));
        gazebo.push_str("  <material>${body_color}</material>\n");
        gazebo.push_str("  <mu1>0.2</mu1>\n  <mu2>0.2</mu2>\n");
        gazebo.push_str("  <selfCollide>true</selfCollide>\n");
        if link == BASE_LINK_NAME {
            gazebo.push_str("  <gravity>true</gravity>\n");
        }
        gazebo.push_str("</gazebo>\n\n");
    }

    gazebo.push_str("</robot>\n");
    gazebo
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn fmt_xyz(v: [f64; 3]) -> String {
    let [x, y, z] = v.map(round6);
    format!("{x} {y} {z}")
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_fmt_xyz_rounds_and_drops_negative_zero() {
        assert_eq!(fmt_xyz([0.1234567, -0.0, 2.0]), "0.123457 0 2");
    }

    #[test]
    fn test_link_placements() {
        let mut joints = JointsDict::new();
        joints.insert(
            "j".to_string(),
            JointEntry {
                joint_type: JointKind::Fixed,
                axis: [0.0; 3],
                upper_limit: 0.0,
                lower_limit: 0.0,
                parent: "base_link".to_string(),
                child: "arm".to_string(),
                xyz: [0.1, 0.2, 0.3],
            },
        );
        let placements = link_placements(&joints);
        assert_eq!(placements["base_link"], [0.0; 3]);
        assert_eq!(placements["arm"], [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_materials_xacro() {
        let xml = generate_materials_xacro("rover");
        assert!(xml.contains("<robot name=\"rover\""));
        assert!(xml.contains("<material name=\"silver\">"));
    }
}
