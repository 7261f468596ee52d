//! Joint dictionary extraction

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_LINK_NAME, CM_PER_M, ORIGIN_TOLERANCE, round6};
use crate::naming::{NameResolver, is_base_link};
use crate::scene::{LimitRange, MotionKind, Occurrence, Scene, SceneJoint};

use super::{ExtractError, LimitBound, display_name};

/// URDF joint type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    Fixed,
    Revolute,
    /// Revolute joint without limits
    Continuous,
    Prismatic,
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl JointKind {
    pub fn name(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::Continuous => "continuous",
            JointKind::Prismatic => "prismatic",
            JointKind::Cylindrical => "cylindrical",
            JointKind::PinSlot => "pin_slot",
            JointKind::Planar => "planar",
            JointKind::Ball => "ball",
        }
    }

    /// Whether an `<axis>` element is written
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic
        )
    }

    /// Whether a `<limit>` element is written
    pub fn has_limits(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }
}

impl From<MotionKind> for JointKind {
    fn from(kind: MotionKind) -> Self {
        match kind {
            MotionKind::Fixed => JointKind::Fixed,
            MotionKind::Revolute => JointKind::Revolute,
            MotionKind::Prismatic => JointKind::Prismatic,
            MotionKind::Cylindrical => JointKind::Cylindrical,
            MotionKind::PinSlot => JointKind::PinSlot,
            MotionKind::Planar => JointKind::Planar,
            MotionKind::Ball => JointKind::Ball,
        }
    }
}

/// One entry of the joint dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointEntry {
    #[serde(rename = "type")]
    pub joint_type: JointKind,
    pub axis: [f64; 3],
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub parent: String,
    pub child: String,
    /// Joint position in meters
    pub xyz: [f64; 3],
}

/// Resolved joint name -> joint entry
pub type JointsDict = BTreeMap<String, JointEntry>;

/// Result of a joint pass: every joint stored before the first failure,
/// plus that failure if one occurred.
#[derive(Debug, Clone, Default)]
pub struct JointExtraction {
    pub joints: JointsDict,
    pub error: Option<ExtractError>,
}

impl JointExtraction {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<JointsDict, ExtractError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.joints),
        }
    }
}

/// Build the joint dictionary; halts at the first validation error
pub fn extract_joints(scene: &Scene, names: &mut NameResolver) -> JointExtraction {
    let mut extraction = JointExtraction::default();

    for joint in &scene.joints {
        match extract_joint(scene, joint, names) {
            Ok((name, entry)) => {
                if extraction.joints.contains_key(&name) {
                    tracing::warn!("Joint name '{}' is used more than once, keeping the last", name);
                }
                extraction.joints.insert(name, entry);
            }
            Err(error) => {
                tracing::error!("Joint extraction stopped: {}", error);
                extraction.error = Some(error);
                break;
            }
        }
    }

    extraction
}

fn extract_joint(
    scene: &Scene,
    joint: &SceneJoint,
    names: &mut NameResolver,
) -> Result<(String, JointEntry), ExtractError> {
    let motion = &joint.motion;
    let mut joint_type = JointKind::from(motion.kind);
    let mut axis = [0.0; 3];
    let mut upper_limit = 0.0;
    let mut lower_limit = 0.0;

    match motion.kind {
        MotionKind::Revolute => {
            axis = rounded_axis(motion.rotation_axis);
            match read_limits(&joint.name, &motion.rotation_limits, 1.0)? {
                Some((upper, lower)) => {
                    upper_limit = upper;
                    lower_limit = lower;
                }
                None => joint_type = JointKind::Continuous,
            }
        }
        MotionKind::Prismatic => {
            axis = rounded_axis(motion.slide_direction);
            if let Some((upper, lower)) =
                read_limits(&joint.name, &motion.slide_limits, CM_PER_M)?
            {
                upper_limit = upper;
                lower_limit = lower;
            }
        }
        // Fixed has no motion; the remaining kinds are passed through unchecked
        _ => {}
    }

    let child = find_occurrence(scene, joint, &joint.occurrence_one)?;
    let parent = find_occurrence(scene, joint, &joint.occurrence_two)?;

    let parent_component = display_name(scene, parent);
    let parent_name = if is_base_link(parent_component) {
        BASE_LINK_NAME.to_string()
    } else {
        link_name(names, parent, parent_component)
    };
    let child_name = link_name(names, child, display_name(scene, child));

    let xyz = joint_origin(joint, child, parent)?;

    let entry = JointEntry {
        joint_type,
        axis,
        upper_limit,
        lower_limit,
        parent: parent_name,
        child: child_name,
        xyz,
    };
    Ok((names.resolve_joint_name(&joint.name), entry))
}

fn find_occurrence<'a>(
    scene: &'a Scene,
    joint: &SceneJoint,
    id: &str,
) -> Result<&'a Occurrence, ExtractError> {
    scene
        .occurrence(id)
        .ok_or_else(|| ExtractError::UnknownOccurrence {
            joint: joint.name.clone(),
            occurrence: id.to_string(),
        })
}

fn link_name(names: &mut NameResolver, occurrence: &Occurrence, component: &str) -> String {
    match names.lookup_link_name(&occurrence.id) {
        Some(name) => name.to_string(),
        None => names.resolve_link_name(&occurrence.id, component),
    }
}

fn rounded_axis(axis: Option<[f64; 3]>) -> [f64; 3] {
    axis.unwrap_or_default().map(round6)
}

/// Returns (upper, lower) when both bounds are enabled, `None` when neither is
fn read_limits(
    joint: &str,
    limits: &LimitRange,
    divisor: f64,
) -> Result<Option<(f64, f64)>, ExtractError> {
    match (limits.maximum_enabled, limits.minimum_enabled) {
        (true, true) => Ok(Some((
            round6(limits.maximum / divisor),
            round6(limits.minimum / divisor),
        ))),
        (true, false) => Err(ExtractError::MissingLimitBound {
            joint: joint.to_string(),
            bound: LimitBound::Lower,
        }),
        (false, true) => Err(ExtractError::MissingLimitBound {
            joint: joint.to_string(),
            bound: LimitBound::Upper,
        }),
        (false, false) => Ok(None),
    }
}

/// Element-wise equality within the origin tolerance
fn all_close(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() < ORIGIN_TOLERANCE
}

/// Joint position in meters
///
/// When the parent-side point already agrees with the child-side point or
/// with the child occurrence's translation it is used as is; otherwise it is
/// carried through the parent occurrence's transform.
fn joint_origin(
    joint: &SceneJoint,
    child: &Occurrence,
    parent: &Occurrence,
) -> Result<[f64; 3], ExtractError> {
    let from_one = joint.geometry_one.and_then(|g| g.geometry_point());
    let from_two = joint.geometry_two.and_then(|g| g.geometry_point());

    let point = match (from_one, from_two) {
        (Some(from_one), Some(from_two)) => {
            if all_close(from_two, from_one) || all_close(from_two, child.transform.translation())
            {
                from_two
            } else {
                parent.transform.transform_point(from_two)
            }
        }
        _ => joint
            .geometry_two
            .or(joint.geometry_one)
            .map(|g| g.point())
            .ok_or_else(|| ExtractError::MissingJointOrigin {
                joint: joint.name.clone(),
            })?,
    };

    Ok((point / CM_PER_M).to_array().map(round6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Component, JointGeometryRef, JointMotion, RigidTransform};
    use approx::assert_relative_eq;

    fn scene_with(components: &[(&str, &str)], occurrences: &[(&str, &str)]) -> Scene {
        let mut scene = Scene::new("robot");
        for (id, name) in components {
            scene.add_component(Component::new(*id, *name));
        }
        for (id, component) in occurrences {
            scene.add_occurrence(Occurrence::new(*id, *component));
        }
        scene
    }

    fn arm_scene() -> Scene {
        scene_with(
            &[("c0", "base_link v2"), ("c1", "Arm"), ("c2", "Hand")],
            &[("base:1", "c0"), ("arm:1", "c1"), ("hand:1", "c2")],
        )
    }

    #[test]
    fn test_prismatic_limits_converted_to_meters() {
        let mut scene = arm_scene();
        scene.add_joint(
            SceneJoint::new(
                "Slider 1",
                JointMotion::prismatic([0.0, 1.0, 0.0], LimitRange::bounded(-100.0, 250.0)),
                "arm:1",
                "base:1",
            )
            .with_geometry([0.0; 3], [0.0; 3]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        let slider = &joints["slider_1"];
        assert_eq!(slider.joint_type, JointKind::Prismatic);
        assert_relative_eq!(slider.upper_limit, 2.5);
        assert_relative_eq!(slider.lower_limit, -1.0);
        assert_eq!(slider.axis, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_revolute_without_limits_is_continuous() {
        let mut scene = arm_scene();
        scene.add_joint(
            SceneJoint::new(
                "Rev 1",
                JointMotion::revolute([0.0, 0.0, 1.0], LimitRange::free()),
                "arm:1",
                "base:1",
            )
            .with_geometry([0.0; 3], [0.0; 3]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        let rev = &joints["rev_1"];
        assert_eq!(rev.joint_type, JointKind::Continuous);
        assert_eq!(rev.axis, [0.0, 0.0, 1.0]);
        assert_eq!(rev.upper_limit, 0.0);
        assert_eq!(rev.lower_limit, 0.0);
    }

    #[test]
    fn test_revolute_limits_kept_in_radians() {
        let mut scene = arm_scene();
        scene.add_joint(
            SceneJoint::new(
                "elbow",
                JointMotion::revolute(
                    [0.12345678, 0.0, 0.99234],
                    LimitRange::bounded(-1.5707963, 1.5707963),
                ),
                "arm:1",
                "base:1",
            )
            .with_geometry([0.0; 3], [0.0; 3]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        let elbow = &joints["elbow"];
        assert_eq!(elbow.joint_type, JointKind::Revolute);
        assert_eq!(elbow.axis, [0.123457, 0.0, 0.99234]);
        assert_relative_eq!(elbow.upper_limit, 1.570796);
        assert_relative_eq!(elbow.lower_limit, -1.570796);
    }

    #[test]
    fn test_one_sided_limit_halts_extraction() {
        let mut scene = arm_scene();
        scene.add_joint(
            SceneJoint::new("first", JointMotion::fixed(), "arm:1", "base:1")
                .with_geometry([0.0; 3], [0.0; 3]),
        );
        let limits = LimitRange {
            maximum_enabled: true,
            maximum: 1.0,
            ..LimitRange::default()
        };
        scene.add_joint(
            SceneJoint::new(
                "Wrist",
                JointMotion::revolute([1.0, 0.0, 0.0], limits),
                "hand:1",
                "arm:1",
            )
            .with_geometry([0.0; 3], [0.0; 3]),
        );
        scene.add_joint(
            SceneJoint::new("never", JointMotion::fixed(), "hand:1", "arm:1")
                .with_geometry([0.0; 3], [0.0; 3]),
        );

        let extraction = extract_joints(&scene, &mut NameResolver::new());
        assert!(!extraction.is_ok());
        assert_eq!(extraction.joints.len(), 1);
        assert!(extraction.joints.contains_key("first"));

        let message = extraction.error.unwrap().to_string();
        assert!(message.contains("Wrist"));
        assert!(message.contains("lower limit"));
    }

    #[test]
    fn test_missing_upper_bound_message() {
        let mut scene = arm_scene();
        let limits = LimitRange {
            minimum_enabled: true,
            minimum: -3.0,
            ..LimitRange::default()
        };
        scene.add_joint(SceneJoint::new(
            "slide",
            JointMotion::prismatic([1.0, 0.0, 0.0], limits),
            "arm:1",
            "base:1",
        ));

        let error = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap_err();
        assert_eq!(
            error,
            ExtractError::MissingLimitBound {
                joint: "slide".to_string(),
                bound: LimitBound::Upper,
            }
        );
    }

    #[test]
    fn test_unsupported_kind_passes_through() {
        let mut scene = arm_scene();
        let mut motion = JointMotion::of_kind(MotionKind::Ball);
        motion.rotation_limits.maximum_enabled = true;
        scene.add_joint(
            SceneJoint::new("ball", motion, "arm:1", "base:1").with_geometry([0.0; 3], [0.0; 3]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["ball"].joint_type, JointKind::Ball);
        assert_eq!(joints["ball"].axis, [0.0; 3]);
    }

    #[test]
    fn test_origin_shared_point_not_transformed() {
        let mut scene = arm_scene();
        scene.occurrences[0].transform = RigidTransform::from_translation([50.0, 50.0, 50.0]);
        scene.add_joint(
            SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:1")
                .with_geometry([12.5, -3.0, 7.0], [12.5000001, -3.0, 7.0]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["j"].xyz, [0.125, -0.03, 0.07]);
    }

    #[test]
    fn test_origin_matching_child_translation_not_transformed() {
        let mut scene = arm_scene();
        scene.occurrences[0].transform = RigidTransform::from_translation([50.0, 0.0, 0.0]);
        scene.occurrences[1].transform = RigidTransform::from_translation([10.0, 20.0, 30.0]);
        scene.add_joint(
            SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:1")
                .with_geometry([0.0, 0.0, 0.0], [10.0, 20.0, 30.0]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["j"].xyz, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_origin_transformed_through_parent() {
        let mut scene = arm_scene();
        // Parent rotated 90 degrees about Z and moved to (100, 0, 0)
        scene.occurrences[0].transform = RigidTransform([
            0.0, -1.0, 0.0, 100.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        scene.add_joint(
            SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:1")
                .with_geometry([0.0, 0.0, 0.0], [10.0, 0.0, 5.0]),
        );

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["j"].xyz, [1.0, 0.1, 0.05]);
    }

    #[test]
    fn test_origin_falls_back_to_joint_origin_entity() {
        let mut scene = arm_scene();
        let mut joint = SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:1");
        joint.geometry_one = Some(JointGeometryRef::Geometry { origin: [0.0; 3] });
        joint.geometry_two = Some(JointGeometryRef::JointOrigin {
            origin: [30.0, 0.0, -10.0],
        });
        scene.add_joint(joint);

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["j"].xyz, [0.3, 0.0, -0.1]);
    }

    #[test]
    fn test_origin_falls_back_to_child_side_point() {
        let mut scene = arm_scene();
        let mut joint = SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:1");
        joint.geometry_one = Some(JointGeometryRef::Geometry {
            origin: [12.0, -4.0, 0.5],
        });
        scene.add_joint(joint);

        let joints = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap();
        assert_eq!(joints["j"].xyz, [0.12, -0.04, 0.005]);
    }

    #[test]
    fn test_missing_origin_is_fatal() {
        let mut scene = arm_scene();
        scene.add_joint(SceneJoint::new("Rigid 3", JointMotion::fixed(), "arm:1", "base:1"));

        let error = extract_joints(&scene, &mut NameResolver::new())
            .into_result()
            .unwrap_err();
        assert_eq!(
            error,
            ExtractError::MissingJointOrigin {
                joint: "Rigid 3".to_string()
            }
        );
        assert!(error.to_string().contains("doesn't have joint origin"));
    }

    #[test]
    fn test_parent_base_link_forced() {
        let mut scene = scene_with(
            &[("c0", "base_link v2"), ("c1", "Arm")],
            &[("base:1", "c0"), ("base:2", "c0"), ("arm:1", "c1")],
        );
        scene.add_joint(
            SceneJoint::new("j", JointMotion::fixed(), "arm:1", "base:2")
                .with_geometry([0.0; 3], [0.0; 3]),
        );

        let mut names = NameResolver::new();
        names.resolve_link_name("base:1", "base_link v2");
        names.resolve_link_name("base:2", "base_link v2");
        let joints = extract_joints(&scene, &mut names).into_result().unwrap();
        assert_eq!(joints["j"].parent, "base_link");
        assert_eq!(joints["j"].child, "arm");
    }

    #[test]
    fn test_names_agree_with_prepopulated_resolver() {
        let mut scene = scene_with(
            &[("c0", "base_link"), ("c1", "Wheel")],
            &[("base:1", "c0"), ("wheel:1", "c1"), ("wheel:2", "c1")],
        );
        scene.add_joint(
            SceneJoint::new("left", JointMotion::fixed(), "wheel:1", "base:1")
                .with_geometry([0.0; 3], [0.0; 3]),
        );
        scene.add_joint(
            SceneJoint::new("right", JointMotion::fixed(), "wheel:2", "base:1")
                .with_geometry([0.0; 3], [0.0; 3]),
        );

        let mut names = NameResolver::new();
        names.resolve_link_name("base:1", "base_link");
        names.resolve_link_name("wheel:2", "Wheel");
        names.resolve_link_name("wheel:1", "Wheel");

        let joints = extract_joints(&scene, &mut names).into_result().unwrap();
        assert_eq!(joints["left"].child, "wheel_1");
        assert_eq!(joints["right"].child, "wheel");
    }

    #[test]
    fn test_unknown_occurrence_is_fatal() {
        let mut scene = arm_scene();
        scene.add_joint(
            SceneJoint::new("j", JointMotion::fixed(), "ghost", "base:1")
                .with_geometry([0.0; 3], [0.0; 3]),
        );
        let extraction = extract_joints(&scene, &mut NameResolver::new());
        assert!(matches!(
            extraction.error,
            Some(ExtractError::UnknownOccurrence { .. })
        ));
    }
}
