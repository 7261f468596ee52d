//! Joint records as captured from the host

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Motion type reported by the host
///
/// Written as its snake_case name; read from either the name or the host's
/// joint type ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MotionKindTag", into = "String")]
pub enum MotionKind {
    Fixed,
    Revolute,
    Prismatic,
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl MotionKind {
    /// Kinds in host ordinal order
    pub const ALL: &'static [MotionKind] = &[
        MotionKind::Fixed,
        MotionKind::Revolute,
        MotionKind::Prismatic,
        MotionKind::Cylindrical,
        MotionKind::PinSlot,
        MotionKind::Planar,
        MotionKind::Ball,
    ];

    /// Classify a host joint type ordinal
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Classify a snake_case kind name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MotionKind::Fixed => "fixed",
            MotionKind::Revolute => "revolute",
            MotionKind::Prismatic => "prismatic",
            MotionKind::Cylindrical => "cylindrical",
            MotionKind::PinSlot => "pin_slot",
            MotionKind::Planar => "planar",
            MotionKind::Ball => "ball",
        }
    }
}

/// Serialized form of a [`MotionKind`]
#[derive(Deserialize)]
#[serde(untagged)]
enum MotionKindTag {
    Ordinal(u32),
    Name(String),
}

impl TryFrom<MotionKindTag> for MotionKind {
    type Error = String;

    fn try_from(tag: MotionKindTag) -> Result<Self, Self::Error> {
        match tag {
            MotionKindTag::Ordinal(ordinal) => Self::from_ordinal(ordinal)
                .ok_or_else(|| format!("unknown joint type ordinal {ordinal}")),
            MotionKindTag::Name(name) => {
                Self::from_name(&name).ok_or_else(|| format!("unknown joint type '{name}'"))
            }
        }
    }
}

impl From<MotionKind> for String {
    fn from(kind: MotionKind) -> Self {
        kind.name().to_string()
    }
}

/// Enabled flags and values for one pair of motion limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitRange {
    pub minimum_enabled: bool,
    pub minimum: f64,
    pub maximum_enabled: bool,
    pub maximum: f64,
}

impl LimitRange {
    /// Both bounds enabled
    pub fn bounded(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum_enabled: true,
            minimum,
            maximum_enabled: true,
            maximum,
        }
    }

    /// Neither bound enabled
    pub fn free() -> Self {
        Self::default()
    }
}

/// Motion-specific geometry of a joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointMotion {
    pub kind: MotionKind,
    /// Normalized rotation axis (revolute)
    #[serde(default)]
    pub rotation_axis: Option<[f64; 3]>,
    #[serde(default)]
    pub rotation_limits: LimitRange,
    /// Normalized slide direction (prismatic)
    #[serde(default)]
    pub slide_direction: Option<[f64; 3]>,
    /// Slide limits in centimeters
    #[serde(default)]
    pub slide_limits: LimitRange,
}

impl JointMotion {
    pub fn fixed() -> Self {
        Self::of_kind(MotionKind::Fixed)
    }

    pub fn of_kind(kind: MotionKind) -> Self {
        Self {
            kind,
            rotation_axis: None,
            rotation_limits: LimitRange::default(),
            slide_direction: None,
            slide_limits: LimitRange::default(),
        }
    }

    pub fn revolute(axis: [f64; 3], limits: LimitRange) -> Self {
        Self {
            rotation_axis: Some(axis),
            rotation_limits: limits,
            ..Self::of_kind(MotionKind::Revolute)
        }
    }

    pub fn prismatic(direction: [f64; 3], limits: LimitRange) -> Self {
        Self {
            slide_direction: Some(direction),
            slide_limits: limits,
            ..Self::of_kind(MotionKind::Prismatic)
        }
    }
}

/// Geometry a joint is attached to on one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointGeometryRef {
    /// Plain geometry point, expressed in the occurrence frame
    Geometry { origin: [f64; 3] },
    /// Named joint origin entity
    JointOrigin { origin: [f64; 3] },
}

impl JointGeometryRef {
    pub fn point(&self) -> DVec3 {
        match self {
            JointGeometryRef::Geometry { origin } | JointGeometryRef::JointOrigin { origin } => {
                DVec3::from_array(*origin)
            }
        }
    }

    /// Point usable for origin composition (plain geometry only)
    pub fn geometry_point(&self) -> Option<DVec3> {
        match self {
            JointGeometryRef::Geometry { origin } => Some(DVec3::from_array(*origin)),
            JointGeometryRef::JointOrigin { .. } => None,
        }
    }
}

/// A joint between two occurrences: `occurrence_one` is the child,
/// `occurrence_two` the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneJoint {
    pub name: String,
    pub motion: JointMotion,
    pub occurrence_one: String,
    pub occurrence_two: String,
    #[serde(default)]
    pub geometry_one: Option<JointGeometryRef>,
    #[serde(default)]
    pub geometry_two: Option<JointGeometryRef>,
}

impl SceneJoint {
    pub fn new(
        name: impl Into<String>,
        motion: JointMotion,
        child: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            motion,
            occurrence_one: child.into(),
            occurrence_two: parent.into(),
            geometry_one: None,
            geometry_two: None,
        }
    }

    /// Set both joint geometry points
    pub fn with_geometry(mut self, one: [f64; 3], two: [f64; 3]) -> Self {
        self.geometry_one = Some(JointGeometryRef::Geometry { origin: one });
        self.geometry_two = Some(JointGeometryRef::Geometry { origin: two });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_kind_from_ordinal() {
        assert_eq!(MotionKind::from_ordinal(0), Some(MotionKind::Fixed));
        assert_eq!(MotionKind::from_ordinal(1), Some(MotionKind::Revolute));
        assert_eq!(MotionKind::from_ordinal(2), Some(MotionKind::Prismatic));
        assert_eq!(MotionKind::from_ordinal(6), Some(MotionKind::Ball));
        assert_eq!(MotionKind::from_ordinal(7), None);
    }

    #[test]
    fn test_motion_kind_read_from_ordinal_or_name() {
        let motion: JointMotion = serde_json::from_str(r#"{"kind": 2}"#).unwrap();
        assert_eq!(motion.kind, MotionKind::Prismatic);
        let motion: JointMotion = serde_json::from_str(r#"{"kind": "pin_slot"}"#).unwrap();
        assert_eq!(motion.kind, MotionKind::PinSlot);
        let motion: JointMotion = ron::from_str("(kind: 1)").unwrap();
        assert_eq!(motion.kind, MotionKind::Revolute);

        assert!(serde_json::from_str::<JointMotion>(r#"{"kind": 9}"#).is_err());
        assert!(serde_json::from_str::<JointMotion>(r#"{"kind": "hinge"}"#).is_err());
    }

    #[test]
    fn test_motion_kind_written_as_name() {
        let json = serde_json::to_string(&JointMotion::fixed()).unwrap();
        assert!(json.contains(r#""kind":"fixed""#));
        let restored: JointMotion = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.kind, MotionKind::Fixed);
    }

    #[test]
    fn test_geometry_point_only_for_plain_geometry() {
        let plain = JointGeometryRef::Geometry { origin: [1.0, 2.0, 3.0] };
        let named = JointGeometryRef::JointOrigin { origin: [4.0, 5.0, 6.0] };
        assert_eq!(plain.geometry_point(), Some(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(named.geometry_point(), None);
        assert_eq!(named.point(), DVec3::new(4.0, 5.0, 6.0));
    }
}
