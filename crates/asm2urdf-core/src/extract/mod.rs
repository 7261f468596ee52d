//! Joint and inertial dictionary extraction
//!
//! Both extractors share one [`NameResolver`](crate::naming::NameResolver) so
//! the link names in the inertial dictionary and the joint dictionary agree.

mod inertial;
mod joints;

use crate::scene::{Occurrence, Scene};

pub use inertial::{InertialDict, InertialEntry, extract_inertials};
pub use joints::{JointEntry, JointExtraction, JointKind, JointsDict, extract_joints};

/// Which bound of a limit pair is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBound {
    Upper,
    Lower,
}

impl std::fmt::Display for LimitBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitBound::Upper => write!(f, "upper limit"),
            LimitBound::Lower => write!(f, "lower limit"),
        }
    }
}

/// Fatal validation errors raised while extracting joints
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("{joint} is not set its {bound}. Please set it and try again.")]
    MissingLimitBound { joint: String, bound: LimitBound },
    #[error("{joint} doesn't have joint origin. Please set it and run again.")]
    MissingJointOrigin { joint: String },
    #[error("{joint} references unknown occurrence {occurrence}")]
    UnknownOccurrence { joint: String, occurrence: String },
}

/// Component display name of an occurrence, falling back to its id
pub(crate) fn display_name<'a>(scene: &'a Scene, occurrence: &'a Occurrence) -> &'a str {
    scene
        .component_name(occurrence)
        .unwrap_or(occurrence.id.as_str())
}
