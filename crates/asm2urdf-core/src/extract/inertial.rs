//! Inertial dictionary extraction

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{CM_PER_M, KG_CM2_TO_KG_M2, round6};
use crate::inertia::InertiaMatrix;
use crate::naming::NameResolver;
use crate::scene::Scene;

use super::display_name;

/// Mass properties of one link
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialEntry {
    /// Mass in kg
    pub mass: f64,
    /// Center of mass in meters, world frame
    pub center_of_mass: [f64; 3],
    /// Inertia about the center of mass, kg*m^2
    pub inertia: InertiaMatrix,
}

/// Resolved link name -> inertial entry
pub type InertialDict = BTreeMap<String, InertialEntry>;

/// Build the inertial dictionary, naming every live occurrence
pub fn extract_inertials(scene: &Scene, names: &mut NameResolver) -> InertialDict {
    let mut inertials = InertialDict::new();

    for occurrence in scene.occurrences.iter().filter(|o| !o.superseded) {
        let link = names.resolve_link_name(&occurrence.id, display_name(scene, occurrence));

        let physical = &occurrence.physical;
        let center_of_mass = physical.center_of_mass.map(|v| v / CM_PER_M);
        let world = InertiaMatrix::from_moments(physical.moments_of_inertia).scaled(KG_CM2_TO_KG_M2);

        inertials.insert(
            link,
            InertialEntry {
                mass: physical.mass,
                center_of_mass: center_of_mass.map(round6),
                inertia: world.about_center_of_mass(center_of_mass, physical.mass),
            },
        );
    }

    inertials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Component, Occurrence, PhysicalProperties};
    use approx::assert_relative_eq;

    #[test]
    fn test_inertials_keyed_by_resolved_names() {
        let mut scene = Scene::new("robot");
        scene.add_component(Component::new("c0", "base_link v1"));
        scene.add_component(Component::new("c1", "Leg"));
        scene.add_occurrence(Occurrence::new("base_link v1:1", "c0"));
        scene.add_occurrence(Occurrence::new("Leg:1", "c1"));
        scene.add_occurrence(Occurrence::new("Leg:2", "c1"));
        scene.add_occurrence(Occurrence::new("Leg:old", "c1").superseded());

        let mut names = NameResolver::new();
        let inertials = extract_inertials(&scene, &mut names);

        let keys: Vec<_> = inertials.keys().map(String::as_str).collect();
        assert_eq!(keys, ["base_link", "leg", "leg_1"]);
        assert_eq!(names.lookup_link_name("Leg:2"), Some("leg_1"));
        assert_eq!(names.lookup_link_name("Leg:old"), None);
    }

    #[test]
    fn test_units_converted() {
        let mut scene = Scene::new("robot");
        scene.add_component(Component::new("c0", "base_link"));
        scene.add_occurrence(Occurrence::new("b", "c0").with_physical(PhysicalProperties {
            mass: 2.0,
            center_of_mass: [100.0, 0.0, 0.0],
            moments_of_inertia: [10000.0, 30000.0, 50000.0, 0.0, 0.0, 0.0],
        }));

        let inertials = extract_inertials(&scene, &mut NameResolver::new());
        let base = &inertials["base_link"];
        assert_relative_eq!(base.mass, 2.0);
        assert_eq!(base.center_of_mass, [1.0, 0.0, 0.0]);
        // iyy, izz lose m * x^2 = 2
        assert_relative_eq!(base.inertia.ixx, 1.0);
        assert_relative_eq!(base.inertia.iyy, 1.0);
        assert_relative_eq!(base.inertia.izz, 3.0);
    }
}
