//! Run-scoped link, joint and mesh naming
//!
//! CAD assemblies allow duplicate, versioned and decorated names. The
//! [`NameResolver`] maps them onto one collision-free scheme shared by the
//! link list, the joint list and the mesh filenames of a single export.

use std::collections::{HashMap, HashSet};

use crate::constants::BASE_LINK_NAME;

/// Clean a raw host name into a URDF-legal identifier
///
/// - Remove commas
/// - Replace spaces, colons and parentheses with underscores
/// - Collapse runs of underscores and trim them at both ends
/// - Lowercase
pub fn clean_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = match c {
            ',' => continue,
            ' ' | ':' | '(' | ')' => '_',
            other => other,
        };
        if c == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.trim_matches('_').to_lowercase()
}

/// Whether a raw component name designates the base link
///
/// Hosts append a version token after a space ("base_link v3"), so only the
/// first whitespace-delimited token is compared.
pub fn is_base_link(component_name: &str) -> bool {
    component_name
        .split_whitespace()
        .next()
        .is_some_and(|token| token.to_lowercase() == BASE_LINK_NAME)
}

/// Naming authority for one export run
///
/// Not shared across runs and not thread-safe; the export call chain owns it.
#[derive(Debug, Default)]
pub struct NameResolver {
    /// Occurrence id -> resolved link name (immutable once set)
    occurrence_to_link: HashMap<String, String>,
    /// Cleaned base name -> number of suffixed assignments so far
    base_name_counts: HashMap<String, u32>,
    /// Every link name issued so far
    used_names: HashSet<String>,
    /// Component display name -> mesh base name
    component_to_mesh: HashMap<String, String>,
    /// Every mesh name issued so far
    used_mesh_names: HashSet<String>,
    /// Occurrences that matched the base-link identity, in claim order
    base_link_claims: Vec<String>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve (and memoize) the unique link name for an occurrence
    ///
    /// The same occurrence id always yields the same name, whatever component
    /// name is passed on later calls.
    pub fn resolve_link_name(&mut self, occurrence_id: &str, component_name: &str) -> String {
        if let Some(name) = self.occurrence_to_link.get(occurrence_id) {
            return name.clone();
        }

        let base = if is_base_link(component_name) {
            BASE_LINK_NAME.to_string()
        } else {
            clean_name(component_name)
        };
        // "Base Link" cleans to the same identity as "base_link v2"
        if base == BASE_LINK_NAME {
            self.base_link_claims.push(occurrence_id.to_string());
        }

        let unique = if base == BASE_LINK_NAME && !self.used_names.contains(BASE_LINK_NAME) {
            base
        } else {
            self.disambiguate(base)
        };

        self.used_names.insert(unique.clone());
        self.occurrence_to_link
            .insert(occurrence_id.to_string(), unique.clone());
        unique
    }

    /// First use of a base name is bare, then `_1`, `_2`, ... skipping any
    /// candidate that is already taken.
    fn disambiguate(&mut self, base: String) -> String {
        let count = match self.base_name_counts.get(&base) {
            Some(&count) => count,
            None if !self.used_names.contains(&base) => {
                self.base_name_counts.insert(base.clone(), 0);
                return base;
            }
            None => 0,
        };

        let mut next = count + 1;
        let mut candidate = format!("{base}_{next}");
        while self.used_names.contains(&candidate) {
            next += 1;
            candidate = format!("{base}_{next}");
        }
        self.base_name_counts.insert(base, next);
        candidate
    }

    /// Look up a previously resolved link name
    pub fn lookup_link_name(&self, occurrence_id: &str) -> Option<&str> {
        self.occurrence_to_link.get(occurrence_id).map(String::as_str)
    }

    /// Joint names are cleaned but not disambiguated
    pub fn resolve_joint_name(&self, raw_joint_name: &str) -> String {
        clean_name(raw_joint_name)
    }

    /// Mesh base name for a component display name
    ///
    /// Keyed by component, so every occurrence of one component shares a
    /// single mesh file. Distinct components never share a mesh name.
    pub fn mesh_name_for(&mut self, component_name: &str) -> String {
        if let Some(mesh) = self.component_to_mesh.get(component_name) {
            return mesh.clone();
        }

        let base = if is_base_link(component_name) {
            BASE_LINK_NAME.to_string()
        } else {
            clean_name(component_name)
        };
        let mut mesh = base.clone();
        let mut next = 0;
        while self.used_mesh_names.contains(&mesh) {
            next += 1;
            mesh = format!("{base}_{next}");
        }
        self.used_mesh_names.insert(mesh.clone());
        self.component_to_mesh
            .insert(component_name.to_string(), mesh.clone());
        mesh
    }

    /// Occurrence ids that claimed the base-link identity
    pub fn base_link_claimants(&self) -> &[String] {
        &self.base_link_claims
    }

    /// Whether any occurrence resolved to the bare base link name
    pub fn has_base_link(&self) -> bool {
        self.used_names.contains(BASE_LINK_NAME)
    }

    /// Sorted (occurrence id, link name) pairs
    pub fn link_names(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .occurrence_to_link
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Sorted (component name, mesh name) pairs
    pub fn mesh_names(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .component_to_mesh
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Dump both mappings at debug level
    pub fn log_mapping(&self) {
        for (occurrence, link) in self.link_names() {
            tracing::debug!("link: {} -> {}", occurrence, link);
        }
        for (component, mesh) in self.mesh_names() {
            tracing::debug!("mesh: {} -> {}", component, mesh);
        }
    }
}
