//! Import Deduplication
//!
//! A schema re-exported by another package shows up once per declaring
//! package, all with the same origin (`x-kcl-type` package + type name).
//! Only one of them is documented in full; the others become references.
//!
//! Canonical choice, per origin:
//! 1. the first declaration (in traversal order) that lives in its origin package
//! 2. otherwise the first declaration in traversal order
//!
//! The partition is computed once over the whole run, before any rendering.

use std::collections::BTreeMap;

use super::SchemaDecl;

/// Identity of the underlying schema behind one or more declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OriginKey {
    pub package: String,
    pub type_name: String,
}

/// What the generator does with a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rendered in full
    Canonical,
    /// Rendered as a reference to the declaration at `canonical`
    Alias { canonical: usize },
}

/// Canonical/alias partition of all declarations of a run
#[derive(Debug, Clone, Default)]
pub struct ImportPartition {
    roles: Vec<Role>,
    canonical_by_origin: BTreeMap<OriginKey, usize>,
}

impl ImportPartition {
    /// Partition `decls`, which must already be in traversal order
    pub fn compute(decls: &[SchemaDecl]) -> Self {
        let mut groups: BTreeMap<OriginKey, Vec<usize>> = BTreeMap::new();
        for (idx, decl) in decls.iter().enumerate() {
            groups.entry(decl.origin.key()).or_default().push(idx);
        }

        let mut canonical_by_origin = BTreeMap::new();
        for (origin, members) in groups {
            let canonical = members
                .iter()
                .copied()
                .find(|&idx| decls[idx].is_in_origin_package())
                .unwrap_or(members[0]);
            canonical_by_origin.insert(origin, canonical);
        }

        let roles = decls
            .iter()
            .enumerate()
            .map(|(idx, decl)| match canonical_by_origin.get(&decl.origin.key()) {
                Some(&canonical) if canonical != idx => Role::Alias { canonical },
                _ => Role::Canonical,
            })
            .collect();

        Self {
            roles,
            canonical_by_origin,
        }
    }

    pub fn role(&self, idx: usize) -> Role {
        self.roles.get(idx).copied().unwrap_or(Role::Canonical)
    }

    /// Index of the canonical declaration for `idx` (itself if canonical)
    pub fn canonical_of(&self, idx: usize) -> usize {
        match self.role(idx) {
            Role::Canonical => idx,
            Role::Alias { canonical } => canonical,
        }
    }

    pub fn canonical_for(&self, origin: &OriginKey) -> Option<usize> {
        self.canonical_by_origin.get(origin).copied()
    }

    pub fn canonical_count(&self) -> usize {
        self.canonical_by_origin.len()
    }

    pub fn alias_count(&self) -> usize {
        self.roles.len() - self.canonical_count()
    }
}
