use std::collections::BTreeSet;

use crate::error::{Result, SelectionError};
use crate::topology::MeshRef;

use super::ElementType;

/// A typed subset of one mesh's elements.
///
/// An empty index set is the *complete* sentinel: it stands for every element
/// of its type on the mesh without materializing them. Operations whose
/// result would be an explicit empty set return `None` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSet {
    mesh: MeshRef,
    element: ElementType,
    indices: BTreeSet<u32>,
}

impl ComponentSet {
    /// The whole mesh at the given element type.
    #[must_use]
    pub fn complete(mesh: MeshRef, element: ElementType) -> Self {
        Self {
            mesh,
            element,
            indices: BTreeSet::new(),
        }
    }

    /// Builds a set from explicit indices.
    ///
    /// An empty iterator yields the complete sentinel.
    #[must_use]
    pub fn from_indices(
        mesh: MeshRef,
        element: ElementType,
        indices: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            mesh,
            element,
            indices: indices.into_iter().collect(),
        }
    }

    /// A set holding exactly one element.
    #[must_use]
    pub fn single(mesh: MeshRef, element: ElementType, index: u32) -> Self {
        Self::from_indices(mesh, element, [index])
    }

    /// A set on the same mesh and element type, or `None` if `indices` is empty.
    #[must_use]
    pub fn with_indices(&self, indices: impl IntoIterator<Item = u32>) -> Option<Self> {
        let indices: BTreeSet<u32> = indices.into_iter().collect();
        if indices.is_empty() {
            return None;
        }
        Some(Self {
            mesh: self.mesh,
            element: self.element,
            indices,
        })
    }

    #[must_use]
    pub fn mesh(&self) -> MeshRef {
        self.mesh
    }

    #[must_use]
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Explicit indices. Empty for the complete sentinel.
    #[must_use]
    pub fn indices(&self) -> &BTreeSet<u32> {
        &self.indices
    }

    /// Number of explicit indices (zero for the complete sentinel).
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` for the complete sentinel.
    #[must_use]
    pub fn is_complete_sentinel(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if the set covers the whole domain of its type.
    ///
    /// `domain` is the element count of this type on the mesh.
    #[must_use]
    pub fn is_complete(&self, domain: usize) -> bool {
        self.is_complete_sentinel() || self.indices.len() >= domain
    }

    /// Membership test. The complete sentinel contains every index.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.is_complete_sentinel() || self.indices.contains(&index)
    }

    /// The explicit index set, expanding the sentinel to `0..domain`.
    #[must_use]
    pub fn resolve(&self, domain: usize) -> BTreeSet<u32> {
        if self.is_complete_sentinel() {
            domain_indices(domain)
        } else {
            self.indices.clone()
        }
    }

    /// Expands the complete sentinel into explicit indices.
    #[must_use]
    pub fn materialize(&self, domain: usize) -> Self {
        Self {
            mesh: self.mesh,
            element: self.element,
            indices: self.resolve(domain),
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self, domain: usize) -> bool {
        if other.is_complete_sentinel() {
            return true;
        }
        if self.is_complete_sentinel() {
            return other.is_complete(domain);
        }
        self.indices.is_subset(&other.indices)
    }

    /// Set union. Either side being complete makes the result complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the sets belong to different meshes or types.
    pub fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        if self.is_complete_sentinel() || other.is_complete_sentinel() {
            return Ok(Self::complete(self.mesh, self.element));
        }
        Ok(Self {
            mesh: self.mesh,
            element: self.element,
            indices: self.indices.union(&other.indices).copied().collect(),
        })
    }

    /// Elements of `self` not in `other`, `None` if nothing remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the sets belong to different meshes or types.
    pub fn difference(&self, other: &Self, domain: usize) -> Result<Option<Self>> {
        self.check_compatible(other)?;
        let other = other.resolve(domain);
        Ok(self.with_indices(self.resolve(domain).difference(&other).copied()))
    }

    /// Symmetric difference, `None` if nothing remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the sets belong to different meshes or types.
    pub fn toggle(&self, other: &Self, domain: usize) -> Result<Option<Self>> {
        self.check_compatible(other)?;
        let other = other.resolve(domain);
        Ok(self.with_indices(
            self.resolve(domain)
                .symmetric_difference(&other)
                .copied(),
        ))
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.mesh != other.mesh {
            return Err(SelectionError::MeshMismatch.into());
        }
        if self.element != other.element {
            return Err(SelectionError::Incompatible {
                expected: self.element,
                found: other.element,
            }
            .into());
        }
        Ok(())
    }
}

/// Every index of a domain with `count` elements.
#[must_use]
pub fn domain_indices(count: usize) -> BTreeSet<u32> {
    (0..count).filter_map(|i| u32::try_from(i).ok()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MeshselError;
    use slotmap::SlotMap;

    fn mesh_refs() -> (MeshRef, MeshRef) {
        let mut keys: SlotMap<MeshRef, ()> = SlotMap::with_key();
        (keys.insert(()), keys.insert(()))
    }

    fn faces(mesh: MeshRef, indices: &[u32]) -> ComponentSet {
        ComponentSet::from_indices(mesh, ElementType::Face, indices.iter().copied())
    }

    #[test]
    fn complete_sentinel_is_distinct_from_materialized() {
        let (mesh, _) = mesh_refs();
        let sentinel = ComponentSet::complete(mesh, ElementType::Face);
        let full = sentinel.materialize(4);

        assert!(sentinel.is_complete_sentinel());
        assert!(!full.is_complete_sentinel());
        assert!(full.is_complete(4));
        assert!(!faces(mesh, &[0, 1, 2]).is_complete(4));
        assert_eq!(full.len(), 4);
    }

    #[test]
    fn union_with_sentinel_is_complete() {
        let (mesh, _) = mesh_refs();
        let partial = faces(mesh, &[1, 2]);
        let whole = ComponentSet::complete(mesh, ElementType::Face);
        assert!(partial.union(&whole).unwrap().is_complete_sentinel());
        assert_eq!(
            partial.union(&faces(mesh, &[3])).unwrap(),
            faces(mesh, &[1, 2, 3])
        );
    }

    #[test]
    fn difference_against_sentinel_empties() {
        let (mesh, _) = mesh_refs();
        let partial = faces(mesh, &[1, 2]);
        let whole = ComponentSet::complete(mesh, ElementType::Face);

        assert_eq!(partial.difference(&whole, 5).unwrap(), None);
        assert_eq!(
            whole.difference(&partial, 5).unwrap(),
            Some(faces(mesh, &[0, 3, 4]))
        );
    }

    #[test]
    fn toggle_twice_restores() {
        let (mesh, _) = mesh_refs();
        let a = faces(mesh, &[0, 1]);
        let b = faces(mesh, &[1, 2]);
        let once = a.toggle(&b, 4).unwrap().unwrap();
        assert_eq!(once, faces(mesh, &[0, 2]));
        assert_eq!(once.toggle(&b, 4).unwrap().unwrap(), a);
    }

    #[test]
    fn subset_handles_sentinel() {
        let (mesh, _) = mesh_refs();
        let whole = ComponentSet::complete(mesh, ElementType::Face);
        assert!(faces(mesh, &[2]).is_subset_of(&whole, 3));
        assert!(whole.is_subset_of(&faces(mesh, &[0, 1, 2]), 3));
        assert!(!whole.is_subset_of(&faces(mesh, &[0, 1]), 3));
    }

    #[test]
    fn mismatched_sets_do_not_combine() {
        let (a, b) = mesh_refs();
        let err = faces(a, &[0]).union(&faces(b, &[0])).unwrap_err();
        assert!(matches!(
            err,
            MeshselError::Selection(SelectionError::MeshMismatch)
        ));

        let edges = ComponentSet::single(a, ElementType::Edge, 0);
        let err = faces(a, &[0]).toggle(&edges, 4).unwrap_err();
        assert!(matches!(
            err,
            MeshselError::Selection(SelectionError::Incompatible { .. })
        ));
    }

    #[test]
    fn membership() {
        let (mesh, _) = mesh_refs();
        assert!(faces(mesh, &[3]).contains(3));
        assert!(!faces(mesh, &[3]).contains(4));
        assert!(ComponentSet::complete(mesh, ElementType::Vertex).contains(99));
    }
}
