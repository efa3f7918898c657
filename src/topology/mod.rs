pub mod loops;
pub mod mesh_store;
pub mod poly_mesh;

#[cfg(test)]
pub(crate) mod fixtures;

pub use mesh_store::MeshStore;
pub use poly_mesh::PolyMesh;

use crate::component::{ComponentSet, ElementType};
use crate::math::{Point3, Vector3};

slotmap::new_key_type! {
    /// Stable identifier of one mesh shape.
    ///
    /// Component sets are only comparable when their mesh references match.
    pub struct MeshRef;
}

/// Options forwarded to component conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Restrict the result to the border of the converted region.
    ///
    /// `None` means the caller did not ask either way.
    pub border: Option<bool>,
    /// Only keep target elements entirely covered by the source.
    pub internal: bool,
}

impl ConvertOptions {
    /// Options requesting internal conversion.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            border: None,
            internal: true,
        }
    }

    /// Options requesting border conversion.
    #[must_use]
    pub fn border() -> Self {
        Self {
            border: Some(true),
            internal: false,
        }
    }

    /// Returns `true` if border conversion was requested.
    #[must_use]
    pub fn is_border(self) -> bool {
        self.border == Some(true)
    }
}

/// How a topological path is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// Along loops, or the shortest same-type path between two seeds.
    Loop,
    /// Across opposite quad sides (edges only).
    Ring,
    /// Along UV-space edges.
    Uv,
}

/// An ordered run of elements returned by a path query.
///
/// In [`PathMode::Uv`] the path is expressed as mesh edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub element: ElementType,
    pub indices: Vec<u32>,
}

/// A full loop of elements in the mesh's natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLoop {
    pub indices: Vec<u32>,
    /// `true` if the last element connects back to the first.
    pub closed: bool,
}

/// Mesh topology and geometry queries consumed by the selection operations.
///
/// Queries are synchronous and do not fail; a missing path is `None`.
/// Unknown meshes behave as empty ones.
pub trait Topology {
    /// Number of elements of a type on a mesh.
    fn element_count(&self, mesh: MeshRef, element: ElementType) -> usize;

    /// Same-type elements adjacent to `index`, in ascending order.
    fn neighbors(&self, mesh: MeshRef, element: ElementType, index: u32) -> Vec<u32>;

    /// Converts a set to another element type using mesh adjacency.
    fn convert(&self, set: &ComponentSet, target: ElementType, options: ConvertOptions)
        -> Vec<u32>;

    /// Unit normal of a face, zero for degenerate faces.
    fn face_normal(&self, mesh: MeshRef, face: u32) -> Vector3;

    /// Returns `true` if the edge bounds only one face.
    fn is_border(&self, mesh: MeshRef, edge: u32) -> bool;

    /// End points of an edge.
    fn edge_points(&self, mesh: MeshRef, edge: u32) -> (Point3, Point3);

    /// Ordered path through or between `seeds`.
    ///
    /// With one seed, the full loop (or ring) through it; with two, the
    /// elements connecting them, both ends included.
    fn shortest_path(
        &self,
        mesh: MeshRef,
        element: ElementType,
        seeds: &[u32],
        mode: PathMode,
    ) -> Option<Path>;

    /// The full loop containing both `start` and `end`.
    fn element_loop(
        &self,
        mesh: MeshRef,
        element: ElementType,
        start: u32,
        end: u32,
        mode: PathMode,
    ) -> Option<ElementLoop>;

    /// Number of corners of a face.
    fn face_vertex_count(&self, mesh: MeshRef, face: u32) -> usize;

    /// Splits a set into maximal connected subsets.
    fn connected_shells(&self, set: &ComponentSet) -> Vec<ComponentSet> {
        crate::operations::shells(self, set)
    }
}
