use slotmap::SlotMap;

use crate::component::{ComponentSet, ElementType};
use crate::error::TopologyError;
use crate::math::{Point3, Vector3};

use super::{ConvertOptions, ElementLoop, MeshRef, Path, PathMode, PolyMesh, Topology};

/// Arena owning the meshes a selection can refer to.
///
/// Meshes are addressed by [`MeshRef`] generational keys, so a key of a
/// removed mesh never aliases a newer one.
#[derive(Debug, Default)]
pub struct MeshStore {
    meshes: SlotMap<MeshRef, PolyMesh>,
}

impl MeshStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a mesh and returns its reference.
    pub fn add_mesh(&mut self, mesh: PolyMesh) -> MeshRef {
        self.meshes.insert(mesh)
    }

    /// Returns the mesh behind a reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is not in the store.
    pub fn mesh(&self, id: MeshRef) -> Result<&PolyMesh, TopologyError> {
        self.meshes.get(id).ok_or(TopologyError::MeshNotFound)
    }

    /// Removes a mesh, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is not in the store.
    pub fn remove_mesh(&mut self, id: MeshRef) -> Result<PolyMesh, TopologyError> {
        self.meshes.remove(id).ok_or(TopologyError::MeshNotFound)
    }

    /// References of every stored mesh.
    pub fn mesh_refs(&self) -> impl Iterator<Item = MeshRef> + '_ {
        self.meshes.keys()
    }
}

impl Topology for MeshStore {
    fn element_count(&self, mesh: MeshRef, element: ElementType) -> usize {
        self.meshes.get(mesh).map_or(0, |m| m.count(element))
    }

    fn neighbors(&self, mesh: MeshRef, element: ElementType, index: u32) -> Vec<u32> {
        self.meshes
            .get(mesh)
            .map_or_else(Vec::new, |m| m.neighbors(element, index))
    }

    fn convert(
        &self,
        set: &ComponentSet,
        target: ElementType,
        options: ConvertOptions,
    ) -> Vec<u32> {
        let Some(mesh) = self.meshes.get(set.mesh()) else {
            return Vec::new();
        };
        let source = set.resolve(mesh.count(set.element()));
        mesh.convert(set.element(), &source, target, options)
            .into_iter()
            .collect()
    }

    fn face_normal(&self, mesh: MeshRef, face: u32) -> Vector3 {
        self.meshes
            .get(mesh)
            .map_or_else(Vector3::zeros, |m| m.face_normal(face))
    }

    fn is_border(&self, mesh: MeshRef, edge: u32) -> bool {
        self.meshes.get(mesh).is_some_and(|m| m.is_border(edge))
    }

    fn edge_points(&self, mesh: MeshRef, edge: u32) -> (Point3, Point3) {
        self.meshes
            .get(mesh)
            .and_then(|m| {
                let [a, b] = m.edge(edge)?;
                Some((m.points()[a as usize], m.points()[b as usize]))
            })
            .unwrap_or((Point3::origin(), Point3::origin()))
    }

    fn shortest_path(
        &self,
        mesh: MeshRef,
        element: ElementType,
        seeds: &[u32],
        mode: PathMode,
    ) -> Option<Path> {
        let m = self.meshes.get(mesh)?;
        let indices = match (mode, element, seeds) {
            (PathMode::Loop, ElementType::Edge, &[seed]) => m.edge_loop(seed)?.indices,
            (PathMode::Loop, ElementType::Edge, &[a, b]) => {
                m.loop_path(a, b).or_else(|| m.bfs_path(element, a, b))?
            }
            (PathMode::Loop, _, &[a, b]) => m.bfs_path(element, a, b)?,
            (PathMode::Ring, ElementType::Edge, &[seed]) => m.edge_ring(seed)?.indices,
            (PathMode::Ring, ElementType::Edge, &[a, b]) => m.ring_path(a, b)?,
            (PathMode::Uv, ElementType::Uv, &[a, b]) => {
                return Some(Path {
                    element: ElementType::Edge,
                    indices: m.uv_edge_path(a, b)?,
                });
            }
            _ => return None,
        };
        Some(Path { element, indices })
    }

    fn element_loop(
        &self,
        mesh: MeshRef,
        element: ElementType,
        start: u32,
        end: u32,
        mode: PathMode,
    ) -> Option<ElementLoop> {
        let m = self.meshes.get(mesh)?;
        let found = match (element, mode) {
            (ElementType::Edge, PathMode::Ring) => m.edge_ring(start)?,
            (ElementType::Edge, _) => m.edge_loop(start)?,
            (ElementType::Vertex, _) => {
                let path = m.bfs_path(element, start, end)?;
                m.vertex_loop(path[0], *path.get(1)?)?
            }
            (ElementType::Face, _) => {
                let path = m.bfs_path(element, start, end)?;
                m.face_loop(path[0], *path.get(1)?)?
            }
            (ElementType::Uv, _) => ElementLoop {
                indices: m.bfs_path(element, start, end)?,
                closed: false,
            },
        };
        found.indices.contains(&end).then_some(found)
    }

    fn face_vertex_count(&self, mesh: MeshRef, face: u32) -> usize {
        self.meshes
            .get(mesh)
            .and_then(|m| m.faces().get(face as usize))
            .map_or(0, Vec::len)
    }
}
