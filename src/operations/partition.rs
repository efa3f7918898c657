use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::component::{ComponentSet, ElementType};
use crate::error::{Result, TopologyError};
use crate::math::{quantize, Vector3};
use crate::topology::{MeshRef, Topology};

/// Quantized normal used as an exact bucket key.
pub type NormalKey = (i64, i64, i64);

/// Identifies one group of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    /// Connected run index, in order of lowest seed element.
    pub shell: usize,
    /// Normal bucket within the run, keyed partitions only.
    pub normal: Option<NormalKey>,
}

/// One connected (and optionally normal-keyed) group of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellGroup {
    pub key: GroupKey,
    /// Normal of the group's first face, keyed partitions only.
    pub normal: Option<Vector3>,
    pub components: ComponentSet,
}

/// Splits a component set into connected groups.
///
/// Two elements of the source are connected if they are adjacent on the
/// mesh; adjacency never passes through elements outside the source. With
/// `keyed`, every run is further bucketed by quantized face normal.
pub struct Partition {
    source: ComponentSet,
    keyed: bool,
}

impl Partition {
    /// Creates a new unkeyed partition of `source`.
    #[must_use]
    pub fn new(source: ComponentSet) -> Self {
        Self {
            source,
            keyed: false,
        }
    }

    /// Also buckets groups by face normal.
    #[must_use]
    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = keyed;
        self
    }

    /// Executes the partition.
    ///
    /// Groups are ordered by their lowest element, keyed buckets by first
    /// appearance in breadth-first order.
    ///
    /// # Errors
    ///
    /// Returns an error if a keyed partition is requested on non-face
    /// components.
    pub fn execute<T: Topology + ?Sized>(&self, topology: &T) -> Result<Vec<ShellGroup>> {
        let element = self.source.element();
        if self.keyed && element != ElementType::Face {
            return Err(TopologyError::InvalidElementType(format!(
                "normal-keyed partition needs faces, got {element}"
            ))
            .into());
        }

        let mesh = self.source.mesh();
        let members = self
            .source
            .resolve(topology.element_count(mesh, element));
        let runs = connected_runs(topology, mesh, element, &members);

        let mut groups = Vec::new();
        for (shell, run) in runs.into_iter().enumerate() {
            if !self.keyed {
                if let Some(components) = self.source.with_indices(run) {
                    groups.push(ShellGroup {
                        key: GroupKey {
                            shell,
                            normal: None,
                        },
                        normal: None,
                        components,
                    });
                }
                continue;
            }

            let mut buckets: Vec<(NormalKey, Vector3, Vec<u32>)> = Vec::new();
            let mut lookup: HashMap<NormalKey, usize> = HashMap::new();
            for face in run {
                let normal = topology.face_normal(mesh, face);
                let key = quantize(&normal);
                let slot = *lookup.entry(key).or_insert_with(|| {
                    buckets.push((key, normal, Vec::new()));
                    buckets.len() - 1
                });
                buckets[slot].2.push(face);
            }
            for (key, normal, faces) in buckets {
                if let Some(components) = self.source.with_indices(faces) {
                    groups.push(ShellGroup {
                        key: GroupKey {
                            shell,
                            normal: Some(key),
                        },
                        normal: Some(normal),
                        components,
                    });
                }
            }
        }
        tracing::debug!(groups = groups.len(), keyed = self.keyed, "partitioned components");
        Ok(groups)
    }
}

/// Maximal connected subsets of `set`.
#[must_use]
pub fn shells<T: Topology + ?Sized>(topology: &T, set: &ComponentSet) -> Vec<ComponentSet> {
    let members = set.resolve(topology.element_count(set.mesh(), set.element()));
    connected_runs(topology, set.mesh(), set.element(), &members)
        .into_iter()
        .filter_map(|run| set.with_indices(run))
        .collect()
}

/// The whole-mesh shell holding one element, `None` if the index is out of range.
#[must_use]
pub fn shell_containing<T: Topology + ?Sized>(
    topology: &T,
    mesh: MeshRef,
    element: ElementType,
    index: u32,
) -> Option<ComponentSet> {
    if index as usize >= topology.element_count(mesh, element) {
        return None;
    }
    let mut visited = HashSet::from([index]);
    let mut queue = VecDeque::from([index]);
    while let Some(current) = queue.pop_front() {
        for neighbor in topology.neighbors(mesh, element, current) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    Some(ComponentSet::from_indices(mesh, element, visited))
}

/// Union of the whole-mesh shells touched by `set`.
#[must_use]
pub fn shells_touching<T: Topology + ?Sized>(topology: &T, set: &ComponentSet) -> ComponentSet {
    if set.is_complete_sentinel() {
        return set.clone();
    }
    let mut covered: BTreeSet<u32> = BTreeSet::new();
    for &index in set.indices() {
        if covered.contains(&index) {
            continue;
        }
        if let Some(shell) = shell_containing(topology, set.mesh(), set.element(), index) {
            covered.extend(shell.indices());
        }
    }
    ComponentSet::from_indices(set.mesh(), set.element(), covered)
}

/// Connected runs of `members` in breadth-first order from each lowest
/// unvisited member.
pub(crate) fn connected_runs<T: Topology + ?Sized>(
    topology: &T,
    mesh: MeshRef,
    element: ElementType,
    members: &BTreeSet<u32>,
) -> Vec<Vec<u32>> {
    let mut visited: HashSet<u32> = HashSet::new();
    let mut runs = Vec::new();
    for &start in members {
        if !visited.insert(start) {
            continue;
        }
        let mut run = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in topology.neighbors(mesh, element, current) {
                if members.contains(&neighbor) && visited.insert(neighbor) {
                    run.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        runs.push(run);
    }
    runs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MeshselError;
    use crate::topology::fixtures::{flat_block, two_islands, FLAT_FACES};
    use crate::topology::{MeshStore, PolyMesh};

    fn faces(mesh: MeshRef, indices: &[u32]) -> ComponentSet {
        ComponentSet::from_indices(mesh, ElementType::Face, indices.iter().copied())
    }

    #[test]
    fn groups_form_a_true_partition() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(PolyMesh::grid(4, 1, 1.0));
        let source = faces(mesh, &[0, 1, 3]);

        let groups = Partition::new(source.clone()).execute(&store).unwrap();
        assert_eq!(groups.len(), 2);

        let mut union = BTreeSet::new();
        for group in &groups {
            for index in group.components.indices() {
                assert!(union.insert(*index), "groups overlap at {index}");
            }
        }
        assert_eq!(&union, source.indices());
        assert_eq!(groups[0].components, faces(mesh, &[0, 1]));
        assert_eq!(groups[1].components, faces(mesh, &[3]));
    }

    #[test]
    fn complete_source_splits_islands() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(two_islands());
        let whole = ComponentSet::complete(mesh, ElementType::Face);

        let shells = store.connected_shells(&whole);
        assert_eq!(shells, vec![faces(mesh, &[0]), faces(mesh, &[1])]);
    }

    #[test]
    fn keyed_partition_buckets_normals() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(flat_block());
        let whole = ComponentSet::complete(mesh, ElementType::Face);

        let groups = Partition::new(whole).keyed(true).execute(&store).unwrap();
        assert!(groups.iter().all(|g| g.key.shell == 0));
        let flat = groups
            .iter()
            .find(|g| g.components.contains(FLAT_FACES[0]))
            .unwrap();
        assert_eq!(flat.components, faces(mesh, &FLAT_FACES));
        let total: usize = groups.iter().map(|g| g.components.len()).sum();
        assert_eq!(total, 16);
    }

    #[test]
    fn keyed_partition_needs_faces() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(PolyMesh::grid(1, 1, 1.0));
        let edges = ComponentSet::complete(mesh, ElementType::Edge);
        let err = Partition::new(edges).keyed(true).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            MeshselError::Topology(TopologyError::InvalidElementType(_))
        ));
    }

    #[test]
    fn touching_shells_cover_whole_islands() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(two_islands());
        let vertex = ComponentSet::single(mesh, ElementType::Vertex, 5);
        let shell = shells_touching(&store, &vertex);
        assert_eq!(shell.indices(), &BTreeSet::from([4, 5, 6, 7]));
        assert!(shell_containing(&store, mesh, ElementType::Vertex, 42).is_none());
    }
}
