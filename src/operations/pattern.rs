use crate::component::{ComponentSet, ElementType, SelectionCollection, SelectionUpdate};
use crate::error::{Result, SelectionError, TopologyError};
use crate::topology::{MeshRef, PathMode, Topology};

use super::inbetween::last_pair;

/// A cursor stepping through a repeating pattern along a loop.
///
/// The pattern is derived from two picks bounding one step: the loop
/// through both is rotated to start at the first pick, and for non-edge
/// types only every n-th element is kept, n being the distance between the
/// picks. The cursor starts at the second pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWalker {
    mesh: MeshRef,
    element: ElementType,
    pattern: Vec<u32>,
    cursor: usize,
}

impl PatternWalker {
    /// Derives the pattern from the last two picks of `selection`.
    ///
    /// Edges walk their ring, falling back to their loop.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two picks share a mesh and element
    /// type, the picks coincide, or no loop holds both.
    pub fn new<T: Topology + ?Sized>(topology: &T, selection: &SelectionCollection) -> Result<Self> {
        let (start, end) = last_pair(selection)?;
        let found = match start.element {
            ElementType::Edge => topology
                .element_loop(start.mesh, start.element, start.index, end.index, PathMode::Ring)
                .or_else(|| {
                    topology.element_loop(start.mesh, start.element, start.index, end.index, PathMode::Loop)
                }),
            _ => topology.element_loop(start.mesh, start.element, start.index, end.index, PathMode::Loop),
        }
        .ok_or(TopologyError::NoPathFound)?;

        let mut walk = found.indices;
        let position = |walk: &[u32], index| walk.iter().position(|&e| e == index);
        let (Some(s), Some(e)) = (position(&walk, start.index), position(&walk, end.index)) else {
            return Err(TopologyError::NoPathFound.into());
        };
        if !found.closed && s > e && walk.first() != Some(&end.index) {
            walk.reverse();
        }
        let s = position(&walk, start.index).unwrap_or(0);
        walk.rotate_left(s);

        let distance = position(&walk, end.index).unwrap_or(0);
        if distance == 0 {
            return Err(SelectionError::InvalidSelectionCount {
                expected: 2,
                found: 1,
            }
            .into());
        }
        let (pattern, cursor) = if start.element == ElementType::Edge {
            (walk, distance)
        } else {
            (walk.into_iter().step_by(distance).collect(), 1)
        };
        tracing::debug!(len = pattern.len(), cursor, "pattern derived");
        Ok(Self {
            mesh: start.mesh,
            element: start.element,
            pattern,
            cursor,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &[u32] {
        &self.pattern
    }

    /// The element under the cursor.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.pattern[self.cursor]
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Every element of the pattern as one selection.
    #[must_use]
    pub fn pattern_selection(&self) -> SelectionCollection {
        SelectionCollection::from_sets([ComponentSet::from_indices(
            self.mesh,
            self.element,
            self.pattern.iter().copied(),
        )])
    }

    /// Advances the cursor, wrapping at the end, and adds the reached element.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> SelectionUpdate {
        self.cursor = (self.cursor + 1) % self.pattern.len();
        SelectionUpdate::Add(self.single(self.pattern[self.cursor]))
    }

    /// Moves the cursor back, wrapping at the start, and removes the element
    /// just ahead of it.
    pub fn prev(&mut self) -> SelectionUpdate {
        let len = self.pattern.len();
        self.cursor = (self.cursor + len - 1) % len;
        SelectionUpdate::Remove(self.single(self.pattern[(self.cursor + 1) % len]))
    }

    fn single(&self, index: u32) -> SelectionCollection {
        SelectionCollection::from_sets([ComponentSet::single(self.mesh, self.element, index)])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Pick;
    use crate::math::{Point3, Vector3};
    use crate::topology::{ConvertOptions, ElementLoop, MeshStore, Path, PolyMesh};
    use slotmap::SlotMap;

    /// Answers every loop query with one fixed loop.
    struct FixedLoop {
        indices: Vec<u32>,
        closed: bool,
    }

    impl Topology for FixedLoop {
        fn element_count(&self, _: MeshRef, _: ElementType) -> usize {
            self.indices.len()
        }

        fn neighbors(&self, _: MeshRef, _: ElementType, _: u32) -> Vec<u32> {
            Vec::new()
        }

        fn convert(&self, _: &ComponentSet, _: ElementType, _: ConvertOptions) -> Vec<u32> {
            Vec::new()
        }

        fn face_normal(&self, _: MeshRef, _: u32) -> Vector3 {
            Vector3::z()
        }

        fn is_border(&self, _: MeshRef, _: u32) -> bool {
            false
        }

        fn edge_points(&self, _: MeshRef, _: u32) -> (Point3, Point3) {
            (Point3::origin(), Point3::origin())
        }

        fn shortest_path(&self, _: MeshRef, _: ElementType, _: &[u32], _: PathMode) -> Option<Path> {
            None
        }

        fn element_loop(
            &self,
            _: MeshRef,
            _: ElementType,
            _: u32,
            _: u32,
            _: PathMode,
        ) -> Option<ElementLoop> {
            Some(ElementLoop {
                indices: self.indices.clone(),
                closed: self.closed,
            })
        }

        fn face_vertex_count(&self, _: MeshRef, _: u32) -> usize {
            4
        }
    }

    fn picks(element: ElementType, start: u32, end: u32) -> SelectionCollection {
        let mut keys: SlotMap<MeshRef, ()> = SlotMap::with_key();
        let mesh = keys.insert(());
        SelectionCollection::from_ordered_picks([
            Pick::new(mesh, element, start),
            Pick::new(mesh, element, end),
        ])
    }

    fn added(update: &SelectionUpdate) -> Vec<u32> {
        update
            .components()
            .and_then(|c| c.iter().next())
            .map(|s| s.indices().iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn closed_loop_walks_forward_from_start() {
        let topology = FixedLoop {
            indices: vec![0, 1, 2, 3, 4, 5],
            closed: true,
        };
        let mut walker = PatternWalker::new(&topology, &picks(ElementType::Edge, 4, 1)).unwrap();
        assert_eq!(walker.pattern(), &[4, 5, 0, 1, 2, 3]);
        assert_eq!(walker.current(), 1);

        let next = walker.next();
        assert!(matches!(next, SelectionUpdate::Add(_)));
        assert_eq!(added(&next), vec![2]);

        let prev = walker.prev();
        assert!(matches!(prev, SelectionUpdate::Remove(_)));
        assert_eq!(added(&prev), vec![2]);
        assert_eq!(walker.current(), 1);
    }

    #[test]
    fn non_edges_keep_every_nth_element() {
        let topology = FixedLoop {
            indices: (0..12).collect(),
            closed: true,
        };
        let walker = PatternWalker::new(&topology, &picks(ElementType::Face, 2, 5)).unwrap();
        assert_eq!(walker.pattern(), &[2, 5, 8, 11]);
        assert_eq!(walker.current(), 5);
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let topology = FixedLoop {
            indices: (0..6).collect(),
            closed: true,
        };
        let mut walker = PatternWalker::new(&topology, &picks(ElementType::Vertex, 0, 2)).unwrap();
        assert_eq!(walker.pattern(), &[0, 2, 4]);
        assert_eq!(added(&walker.next()), vec![4]);
        assert_eq!(added(&walker.next()), vec![0]);
        assert_eq!(walker.cursor(), 0);
        assert_eq!(added(&walker.prev()), vec![0]);
        assert_eq!(walker.current(), 4);
    }

    #[test]
    fn open_loop_is_reversed_towards_end() {
        let topology = FixedLoop {
            indices: (0..7).collect(),
            closed: false,
        };
        let walker = PatternWalker::new(&topology, &picks(ElementType::Face, 5, 3)).unwrap();
        // reversed to [6, 5, .., 0], then rotated so 5 leads
        assert_eq!(walker.pattern(), &[5, 3, 1, 6]);
        assert_eq!(walker.current(), 3);
    }

    #[test]
    fn same_pick_twice_is_rejected() {
        let topology = FixedLoop {
            indices: (0..6).collect(),
            closed: true,
        };
        assert!(PatternWalker::new(&topology, &picks(ElementType::Face, 3, 3)).is_err());
    }

    #[test]
    fn tube_face_pattern() {
        let mut store = MeshStore::new();
        let mesh = store.add_mesh(PolyMesh::tube(8, 1, 1.0, 1.0));
        let selection = SelectionCollection::from_ordered_picks([
            Pick::new(mesh, ElementType::Face, 0),
            Pick::new(mesh, ElementType::Face, 1),
        ]);
        let walker = PatternWalker::new(&store, &selection).unwrap();
        assert_eq!(walker.pattern().len(), 8);
        assert_eq!(walker.pattern()[0], 0);
        assert_eq!(walker.pattern_selection().get(mesh, ElementType::Face).unwrap().len(), 8);
    }
}
