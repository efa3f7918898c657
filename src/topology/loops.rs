//! Loop, ring and path walking on quad-dominant meshes.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::component::ElementType;

use super::{ElementLoop, PolyMesh};

/// One direction of a ring walk.
struct RingWalk {
    edges: Vec<u32>,
    faces: Vec<u32>,
    closed: bool,
}

impl PolyMesh {
    /// The edge continuing a loop through `vertex`.
    ///
    /// Only a vertex with exactly one edge sharing no face with `edge`
    /// continues the loop, which follows interior valence-4 vertices and
    /// runs along open borders.
    fn loop_step(&self, edge: u32, vertex: u32) -> Option<u32> {
        let faces = self.edge_faces(edge);
        let mut candidates = self.vertex_edges(vertex).iter().copied().filter(|&e| {
            e != edge && !self.edge_faces(e).iter().any(|f| faces.contains(f))
        });
        let next = candidates.next()?;
        candidates.next().is_none().then_some(next)
    }

    fn walk_loop(&self, start: u32, vertex: u32) -> (Vec<u32>, bool) {
        let mut out = Vec::new();
        let mut seen = HashSet::from([start]);
        let (mut edge, mut vertex) = (start, vertex);
        while let Some(next) = self.loop_step(edge, vertex) {
            if next == start {
                return (out, true);
            }
            if !seen.insert(next) {
                break;
            }
            out.push(next);
            let Some(far) = self.other_vertex(next, vertex) else {
                break;
            };
            edge = next;
            vertex = far;
        }
        (out, false)
    }

    /// The edge loop through `edge`.
    ///
    /// Closed loops start at `edge`; open loops run end to end.
    #[must_use]
    pub fn edge_loop(&self, edge: u32) -> Option<ElementLoop> {
        let [a, b] = self.edge(edge)?;
        let (forward, closed) = self.walk_loop(edge, b);
        if closed {
            let mut indices = vec![edge];
            indices.extend(forward);
            return Some(ElementLoop { indices, closed });
        }
        let (backward, _) = self.walk_loop(edge, a);
        let mut indices: Vec<u32> = backward.into_iter().rev().collect();
        indices.push(edge);
        indices.extend(forward);
        Some(ElementLoop {
            indices,
            closed: false,
        })
    }

    /// The edge opposite `edge` across a quad face.
    fn opposite_edge(&self, edge: u32, face: u32) -> Option<u32> {
        let edges = self.face_edges(face);
        if edges.len() != 4 {
            return None;
        }
        let position = edges.iter().position(|&e| e == edge)?;
        Some(edges[(position + 2) % 4])
    }

    fn walk_ring(&self, start: u32, first_face: u32) -> RingWalk {
        let mut walk = RingWalk {
            edges: Vec::new(),
            faces: Vec::new(),
            closed: false,
        };
        let mut seen = HashSet::from([start]);
        let (mut edge, mut face) = (start, Some(first_face));
        while let Some(current) = face {
            walk.faces.push(current);
            let Some(opposite) = self.opposite_edge(edge, current) else {
                break;
            };
            if opposite == start {
                walk.closed = true;
                break;
            }
            if !seen.insert(opposite) {
                break;
            }
            walk.edges.push(opposite);
            face = self
                .edge_faces(opposite)
                .iter()
                .copied()
                .find(|&f| f != current);
            edge = opposite;
        }
        walk
    }

    /// The edge ring through `edge`.
    #[must_use]
    pub fn edge_ring(&self, edge: u32) -> Option<ElementLoop> {
        let faces = self.edge_faces(edge);
        let &first = faces.first()?;
        let forward = self.walk_ring(edge, first);
        let mut indices = Vec::new();
        if !forward.closed {
            if let Some(&second) = faces.get(1) {
                indices.extend(self.walk_ring(edge, second).edges.into_iter().rev());
            }
        }
        indices.push(edge);
        indices.extend(forward.edges);
        Some(ElementLoop {
            indices,
            closed: forward.closed,
        })
    }

    /// The face loop crossing the edge shared by adjacent faces `a` and `b`,
    /// ordered so that `a` directly precedes `b`.
    #[must_use]
    pub fn face_loop(&self, a: u32, b: u32) -> Option<ElementLoop> {
        let shared = self
            .face_edges(a)
            .iter()
            .copied()
            .find(|e| self.face_edges(b).contains(e))?;
        let forward = self.walk_ring(shared, b);
        if forward.closed {
            let mut indices = vec![a];
            indices.extend(forward.faces.into_iter().filter(|&f| f != a));
            return Some(ElementLoop {
                indices,
                closed: true,
            });
        }
        let backward = self.walk_ring(shared, a);
        let mut indices: Vec<u32> = backward.faces.into_iter().rev().collect();
        indices.extend(forward.faces);
        Some(ElementLoop {
            indices,
            closed: false,
        })
    }

    /// The vertex loop along the edge joining vertices `a` and `b`.
    #[must_use]
    pub fn vertex_loop(&self, a: u32, b: u32) -> Option<ElementLoop> {
        let edge = self.find_edge(a, b)?;
        let edges = self.edge_loop(edge)?;
        let chain = &edges.indices;
        let [p, q] = self.edge(chain[0])?;
        let start = match chain.get(1).and_then(|&next| self.edge(next)) {
            Some(next) if next.contains(&p) => q,
            _ => p,
        };
        let mut indices = vec![start];
        let mut current = start;
        for &e in chain {
            current = self.other_vertex(e, current)?;
            indices.push(current);
        }
        if edges.closed {
            indices.pop();
        }
        Some(ElementLoop {
            indices,
            closed: edges.closed,
        })
    }

    /// Shortest same-type path from `a` to `b`, both included.
    ///
    /// Breadth-first over [`PolyMesh::neighbors`], so ties resolve towards
    /// lower indices.
    #[must_use]
    pub fn bfs_path(&self, element: ElementType, a: u32, b: u32) -> Option<Vec<u32>> {
        if a as usize >= self.count(element) || b as usize >= self.count(element) {
            return None;
        }
        let mut parent: HashMap<u32, u32> = HashMap::new();
        let mut queue = VecDeque::from([a]);
        parent.insert(a, a);
        while let Some(current) = queue.pop_front() {
            if current == b {
                let mut path = vec![b];
                let mut node = b;
                while node != a {
                    node = parent[&node];
                    path.push(node);
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbors(element, current) {
                if let Entry::Vacant(slot) = parent.entry(next) {
                    slot.insert(current);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Shortest run of ring edges between `a` and `b`, both included.
    #[must_use]
    pub fn ring_path(&self, a: u32, b: u32) -> Option<Vec<u32>> {
        let ring = self.edge_ring(a)?;
        segment_between(&ring, a, b)
    }

    /// Shortest run of loop edges between `a` and `b`, both included.
    #[must_use]
    pub fn loop_path(&self, a: u32, b: u32) -> Option<Vec<u32>> {
        let edge_loop = self.edge_loop(a)?;
        segment_between(&edge_loop, a, b)
    }

    /// Mesh edges along the shortest UV path between two UVs.
    #[must_use]
    pub fn uv_edge_path(&self, a: u32, b: u32) -> Option<Vec<u32>> {
        let uvs = self.bfs_path(ElementType::Uv, a, b)?;
        let edges: Vec<u32> = uvs
            .windows(2)
            .filter_map(|pair| {
                let from = self.uv_vertex(pair[0])?;
                let to = self.uv_vertex(pair[1])?;
                self.find_edge(from, to)
            })
            .collect();
        (!edges.is_empty()).then_some(edges)
    }
}

/// The shorter run of `elements` from `a` to `b`, wrapping for closed loops.
fn segment_between(elements: &ElementLoop, a: u32, b: u32) -> Option<Vec<u32>> {
    let list = &elements.indices;
    let i = list.iter().position(|&e| e == a)?;
    let j = list.iter().position(|&e| e == b)?;
    let direct: Vec<u32> = if i <= j {
        list[i..=j].to_vec()
    } else {
        list[j..=i].iter().rev().copied().collect()
    };
    if !elements.closed {
        return Some(direct);
    }
    let n = list.len();
    let around_len = n - direct.len() + 2;
    if around_len >= direct.len() {
        return Some(direct);
    }
    let step = if i <= j { n - 1 } else { 1 };
    let mut around = vec![a];
    let mut k = i;
    while k != j {
        k = (k + step) % n;
        around.push(list[k]);
    }
    Some(around)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tube_edge_loop_is_closed() {
        // 6 around, 2 high: edges of the middle ring form a closed loop
        let mesh = PolyMesh::tube(6, 2, 1.0, 2.0);
        let edge = mesh.find_edge(6, 7).unwrap();
        let edge_loop = mesh.edge_loop(edge).unwrap();
        assert!(edge_loop.closed);
        assert_eq!(edge_loop.indices.len(), 6);
        assert_eq!(edge_loop.indices[0], edge);
    }

    #[test]
    fn grid_loop_runs_end_to_end() {
        let mesh = PolyMesh::grid(3, 3, 1.0);
        // vertical interior edge between vertices 5 and 9
        let edge = mesh.find_edge(5, 9).unwrap();
        let edge_loop = mesh.edge_loop(edge).unwrap();
        assert!(!edge_loop.closed);
        let expected: Vec<u32> = [(1, 5), (5, 9), (9, 13)]
            .iter()
            .map(|&(a, b)| mesh.find_edge(a, b).unwrap())
            .collect();
        assert_eq!(edge_loop.indices, expected);
    }

    #[test]
    fn border_loop_stops_at_corners() {
        let mesh = PolyMesh::grid(3, 2, 1.0);
        let edge = mesh.find_edge(1, 2).unwrap();
        let edge_loop = mesh.edge_loop(edge).unwrap();
        assert_eq!(edge_loop.indices.len(), 3);
        assert!(edge_loop.indices.iter().all(|&e| mesh.is_border(e)));
    }

    #[test]
    fn tube_ring_runs_up_the_side() {
        let mesh = PolyMesh::tube(4, 3, 1.0, 3.0);
        let edge = mesh.find_edge(4, 5).unwrap();
        let ring = mesh.edge_ring(edge).unwrap();
        assert!(!ring.closed);
        assert_eq!(ring.indices.len(), 4);
    }

    #[test]
    fn tube_face_loop_goes_around() {
        let mesh = PolyMesh::tube(5, 2, 1.0, 2.0);
        let face_loop = mesh.face_loop(2, 3).unwrap();
        assert!(face_loop.closed);
        assert_eq!(face_loop.indices, vec![2, 3, 4, 0, 1]);
    }

    #[test]
    fn vertex_loop_around_tube() {
        let mesh = PolyMesh::tube(4, 1, 1.0, 1.0);
        let vertex_loop = mesh.vertex_loop(1, 2).unwrap();
        assert!(vertex_loop.closed);
        assert_eq!(vertex_loop.indices.len(), 4);
        assert!(vertex_loop.indices.contains(&1) && vertex_loop.indices.contains(&2));
    }

    #[test]
    fn bfs_path_between_faces() {
        let mesh = PolyMesh::grid(3, 1, 1.0);
        assert_eq!(mesh.bfs_path(ElementType::Face, 0, 2), Some(vec![0, 1, 2]));
        assert_eq!(mesh.bfs_path(ElementType::Face, 0, 9), None);
    }

    #[test]
    fn closed_segment_takes_short_way() {
        let ring = ElementLoop {
            indices: vec![10, 11, 12, 13, 14, 15],
            closed: true,
        };
        assert_eq!(segment_between(&ring, 10, 15), Some(vec![10, 15]));
        assert_eq!(segment_between(&ring, 11, 13), Some(vec![11, 12, 13]));
        assert_eq!(segment_between(&ring, 14, 10), Some(vec![14, 15, 10]));
    }

    #[test]
    fn uv_path_is_expressed_in_edges() {
        let mesh = PolyMesh::grid(2, 1, 1.0);
        let edges = mesh.uv_edge_path(0, 2).unwrap();
        assert_eq!(
            edges,
            vec![mesh.find_edge(0, 1).unwrap(), mesh.find_edge(1, 2).unwrap()]
        );
    }
}
