use std::collections::{BTreeSet, HashMap};

use crate::component::ElementType;
use crate::error::TopologyError;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::ConvertOptions;

/// A polygon mesh with derived adjacency tables.
///
/// Edges are numbered in order of first appearance while walking face
/// corners. UVs are per face corner; by default every vertex owns one UV
/// with the same index.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    points: Vec<Point3>,
    faces: Vec<Vec<u32>>,
    uv_points: Vec<Point2>,
    face_uvs: Vec<Vec<u32>>,
    edges: Vec<[u32; 2]>,
    edge_lookup: HashMap<(u32, u32), u32>,
    edge_faces: Vec<Vec<u32>>,
    face_edges: Vec<Vec<u32>>,
    vertex_edges: Vec<Vec<u32>>,
    vertex_faces: Vec<Vec<u32>>,
    uv_vertex: Vec<u32>,
    uv_neighbors: Vec<Vec<u32>>,
}

impl PolyMesh {
    /// Creates a mesh from points and faces (lists of point indices).
    ///
    /// # Errors
    ///
    /// Returns an error if a face has fewer than three corners, repeats a
    /// corner, or references a missing point.
    pub fn new(points: Vec<Point3>, faces: Vec<Vec<u32>>) -> Result<Self, TopologyError> {
        for (f, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(TopologyError::InvalidMesh(format!(
                    "face {f} has fewer than three corners"
                )));
            }
            if face.iter().any(|&v| v as usize >= points.len()) {
                return Err(TopologyError::InvalidMesh(format!(
                    "face {f} references a missing point"
                )));
            }
            let unique: BTreeSet<u32> = face.iter().copied().collect();
            if unique.len() != face.len() {
                return Err(TopologyError::InvalidMesh(format!(
                    "face {f} repeats a corner"
                )));
            }
        }
        let uv_points = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let face_uvs = faces.clone();
        Ok(Self::from_parts(points, faces, uv_points, face_uvs))
    }

    /// Replaces the UV layout with explicit per-corner UV indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner counts do not match the faces or an
    /// index references a missing UV.
    pub fn with_uvs(
        self,
        uv_points: Vec<Point2>,
        face_uvs: Vec<Vec<u32>>,
    ) -> Result<Self, TopologyError> {
        if face_uvs.len() != self.faces.len()
            || face_uvs
                .iter()
                .zip(&self.faces)
                .any(|(uvs, face)| uvs.len() != face.len())
        {
            return Err(TopologyError::InvalidMesh(
                "uv corners do not match face corners".into(),
            ));
        }
        if face_uvs.iter().flatten().any(|&uv| uv as usize >= uv_points.len()) {
            return Err(TopologyError::InvalidMesh(
                "face references a missing uv".into(),
            ));
        }
        Ok(Self::from_parts(self.points, self.faces, uv_points, face_uvs))
    }

    /// A flat grid of `columns × rows` quads in the XY plane.
    ///
    /// Vertex `(x, y)` has index `y * (columns + 1) + x`, face `(x, y)` has
    /// index `y * columns + x`.
    #[must_use]
    pub fn grid(columns: u32, rows: u32, size: f64) -> Self {
        let stride = columns + 1;
        let mut points = Vec::new();
        for y in 0..=rows {
            for x in 0..=columns {
                points.push(Point3::new(f64::from(x) * size, f64::from(y) * size, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..rows {
            for x in 0..columns {
                let v = y * stride + x;
                faces.push(vec![v, v + 1, v + 1 + stride, v + stride]);
            }
        }
        let uv_points = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let face_uvs = faces.clone();
        Self::from_parts(points, faces, uv_points, face_uvs)
    }

    /// A closed cube of six outward-facing quads.
    #[must_use]
    pub fn cube(size: f64) -> Self {
        let s = size;
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
            Point3::new(0.0, 0.0, s),
            Point3::new(s, 0.0, s),
            Point3::new(s, s, s),
            Point3::new(0.0, s, s),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        let uv_points = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let face_uvs = faces.clone();
        Self::from_parts(points, faces, uv_points, face_uvs)
    }

    /// An open cylinder around the Z axis, `segments` quads around and
    /// `rings` quads high.
    ///
    /// Vertex `(s, r)` has index `r * segments + s`, face `(s, r)` has index
    /// `r * segments + s`. Loops around the tube are closed.
    #[must_use]
    pub fn tube(segments: u32, rings: u32, radius: f64, height: f64) -> Self {
        let mut points = Vec::new();
        for r in 0..=rings {
            let z = height * f64::from(r) / f64::from(rings.max(1));
            for s in 0..segments {
                let angle = std::f64::consts::TAU * f64::from(s) / f64::from(segments);
                points.push(Point3::new(radius * angle.cos(), radius * angle.sin(), z));
            }
        }
        let mut faces = Vec::new();
        for r in 0..rings {
            for s in 0..segments {
                let next = (s + 1) % segments;
                faces.push(vec![
                    r * segments + s,
                    r * segments + next,
                    (r + 1) * segments + next,
                    (r + 1) * segments + s,
                ]);
            }
        }
        let uv_points = points.iter().map(|p| Point2::new(p.x, p.z)).collect();
        let face_uvs = faces.clone();
        Self::from_parts(points, faces, uv_points, face_uvs)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_parts(
        points: Vec<Point3>,
        faces: Vec<Vec<u32>>,
        uv_points: Vec<Point2>,
        face_uvs: Vec<Vec<u32>>,
    ) -> Self {
        let mut edges: Vec<[u32; 2]> = Vec::new();
        let mut edge_lookup = HashMap::new();
        let mut edge_faces: Vec<Vec<u32>> = Vec::new();
        let mut face_edges = Vec::with_capacity(faces.len());
        let mut vertex_edges = vec![Vec::new(); points.len()];
        let mut vertex_faces = vec![Vec::new(); points.len()];

        for (f, face) in faces.iter().enumerate() {
            let f = f as u32;
            let mut corners = Vec::with_capacity(face.len());
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                let key = (a.min(b), a.max(b));
                let edge = *edge_lookup.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_faces.push(Vec::new());
                    let id = (edges.len() - 1) as u32;
                    vertex_edges[key.0 as usize].push(id);
                    vertex_edges[key.1 as usize].push(id);
                    id
                });
                edge_faces[edge as usize].push(f);
                corners.push(edge);
                vertex_faces[a as usize].push(f);
            }
            face_edges.push(corners);
        }

        let mut uv_vertex = vec![0; uv_points.len()];
        let mut uv_neighbors: Vec<Vec<u32>> = vec![Vec::new(); uv_points.len()];
        for (face, uvs) in faces.iter().zip(&face_uvs) {
            for (i, &uv) in uvs.iter().enumerate() {
                uv_vertex[uv as usize] = face[i];
                let next = uvs[(i + 1) % uvs.len()];
                if !uv_neighbors[uv as usize].contains(&next) {
                    uv_neighbors[uv as usize].push(next);
                    uv_neighbors[next as usize].push(uv);
                }
            }
        }
        for list in &mut uv_neighbors {
            list.sort_unstable();
        }

        Self {
            points,
            faces,
            uv_points,
            face_uvs,
            edges,
            edge_lookup,
            edge_faces,
            face_edges,
            vertex_edges,
            vertex_faces,
            uv_vertex,
            uv_neighbors,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    #[must_use]
    pub fn uv_points(&self) -> &[Point2] {
        &self.uv_points
    }

    /// Number of elements of the given type.
    #[must_use]
    pub fn count(&self, element: ElementType) -> usize {
        match element {
            ElementType::Vertex => self.points.len(),
            ElementType::Edge => self.edges.len(),
            ElementType::Face => self.faces.len(),
            ElementType::Uv => self.uv_points.len(),
        }
    }

    /// End vertices of an edge, lowest index first.
    #[must_use]
    pub fn edge(&self, edge: u32) -> Option<[u32; 2]> {
        self.edges.get(edge as usize).copied()
    }

    /// The edge joining two vertices, if any.
    #[must_use]
    pub fn find_edge(&self, a: u32, b: u32) -> Option<u32> {
        self.edge_lookup.get(&(a.min(b), a.max(b))).copied()
    }

    /// Faces bounded by an edge.
    #[must_use]
    pub fn edge_faces(&self, edge: u32) -> &[u32] {
        self.edge_faces.get(edge as usize).map_or(&[], Vec::as_slice)
    }

    /// Edges of a face in winding order; edge `i` joins corners `i` and `i + 1`.
    #[must_use]
    pub fn face_edges(&self, face: u32) -> &[u32] {
        self.face_edges.get(face as usize).map_or(&[], Vec::as_slice)
    }

    /// Edges meeting at a vertex.
    #[must_use]
    pub fn vertex_edges(&self, vertex: u32) -> &[u32] {
        self.vertex_edges.get(vertex as usize).map_or(&[], Vec::as_slice)
    }

    /// Vertex owning a UV.
    #[must_use]
    pub fn uv_vertex(&self, uv: u32) -> Option<u32> {
        self.uv_vertex.get(uv as usize).copied()
    }

    #[must_use]
    pub fn is_border(&self, edge: u32) -> bool {
        self.edge_faces(edge).len() == 1
    }

    /// The endpoint of `edge` that is not `vertex`.
    #[must_use]
    pub fn other_vertex(&self, edge: u32, vertex: u32) -> Option<u32> {
        let [a, b] = self.edge(edge)?;
        if a == vertex {
            Some(b)
        } else if b == vertex {
            Some(a)
        } else {
            None
        }
    }

    /// Same-type neighbours of an element, ascending.
    #[must_use]
    pub fn neighbors(&self, element: ElementType, index: u32) -> Vec<u32> {
        let mut out: Vec<u32> = match element {
            ElementType::Vertex => self
                .vertex_edges(index)
                .iter()
                .filter_map(|&e| self.other_vertex(e, index))
                .collect(),
            ElementType::Edge => self.edge(index).map_or_else(Vec::new, |[a, b]| {
                self.vertex_edges(a)
                    .iter()
                    .chain(self.vertex_edges(b))
                    .copied()
                    .filter(|&e| e != index)
                    .collect()
            }),
            ElementType::Face => self
                .face_edges(index)
                .iter()
                .flat_map(|&e| self.edge_faces(e))
                .copied()
                .filter(|&f| f != index)
                .collect(),
            ElementType::Uv => self
                .uv_neighbors
                .get(index as usize)
                .cloned()
                .unwrap_or_default(),
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Unit normal of a face using Newell's method.
    #[must_use]
    pub fn face_normal(&self, face: u32) -> Vector3 {
        let Some(corners) = self.faces.get(face as usize) else {
            return Vector3::zeros();
        };
        let mut normal = Vector3::zeros();
        for (i, &a) in corners.iter().enumerate() {
            let p = self.points[a as usize];
            let q = self.points[corners[(i + 1) % corners.len()] as usize];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros)
    }

    /// Converts indices of `from` elements into `to` elements.
    #[must_use]
    pub fn convert(
        &self,
        from: ElementType,
        source: &BTreeSet<u32>,
        to: ElementType,
        options: ConvertOptions,
    ) -> BTreeSet<u32> {
        use ElementType::{Edge, Face, Uv, Vertex};

        match (from, to) {
            _ if from == to => source.clone(),
            (Uv, _) => {
                let vertices = source.iter().filter_map(|&uv| self.uv_vertex(uv)).collect();
                self.convert(Vertex, &vertices, to, options)
            }
            (Face, Uv) => source
                .iter()
                .filter_map(|&f| self.face_uvs.get(f as usize))
                .flatten()
                .copied()
                .collect(),
            (_, Uv) => {
                let vertices = self.convert(from, source, Vertex, options);
                (0..self.uv_vertex.len())
                    .filter(|&uv| vertices.contains(&self.uv_vertex[uv]))
                    .filter_map(|uv| u32::try_from(uv).ok())
                    .collect()
            }
            (Vertex, Edge) => self.covering(source, self.edges.len(), options.internal, |e| {
                self.edges[e].to_vec()
            }),
            (Vertex, Face) => source
                .iter()
                .flat_map(|&v| self.vertex_faces(v))
                .copied()
                .filter(|&f| {
                    !options.internal || self.faces[f as usize].iter().all(|v| source.contains(v))
                })
                .collect(),
            (Edge, Vertex) => source
                .iter()
                .filter_map(|&e| self.edge(e))
                .flatten()
                .collect(),
            (Edge, Face) => self.covering(source, self.faces.len(), options.internal, |f| {
                self.face_edges[f].clone()
            }),
            (Face, Edge) => {
                if options.is_border() {
                    self.region_perimeter(source)
                } else if options.internal {
                    self.covering(source, self.edges.len(), true, |e| {
                        self.edge_faces[e].clone()
                    })
                } else {
                    source
                        .iter()
                        .flat_map(|&f| self.face_edges(f))
                        .copied()
                        .collect()
                }
            }
            (Face, Vertex) => {
                if options.is_border() {
                    let perimeter = self.region_perimeter(source);
                    self.convert(Edge, &perimeter, Vertex, ConvertOptions::default())
                } else {
                    source
                        .iter()
                        .filter_map(|&f| self.faces.get(f as usize))
                        .flatten()
                        .copied()
                        .collect()
                }
            }
            _ => BTreeSet::new(),
        }
    }

    /// Target elements whose parts touch (or, if `internal`, all lie in) `source`.
    fn covering(
        &self,
        source: &BTreeSet<u32>,
        count: usize,
        internal: bool,
        parts: impl Fn(usize) -> Vec<u32>,
    ) -> BTreeSet<u32> {
        (0..count)
            .filter(|&i| {
                let parts = parts(i);
                if internal {
                    parts.iter().all(|p| source.contains(p))
                } else {
                    parts.iter().any(|p| source.contains(p))
                }
            })
            .filter_map(|i| u32::try_from(i).ok())
            .collect()
    }

    /// Edges of a face region that bound exactly one face of the region.
    fn region_perimeter(&self, faces: &BTreeSet<u32>) -> BTreeSet<u32> {
        faces
            .iter()
            .flat_map(|&f| self.face_edges(f))
            .copied()
            .filter(|&e| {
                self.edge_faces(e)
                    .iter()
                    .filter(|f| faces.contains(f))
                    .count()
                    == 1
            })
            .collect()
    }

    /// Faces around a vertex.
    #[must_use]
    pub fn vertex_faces(&self, vertex: u32) -> &[u32] {
        self.vertex_faces.get(vertex as usize).map_or(&[], Vec::as_slice)
    }
}
