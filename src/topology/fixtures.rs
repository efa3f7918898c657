//! Small meshes shared by operation tests.
#![allow(clippy::unwrap_used)]

use crate::math::Point3;

use super::PolyMesh;

/// A 4×4 grid whose inner 2×2 block is flat at z = 0 while the outer ring
/// of vertices is raised to z = 1, so every surrounding face slopes by 45°.
///
/// The flat faces are 5, 6, 9 and 10.
pub(crate) fn flat_block() -> PolyMesh {
    let mut points = Vec::new();
    for y in 0..=4u32 {
        for x in 0..=4u32 {
            let outer = x == 0 || y == 0 || x == 4 || y == 4;
            let z = if outer { 1.0 } else { 0.0 };
            points.push(Point3::new(f64::from(x), f64::from(y), z));
        }
    }
    let mut faces = Vec::new();
    for y in 0..4u32 {
        for x in 0..4u32 {
            let v = y * 5 + x;
            faces.push(vec![v, v + 1, v + 6, v + 5]);
        }
    }
    PolyMesh::new(points, faces).unwrap()
}

pub(crate) const FLAT_FACES: [u32; 4] = [5, 6, 9, 10];

/// Two quads sharing no vertex: faces 0 and 1 form separate shells.
pub(crate) fn two_islands() -> PolyMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 1.0, 0.0),
        Point3::new(3.0, 1.0, 0.0),
    ];
    let faces = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
    PolyMesh::new(points, faces).unwrap()
}

/// A quad with a triangle on its right and a pentagon on its left.
///
/// Face 0 is the quad, face 1 the triangle, face 2 the pentagon.
pub(crate) fn mixed_polygons() -> PolyMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(2.0, 0.5, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(-1.5, 0.5, 0.0),
        Point3::new(-1.0, 1.0, 0.0),
    ];
    let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2], vec![5, 0, 3, 7, 6]];
    PolyMesh::new(points, faces).unwrap()
}
