/// 2D point type, used for UV coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `true` if two vectors lie within `tolerance` of each other.
///
/// For unit normals the Euclidean distance grows monotonically with the angle
/// between them, so a larger tolerance always accepts a superset. The
/// predicate is not transitive.
#[must_use]
pub fn is_equivalent(a: &Vector3, b: &Vector3, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// Angle in radians between two vectors, `PI` if either is zero-length.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    if a.norm() < TOLERANCE || b.norm() < TOLERANCE {
        return std::f64::consts::PI;
    }
    a.angle(b)
}

/// Returns `true` if two directions are parallel (either sense).
///
/// Compares the cross product of the normalized directions against
/// `tolerance`. Zero-length directions are never parallel.
#[must_use]
pub fn is_parallel(a: &Vector3, b: &Vector3, tolerance: f64) -> bool {
    let (Some(a), Some(b)) = (a.try_normalize(TOLERANCE), b.try_normalize(TOLERANCE)) else {
        return false;
    };
    a.cross(&b).norm() < tolerance
}

/// Quantizes a vector to integer coordinates for hashing.
///
/// Normals that agree to six decimal places share a key.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn quantize(v: &Vector3) -> (i64, i64, i64) {
    const INV_GRID: f64 = 1e6;
    (
        (v.x * INV_GRID).round() as i64,
        (v.y * INV_GRID).round() as i64,
        (v.z * INV_GRID).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn equivalent_is_distance_based() {
        let z = Vector3::z();
        let tilted = Vector3::new(0.0, 0.1, 1.0).normalize();
        assert!(is_equivalent(&z, &z, 0.0));
        assert!(is_equivalent(&z, &tilted, 0.1));
        assert!(!is_equivalent(&z, &tilted, 0.05));
    }

    #[test]
    fn angle_of_orthogonal_vectors() {
        assert_relative_eq!(angle_between(&Vector3::x(), &Vector3::y()), FRAC_PI_2);
        assert_relative_eq!(
            angle_between(&Vector3::zeros(), &Vector3::y()),
            std::f64::consts::PI
        );
    }

    #[test]
    fn parallel_ignores_sense_and_length() {
        let a = Vector3::new(2.0, 0.0, 0.0);
        let b = Vector3::new(-0.5, 0.0, 0.0);
        assert!(is_parallel(&a, &b, 1e-6));
        assert!(!is_parallel(&a, &Vector3::new(1.0, 1.0, 0.0), 1e-6));
        assert!(!is_parallel(&a, &Vector3::zeros(), 1e-6));
    }

    #[test]
    fn quantize_merges_nearby_normals() {
        let a = Vector3::new(0.0, 0.0, 1.0);
        let b = Vector3::new(1e-9, 0.0, 1.0 - 1e-9);
        assert_eq!(quantize(&a), quantize(&b));
        assert_ne!(quantize(&a), quantize(&Vector3::new(0.0, 1e-3, 1.0)));
    }
}
