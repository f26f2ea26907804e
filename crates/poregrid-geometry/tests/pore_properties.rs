//! Property-based tests for the membrane classifier.
//!
//! Run with: cargo test -p poregrid-geometry --test pore_properties

use nalgebra::{Matrix3, Point3};
use poregrid_geometry::{is_in_membrane_wall, run_scan, CellGrid, PoreShape};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_shape() -> impl Strategy<Value = PoreShape> {
    (0.0..50.0f64, 0.0..20.0f64, -60.0..60.0f64).prop_map(|(length, diameter, angle)| {
        PoreShape::from_dimensions(length, diameter, angle).unwrap()
    })
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn count_outside(grid: &CellGrid, shape: &PoreShape) -> usize {
    run_scan(grid, shape, &mut Vec::<Point3<f64>>::new())
        .unwrap()
        .outside_points
}

// =============================================================================
// Classifier properties
// =============================================================================

proptest! {
    #[test]
    fn beyond_slab_is_never_solid(
        shape in arb_shape(),
        x in -100.0..100.0f64,
        y in -100.0..100.0f64,
        excess in 1e-6..100.0f64,
        above in any::<bool>(),
    ) {
        let z = if above { shape.half_length() + excess } else { -shape.half_length() - excess };
        prop_assert!(!is_in_membrane_wall(&Point3::new(x, y, z), &shape));
    }

    #[test]
    fn inside_slab_solid_iff_outside_pore_radius(
        shape in arb_shape(),
        x in -100.0..100.0f64,
        y in -100.0..100.0f64,
        t in -1.0..=1.0f64,
    ) {
        let p = Point3::new(x, y, t * shape.half_length());
        let s = (p.x * p.x + p.y * p.y).sqrt();
        let expected = s >= shape.half_diameter() + shape.slope() * p.z.abs();
        prop_assert_eq!(is_in_membrane_wall(&p, &shape), expected);
    }

    #[test]
    fn classification_is_idempotent(shape in arb_shape(), p in arb_point()) {
        let first = is_in_membrane_wall(&p, &shape);
        let second = is_in_membrane_wall(&p, &shape);
        prop_assert_eq!(first, second);
        prop_assert_eq!(shape.contains_solid(&p), first);
    }

    #[test]
    fn radius_never_shrinks_with_angle(
        z in -50.0..50.0f64,
        a in -80.0..80.0f64,
        b in -80.0..80.0f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let narrow = PoreShape::from_dimensions(20.0, 4.0, lo).unwrap();
        let wide = PoreShape::from_dimensions(20.0, 4.0, hi).unwrap();
        prop_assert!(wide.radius_at(z) >= narrow.radius_at(z));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn outside_count_never_drops_with_angle(
        a in 0.0..80.0f64,
        b in 0.0..80.0f64,
        length in 2.0..16.0f64,
        diameter in 0.0..8.0f64,
    ) {
        let grid = CellGrid::new(Matrix3::identity() * 16.0, 1.0).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let narrow = PoreShape::from_dimensions(length, diameter, lo).unwrap();
        let wide = PoreShape::from_dimensions(length, diameter, hi).unwrap();
        prop_assert!(count_outside(&grid, &wide) >= count_outside(&grid, &narrow));
    }
}
