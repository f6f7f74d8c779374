use cellcomplex::adjacency;
use cellcomplex::cell::Cell;
use cellcomplex::errors::ConstructError;
use cellcomplex::float_types::{Real, parry3d::bounding_volume::Aabb};
use cellcomplex::plane::Plane;
use cellcomplex::CellComplex;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;

const EPS: Real = 1e-9;

fn cube_bounds(half: Real) -> Aabb {
    Aabb::new(
        Point3::new(-half, -half, -half),
        Point3::new(half, half, half),
    )
}

fn axis_plane(normal: Vector3<Real>, offset: Real) -> Plane {
    Plane { normal, offset }
}

fn assert_symmetric_and_irreflexive(complex: &CellComplex) {
    for id in 0..complex.num_cells() {
        let neighbors = complex.neighbors(id);
        assert!(!neighbors.contains(&id), "cell {id} is adjacent to itself");
        for &other in neighbors {
            assert!(
                complex.neighbors(other).contains(&id),
                "adjacency between {id} and {other} is not symmetric"
            );
        }
    }
}

#[test]
fn three_orthogonal_planes_make_eight_octants() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::y(), 0.0),
        axis_plane(Vector3::z(), 0.0),
    ];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    assert_eq!(complex.num_cells(), 8);
    assert_symmetric_and_irreflexive(&complex);

    for id in 0..8 {
        // Each octant is a unit cube sharing a face with exactly three others.
        assert!((complex.cells()[id].volume() - 1.0).abs() < 1e-9);
        assert_eq!(complex.neighbors(id).len(), 3, "octant {id}");
        // Three bounds walls plus three cut facets.
        assert_eq!(complex.boundary_facets(id).len(), 6);
    }

    // 8 octants · 3 faces / 2 = 12 interior interfaces, each a unit square.
    assert_eq!(complex.num_edges(), 12);
    for (_, _, shared) in complex.interfaces() {
        assert!((shared.area() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn single_plane_bisects_the_bounds() {
    let planes = [axis_plane(Vector3::x(), 0.0)];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    assert_eq!(complex.num_cells(), 2);
    assert_eq!(complex.neighbors(0), &BTreeSet::from([1]));
    assert_eq!(complex.neighbors(1), &BTreeSet::from([0]));

    // The shared facet is the plane clipped to the bounds: a 2×2 square.
    let shared = complex.interface(0, 1).unwrap();
    assert!((shared.area() - 4.0).abs() < 1e-9);
    assert_eq!(shared.source, Some(0));
    assert!(shared.plane.coincident(&complex.planes()[0], EPS));

    let volumes = complex.volumes();
    assert!((volumes[0] - 4.0).abs() < 1e-9);
    assert!((volumes[1] - 4.0).abs() < 1e-9);
}

#[test]
fn duplicate_planes_add_nothing() {
    let once = CellComplex::construct(
        &[axis_plane(Vector3::x(), 0.0)],
        cube_bounds(1.0),
        EPS,
        false,
    )
    .unwrap();
    let twice = CellComplex::construct(
        &[axis_plane(Vector3::x(), 0.0), axis_plane(Vector3::x(), 0.0)],
        cube_bounds(1.0),
        EPS,
        false,
    )
    .unwrap();

    assert_eq!(once.num_cells(), twice.num_cells());
    assert_eq!(once.num_edges(), twice.num_edges());
    for id in 0..once.num_cells() {
        assert_eq!(once.neighbors(id), twice.neighbors(id));
    }
}

#[test]
fn no_planes_yield_the_bounds_cell() {
    let complex = CellComplex::construct(&[], cube_bounds(1.0), EPS, false).unwrap();
    assert_eq!(complex.num_cells(), 1);
    assert_eq!(complex.num_edges(), 0);
    assert!((complex.cells()[0].volume() - 8.0).abs() < 1e-9);
}

#[test]
fn planes_outside_the_bounds_are_skipped() {
    let planes = [
        axis_plane(Vector3::x(), 5.0),
        axis_plane(Vector3::y(), 0.0),
        axis_plane(Vector3::z(), -7.0),
    ];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();
    assert_eq!(complex.num_cells(), 2);
}

#[test]
fn unusable_bounds_abort_before_partitioning() {
    let planes = [axis_plane(Vector3::x(), 0.0)];

    let flat = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
    let result = CellComplex::construct(&planes, flat, EPS, false);
    assert_eq!(result.unwrap_err(), ConstructError::UnboundedInput);

    let nan = Aabb::new(
        Point3::new(Real::NAN, -1.0, -1.0),
        Point3::new(1.0, 1.0, 1.0),
    );
    let result = CellComplex::construct(&planes, nan, EPS, false);
    assert_eq!(result.unwrap_err(), ConstructError::UnboundedInput);
}

#[test]
fn degenerate_input_planes_abort_extraction() {
    let planes = [axis_plane(Vector3::zeros(), 0.0)];
    let result = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false);
    assert!(matches!(
        result.unwrap_err(),
        ConstructError::DegeneratePlane(_)
    ));
}

#[test]
fn construction_is_deterministic() {
    let planes = [
        axis_plane(Vector3::x(), 0.25),
        axis_plane(Vector3::new(1.0, 1.0, 0.0).normalize(), 0.1),
        axis_plane(Vector3::y(), -0.4),
        axis_plane(Vector3::z(), 0.0),
    ];

    let first = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();
    let second = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    assert_eq!(first.num_cells(), second.num_cells());
    assert_eq!(first.volumes(), second.volumes());
    for id in 0..first.num_cells() {
        assert_eq!(first.neighbors(id), second.neighbors(id));
    }
    for ((a1, b1, p1), (a2, b2, p2)) in first.interfaces().zip(second.interfaces()) {
        assert_eq!((a1, b1), (a2, b2));
        assert_eq!(p1.vertices, p2.vertices);
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::y(), 0.0),
        axis_plane(Vector3::z(), 0.0),
        axis_plane(Vector3::x(), 0.5),
    ];

    let sequential = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();
    let parallel = CellComplex::construct(&planes, cube_bounds(1.0), EPS, true).unwrap();

    assert_eq!(sequential.num_cells(), parallel.num_cells());
    assert_eq!(sequential.num_edges(), parallel.num_edges());
    for id in 0..sequential.num_cells() {
        assert_eq!(sequential.neighbors(id), parallel.neighbors(id));
    }
    for ((a1, b1, p1), (a2, b2, p2)) in sequential.interfaces().zip(parallel.interfaces()) {
        assert_eq!((a1, b1), (a2, b2));
        assert_eq!(p1.vertices, p2.vertices);
        assert_eq!(p1.source, p2.source);
    }
    assert_symmetric_and_irreflexive(&parallel);
}

#[test]
fn more_tolerance_never_loses_adjacencies() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::y(), 0.0),
    ];
    let tight = CellComplex::construct(&planes, cube_bounds(1.0), 1e-9, false).unwrap();
    let loose = CellComplex::construct(&planes, cube_bounds(1.0), 1e-5, false).unwrap();

    assert!(tight.num_edges() <= loose.num_edges());
}

#[test]
fn tolerance_absorbs_flush_contact_gaps() {
    // Two boxes separated by a gap below the loose tolerance; their facing
    // walls sit on planes 1e-7 apart.
    let left = Cell::from_bounds(&Aabb::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 1.0),
    ));
    let right = Cell::from_bounds(&Aabb::new(
        Point3::new(1.0 + 1e-7, 0.0, 0.0),
        Point3::new(2.0, 1.0, 1.0),
    ));
    let cells = vec![left, right];

    let tight = adjacency::assemble(&cells, 1e-9, false).unwrap();
    assert_eq!(tight.num_edges(), 0);

    let loose = adjacency::assemble(&cells, 1e-5, false).unwrap();
    assert_eq!(loose.num_edges(), 1);
}

#[test]
fn cell_volumes_partition_the_bounds() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::x(), 0.5),
        axis_plane(Vector3::y(), -0.3),
        axis_plane(Vector3::new(0.0, 1.0, 1.0).normalize(), 0.2),
        axis_plane(Vector3::z(), 0.25),
    ];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    assert!(complex.num_cells() > 2);
    let total: Real = complex.volumes().iter().sum();
    assert!(
        (total - 8.0).abs() < 1e-6,
        "cell volumes sum to {total}, expected 8"
    );
    for volume in complex.volumes() {
        assert!(volume > 0.0);
    }
    assert_symmetric_and_irreflexive(&complex);
}

#[test]
fn locate_finds_each_cell_by_its_centroid() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::y(), 0.2),
        axis_plane(Vector3::z(), -0.6),
    ];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    for (id, cell) in complex.cells().iter().enumerate() {
        let centroid = cell.centroid();
        assert_eq!(complex.locate(&centroid), id);
        assert!(cell.contains(&centroid, EPS));
    }
}

#[test]
fn interface_provenance_points_at_input_planes() {
    let planes = [
        axis_plane(Vector3::x(), 0.0),
        axis_plane(Vector3::y(), 0.0),
    ];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    let mut seen = 0;
    for (_, _, shared) in complex.interfaces() {
        let source = shared.source.expect("interfaces lie on cutting planes");
        assert!(shared.plane.coincident(&complex.planes()[source], EPS));
        seen += 1;
    }
    assert_eq!(seen, complex.num_edges());
}

#[test]
fn boundary_facets_of_the_bisection_keep_wall_provenance() {
    let planes = [axis_plane(Vector3::x(), 0.0)];
    let complex = CellComplex::construct(&planes, cube_bounds(1.0), EPS, false).unwrap();

    let facets = complex.boundary_facets(0);
    assert_eq!(facets.len(), 6);
    let walls = facets.iter().filter(|f| f.source.is_none()).count();
    let caps = facets.iter().filter(|f| f.source == Some(0)).count();
    assert_eq!(walls, 5);
    assert_eq!(caps, 1);
}
