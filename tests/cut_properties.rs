// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric properties of cut fragments

use anyhow::Result;
use katana::cut::{CutConfig, CutOutcome, MeshCutter};
use katana::geometry::analytics::{is_closed, is_closed_within, surface_area};
use katana::geometry::{analyze, Mesh, Primitive};
use nalgebra::{Matrix4, Point3, Vector3};

fn cut(mesh: &Mesh, start: [f32; 3], end: [f32; 3]) -> Result<CutOutcome> {
    let outcome = MeshCutter::default().cut(
        mesh,
        &Point3::from(start),
        &Point3::from(end),
        &Matrix4::identity(),
    )?;
    Ok(outcome)
}

fn assert_half_space(outcome: &CutOutcome) {
    let tolerance = CutConfig::default().plane_epsilon + 1e-4;
    for v in &outcome.positive.mesh.vertices {
        let d = outcome
            .plane
            .signed_distance(&(v.position + outcome.positive.centroid_local.coords));
        assert!(d >= -tolerance, "positive fragment vertex at distance {}", d);
    }
    for v in &outcome.negative.mesh.vertices {
        let d = outcome
            .plane
            .signed_distance(&(v.position + outcome.negative.centroid_local.coords));
        assert!(d <= tolerance, "negative fragment vertex at distance {}", d);
    }
}

#[test]
fn test_unit_cube_horizontal_cut() -> Result<()> {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh();
    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.triangle_count(), 12);

    let outcome = cut(&cube, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0])?;

    println!("Unit cube cut at y = 0:");
    for (label, fragment) in [("positive", &outcome.positive), ("negative", &outcome.negative)] {
        println!(
            "  {}: area {:.4} + cap {:.4}, {} triangles, weight {:.3}, centroid ({:.3}, {:.3}, {:.3})",
            label,
            fragment.surface_area,
            fragment.cap_area,
            fragment.mesh.triangle_count(),
            fragment.weight,
            fragment.centroid_local.x,
            fragment.centroid_local.y,
            fragment.centroid_local.z
        );

        assert!(
            (fragment.surface_area - 3.0).abs() < 1e-4,
            "{} kept area {} instead of 3",
            label,
            fragment.surface_area
        );
        assert!(
            (fragment.cap_area - 1.0).abs() < 1e-4,
            "{} cap area {} instead of 1",
            label,
            fragment.cap_area
        );
        assert!(is_closed(&fragment.mesh), "{} fragment is open", label);
        assert!((fragment.weight - 0.5).abs() < 1e-4);
    }

    assert_eq!(outcome.plane.normal, Vector3::new(0.0, 1.0, 0.0));
    assert!(outcome.positive.centroid_local.y > 0.2);
    assert!(outcome.negative.centroid_local.y < -0.2);
    assert_half_space(&outcome);

    // Closed halves of a unit cube enclose half its volume each
    for fragment in [&outcome.positive, &outcome.negative] {
        let stats = analyze(&fragment.mesh);
        assert!(
            (stats.volume - 0.5).abs() < 1e-3,
            "fragment volume {} instead of 0.5",
            stats.volume
        );
    }

    Ok(())
}

#[test]
fn test_sphere_cuts_conserve_area_and_close() -> Result<()> {
    let sphere = Primitive::sphere(1.0, 32).to_mesh();
    let original = surface_area(&sphere);

    let swipes = [
        ([-2.0, -1.7, 0.0], [2.0, 1.9, 0.0]),
        ([0.3, -2.0, 0.0], [0.1, 2.0, 0.0]),
        ([-2.0, 0.45, 0.0], [2.0, 0.4, 0.0]),
        ([1.5, -0.2, 0.3], [-1.5, 0.9, -0.3]),
    ];

    for (start, end) in swipes {
        let outcome = cut(&sphere, start, end)?;
        let total = outcome.positive.surface_area + outcome.negative.surface_area;
        let error = ((total - original) / original).abs();

        println!(
            "Swipe {:?} -> {:?}: {} split triangles, area error {:.2e}, weights {:.3}/{:.3}",
            start, end, outcome.split_triangles, error, outcome.positive.weight, outcome.negative.weight
        );

        assert!(outcome.is_split());
        assert!(error < 1e-4, "area not conserved: {} vs {}", total, original);
        assert!(is_closed(&outcome.positive.mesh), "positive fragment is open");
        assert!(is_closed(&outcome.negative.mesh), "negative fragment is open");
        assert!((outcome.positive.weight + outcome.negative.weight - 1.0).abs() < 1e-6);
        assert!(outcome.positive.weight > 0.0 && outcome.negative.weight > 0.0);
        assert_half_space(&outcome);
    }

    Ok(())
}

#[test]
fn test_disjoint_plane_is_noop() -> Result<()> {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh();
    let outcome = cut(&cube, [5.0, -1.0, 0.0], [5.0, 1.0, 0.0])?;

    println!(
        "Disjoint cut: {} split triangles, positive {} / negative {} triangles",
        outcome.split_triangles,
        outcome.positive.mesh.triangle_count(),
        outcome.negative.mesh.triangle_count()
    );

    assert_eq!(outcome.split_triangles, 0);
    assert!(!outcome.is_split());
    assert_eq!(outcome.positive.mesh.triangle_count(), cube.triangle_count());
    assert_eq!(outcome.positive.mesh.vertex_count(), cube.vertex_count());
    assert!(outcome.negative.is_empty());
    assert!(outcome.positive.weight > 0.0 && outcome.negative.weight > 0.0);
    assert!((outcome.positive.weight + outcome.negative.weight - 1.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_recut_leaves_sibling_untouched() -> Result<()> {
    let cylinder = Primitive::cylinder(1.2, 0.5, 24).to_mesh();
    let first = cut(&cylinder, [-2.0, 0.1, 0.0], [2.0, 0.1, 0.0])?;
    let sibling = first.negative.mesh.clone();

    let second = cut(&first.positive.mesh, [0.05, -2.0, 0.0], [0.05, 2.0, 0.0])?;

    println!(
        "Re-cut: first split {} triangles, second split {} triangles",
        first.split_triangles, second.split_triangles
    );

    assert!(second.is_split());
    assert_eq!(first.negative.mesh.indices, sibling.indices);
    assert_eq!(first.negative.mesh.vertices, sibling.vertices);
    assert!(is_closed(&second.positive.mesh));
    assert!(is_closed(&second.negative.mesh));

    let parent_area = first.positive.surface_area + first.positive.cap_area;
    let child_area = second.positive.surface_area + second.negative.surface_area;
    assert!(
        (parent_area - child_area).abs() < 1e-3,
        "second cut lost area: {} vs {}",
        child_area,
        parent_area
    );

    Ok(())
}

#[test]
fn test_cut_grazing_cylinder_cap_centre_stays_closed() -> Result<()> {
    // The plane passes 2.08e-3 from the centres of both cap fans, just
    // outside the on-plane tolerance, so 24 fan edges cross it within a
    // few thousandths of each other
    let cylinder = Primitive::cylinder(1.2, 0.5, 24).to_mesh();
    let theta: f32 = 1.431_277_4;
    let through = Vector3::new(-0.013_318_36, -0.109_800_43, 0.0);
    let direction = Vector3::new(theta.cos(), theta.sin(), 0.0);
    let start = through - direction * 3.0;
    let end = through + direction * 3.0;

    let outcome = cut(&cylinder, start.into(), end.into())?;
    let centre_distance = outcome.plane.signed_distance(&Point3::new(0.0, 0.0, 0.6));
    println!(
        "Cap centre at {:.5} from the plane, {} split triangles",
        centre_distance, outcome.split_triangles
    );
    assert!(centre_distance.abs() > CutConfig::default().plane_epsilon);

    assert!(outcome.is_split());
    for (label, fragment) in [("positive", &outcome.positive), ("negative", &outcome.negative)] {
        assert!(
            is_closed_within(&fragment.mesh, 1e-6),
            "{} fragment is open",
            label
        );
        assert!(fragment.cap_triangles > 0);
    }

    let total = outcome.positive.surface_area + outcome.negative.surface_area;
    assert!((total - surface_area(&cylinder)).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_world_space_cut_of_placed_mesh() -> Result<()> {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    let model = Matrix4::new_translation(&Vector3::new(3.0, -2.0, 0.0))
        * Matrix4::new_rotation(Vector3::z() * std::f32::consts::FRAC_PI_4);

    // Vertical world swipe through the cube's centre
    let outcome = MeshCutter::default().cut(
        &cube,
        &Point3::new(3.0, -4.0, 0.0),
        &Point3::new(3.0, 0.0, 0.0),
        &model,
    )?;

    println!(
        "Placed cube: world normal ({:.3}, {:.3}, {:.3}), centroids x {:.3} / {:.3}",
        outcome.normal_world.x,
        outcome.normal_world.y,
        outcome.normal_world.z,
        outcome.positive.centroid_world.x,
        outcome.negative.centroid_world.x
    );

    assert!((outcome.normal_world - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-4);
    assert!(outcome.positive.centroid_world.x < 3.0);
    assert!(outcome.negative.centroid_world.x > 3.0);
    assert!((outcome.positive.weight - 0.5).abs() < 1e-3);

    Ok(())
}
