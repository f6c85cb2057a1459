// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Property tests: random swipes through primitives

use katana::cut::{CutOutcome, MeshCutter};
use katana::geometry::analytics::{is_closed, is_closed_within, surface_area};
use katana::geometry::{Mesh, Primitive};
use nalgebra::{Matrix4, Point3, Vector3};
use proptest::prelude::*;

/// Fragments share seam positions exactly, so closure holds at any tolerance
const EXACT: f32 = 1.0e-6;

/// Swipe with direction angle `theta` whose line passes `offset` from the origin
fn swipe(mesh: &Mesh, theta: f32, offset: f32) -> CutOutcome {
    let direction = Vector3::new(theta.cos(), theta.sin(), 0.0);
    let normal = Vector3::new(-direction.y, direction.x, 0.0);
    let through = Point3::from(normal * offset);
    MeshCutter::default()
        .cut(
            mesh,
            &(through - direction * 3.0),
            &(through + direction * 3.0),
            &Matrix4::identity(),
        )
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cube_fragments_are_closed_and_conserve_area(
        theta in 0.0f32..std::f32::consts::PI,
        offset in -0.4f32..0.4,
    ) {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let outcome = swipe(&cube, theta, offset);

        prop_assert!(outcome.is_split());
        prop_assert!(is_closed(&outcome.positive.mesh));
        prop_assert!(is_closed(&outcome.negative.mesh));

        let total = outcome.positive.surface_area + outcome.negative.surface_area;
        prop_assert!((total - 6.0).abs() < 1e-3, "area {} instead of 6", total);
    }

    #[test]
    fn weights_are_normalized(
        theta in 0.0f32..std::f32::consts::PI,
        offset in -1.5f32..1.5,
    ) {
        let cylinder = Primitive::cylinder(1.2, 0.5, 16).to_mesh();
        let outcome = swipe(&cylinder, theta, offset);

        let (pw, nw) = (outcome.positive.weight, outcome.negative.weight);
        prop_assert!(pw > 0.0 && nw > 0.0, "weights {} / {}", pw, nw);
        prop_assert!((pw + nw - 1.0).abs() < 1e-6);

        if outcome.is_split() {
            prop_assert!(is_closed_within(&outcome.positive.mesh, EXACT));
            prop_assert!(is_closed_within(&outcome.negative.mesh, EXACT));
        }
    }

    #[test]
    fn cuts_grazing_a_vertex_stay_closed(
        theta in 0.0f32..std::f32::consts::PI,
        pick in 0usize..10_000,
        gap in 2.1e-3f32..6.0e-3,
        beyond in any::<bool>(),
    ) {
        // Plane just outside the tolerance band of one vertex, where many
        // edges of a fan cross it close together
        let cylinder = Primitive::cylinder(1.2, 0.5, 24).to_mesh();
        let v = cylinder.vertices[pick % cylinder.vertex_count()].position;
        let normal = Vector3::new(-theta.sin(), theta.cos(), 0.0);
        let offset = normal.dot(&v.coords) + if beyond { gap } else { -gap };
        let outcome = swipe(&cylinder, theta, offset);

        if outcome.is_split() {
            prop_assert!(is_closed_within(&outcome.positive.mesh, EXACT));
            prop_assert!(is_closed_within(&outcome.negative.mesh, EXACT));
        }
    }

    #[test]
    fn recut_fragments_stay_closed(
        first_theta in 0.0f32..std::f32::consts::PI,
        first_offset in -0.5f32..0.5,
        second_theta in 0.0f32..std::f32::consts::PI,
        second_offset in -0.3f32..0.3,
    ) {
        let sphere = Primitive::sphere(1.0, 16).to_mesh();
        let first = swipe(&sphere, first_theta, first_offset);
        prop_assume!(first.is_split());

        for half in [&first.positive.mesh, &first.negative.mesh] {
            prop_assert!(is_closed_within(half, EXACT));
            let second = swipe(half, second_theta, second_offset);
            if second.is_split() {
                prop_assert!(is_closed_within(&second.positive.mesh, EXACT));
                prop_assert!(is_closed_within(&second.negative.mesh, EXACT));
            }
        }
    }

    #[test]
    fn sphere_area_is_conserved_and_halves_respect_the_plane(
        theta in 0.0f32..std::f32::consts::PI,
        offset in -0.8f32..0.8,
    ) {
        let sphere = Primitive::sphere(1.0, 16).to_mesh();
        let original = surface_area(&sphere);
        let outcome = swipe(&sphere, theta, offset);

        let total = outcome.positive.surface_area + outcome.negative.surface_area;
        prop_assert!(((total - original) / original).abs() < 1e-4);
        prop_assert!(outcome.is_split());
        prop_assert!(is_closed_within(&outcome.positive.mesh, EXACT));
        prop_assert!(is_closed_within(&outcome.negative.mesh, EXACT));

        let tolerance = 2.5e-3;
        for v in &outcome.positive.mesh.vertices {
            let p = v.position + outcome.positive.centroid_local.coords;
            prop_assert!(outcome.plane.signed_distance(&p) >= -tolerance);
        }
        for v in &outcome.negative.mesh.vertices {
            let p = v.position + outcome.negative.centroid_local.coords;
            prop_assert!(outcome.plane.signed_distance(&p) <= tolerance);
        }
    }
}
