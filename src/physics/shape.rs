// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision shapes built from fragment hull points

use crate::geometry::BoundingBox;
use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::shape::SharedShape;
use parry3d::transformation::try_convex_hull;
use tracing::warn;

/// Convex hull of `points`, or a box around them when no proper hull exists
/// (fewer than four points, coplanar input, numerical failure).
pub fn hull_shape(points: &[Point3<f32>], min_half_extent: f32) -> SharedShape {
    let bbox = BoundingBox::from_points(points.iter().copied());
    let flat = bbox.is_empty() || bbox.size().min() <= min_half_extent * 0.5;

    if points.len() >= 4 && !flat {
        if let Ok((vertices, indices)) = try_convex_hull(points) {
            if let Some(shape) = SharedShape::convex_mesh(vertices, &indices) {
                return shape;
            }
        }
    }

    warn!(
        points = points.len(),
        "convex hull unavailable, falling back to a bounding cuboid"
    );
    box_shape(&bbox, min_half_extent)
}

fn box_shape(bbox: &BoundingBox, min_half_extent: f32) -> SharedShape {
    if bbox.is_empty() {
        return SharedShape::cuboid(min_half_extent, min_half_extent, min_half_extent);
    }
    let half: Vector3<f32> = bbox.half_extents().map(|e| e.max(min_half_extent));
    let cuboid = SharedShape::cuboid(half.x, half.y, half.z);
    let center = bbox.center();
    if center.coords.norm() <= f32::EPSILON {
        cuboid
    } else {
        SharedShape::compound(vec![(Isometry3::translation(center.x, center.y, center.z), cuboid)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use parry3d::shape::ShapeType;

    #[test]
    fn test_cube_points_make_a_hull() {
        let mesh = Primitive::cube(Vector3::new(1.0, 2.0, 1.0), true).to_mesh();
        let points: Vec<_> = mesh.positions().collect();
        let shape = hull_shape(&points, 0.01);
        assert_eq!(shape.shape_type(), ShapeType::ConvexPolyhedron);

        let aabb = shape.compute_local_aabb();
        assert!((aabb.maxs.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_points_fall_back_to_box() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let shape = hull_shape(&points, 0.01);
        assert_eq!(shape.shape_type(), ShapeType::Compound);
        let aabb = shape.compute_local_aabb();
        assert!((aabb.maxs.z - 0.01).abs() < 1e-5);
        assert!((aabb.mins.x - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_points() {
        let shape = hull_shape(&[], 0.05);
        assert_eq!(shape.shape_type(), ShapeType::Cuboid);
    }
}
