// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! All primitives are centred on the origin, wound counter-clockwise when
//! seen from outside, and carry normals, texture coordinates and a tangent
//! frame so they can go straight through the cut engine.

use super::{Mesh, Vertex};
use crate::utils::math::normalize_or;
use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// `shared_corners` gives the minimal 8-vertex cube with corner normals
    Cube { size: Vector3<f32>, shared_corners: bool },
    Sphere { radius: f32, segments: u32 },
    /// Axis along Z
    Cylinder { height: f32, radius: f32, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f32>, shared_corners: bool) -> Self {
        Self::Cube {
            size,
            shared_corners,
        }
    }

    pub fn sphere(radius: f32, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Sphere { radius, segments }
    }

    pub fn cylinder(height: f32, radius: f32, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Cylinder {
            height,
            radius,
            segments,
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cube {
                size,
                shared_corners: true,
            } => generate_corner_cube_mesh(size),
            Self::Cube { size, .. } => generate_cube_mesh(size),
            Self::Sphere { radius, segments } => generate_sphere_mesh(radius, segments),
            Self::Cylinder {
                height,
                radius,
                segments,
            } => generate_cylinder_mesh(height, radius, segments),
        }
    }
}

fn cube_corners(size: Vector3<f32>) -> [Point3<f32>; 8] {
    let h = size / 2.0;
    [
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, h.z),
        Point3::new(-h.x, h.y, h.z),
    ]
}

// 6 faces, two triangles each, with the face normal
const CUBE_FACES: [([usize; 3], [f32; 3]); 12] = [
    // Front (z+)
    ([4, 5, 6], [0.0, 0.0, 1.0]),
    ([4, 6, 7], [0.0, 0.0, 1.0]),
    // Back (z-)
    ([1, 0, 3], [0.0, 0.0, -1.0]),
    ([1, 3, 2], [0.0, 0.0, -1.0]),
    // Right (x+)
    ([5, 1, 2], [1.0, 0.0, 0.0]),
    ([5, 2, 6], [1.0, 0.0, 0.0]),
    // Left (x-)
    ([0, 4, 7], [-1.0, 0.0, 0.0]),
    ([0, 7, 3], [-1.0, 0.0, 0.0]),
    // Top (y+)
    ([7, 6, 2], [0.0, 1.0, 0.0]),
    ([7, 2, 3], [0.0, 1.0, 0.0]),
    // Bottom (y-)
    ([0, 1, 5], [0.0, -1.0, 0.0]),
    ([0, 5, 4], [0.0, -1.0, 0.0]),
];

/// Planar UV of a point on the face with the given normal
fn face_uv(p: &Point3<f32>, normal: &Vector3<f32>, size: &Vector3<f32>) -> Vector2<f32> {
    let rel = p.coords.component_div(size) + Vector3::repeat(0.5);
    if normal.x.abs() > 0.5 {
        Vector2::new(rel.z, rel.y)
    } else if normal.y.abs() > 0.5 {
        Vector2::new(rel.x, rel.z)
    } else {
        Vector2::new(rel.x, rel.y)
    }
}

fn generate_cube_mesh(size: Vector3<f32>) -> Mesh {
    let positions = cube_corners(size);
    let mut mesh = Mesh::with_capacity(36, 12);

    for (corners, normal) in CUBE_FACES {
        let normal = Vector3::from(normal);
        let mut tri = [0u32; 3];
        for (slot, &corner) in tri.iter_mut().zip(corners.iter()) {
            let position = positions[corner];
            let mut vertex = Vertex::with_position_normal(position, normal);
            vertex.tex_coords = face_uv(&position, &normal, &size);
            *slot = mesh.add_vertex(vertex);
        }
        mesh.add_triangle(tri);
    }

    // Faces share corners with identical attributes: 36 -> 24 vertices
    mesh.weld();
    mesh
}

fn generate_corner_cube_mesh(size: Vector3<f32>) -> Mesh {
    let positions = cube_corners(size);
    let mut mesh = Mesh::with_capacity(8, 12);

    for position in positions {
        let mut vertex = Vertex::with_position_normal(position, position.coords);
        let rel = position.coords.component_div(&size) + Vector3::repeat(0.5);
        vertex.tex_coords = Vector2::new(rel.x, rel.y);
        mesh.add_vertex(vertex);
    }
    for (corners, _) in CUBE_FACES {
        mesh.add_triangle(corners.map(|c| c as u32));
    }
    mesh
}

fn generate_sphere_mesh(radius: f32, segments: u32) -> Mesh {
    let stacks = segments;
    let slices = segments;
    let mut mesh = Mesh::with_capacity(
        ((stacks + 1) * (slices + 1)) as usize,
        (2 * stacks * slices) as usize,
    );

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * PI * j as f32 / slices as f32;
            let normal = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let tangent = Vector3::new(-theta.sin(), 0.0, theta.cos());
            let bitangent = normalize_or(&normal.cross(&tangent), Vector3::y());
            mesh.add_vertex(Vertex::new(
                Point3::from(normal * radius),
                normal,
                Vector2::new(j as f32 / slices as f32, i as f32 / stacks as f32),
                tangent,
                bitangent,
            ));
        }
    }

    // Quads between rings; the pole rows keep only their non-degenerate half
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * (slices + 1) + j;
            let b = a + 1;
            let c = a + slices + 1;
            let d = c + 1;
            if i != 0 {
                mesh.add_triangle([a, b, c]);
            }
            if i + 1 != stacks {
                mesh.add_triangle([b, d, c]);
            }
        }
    }

    mesh
}

fn generate_cylinder_mesh(height: f32, radius: f32, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let half = height / 2.0;
    let down = -Vector3::z();
    let up = Vector3::z();

    let cap_vertex = |position: Point3<f32>, normal: Vector3<f32>| {
        let mut vertex = Vertex::new(
            position,
            normal,
            Vector2::new(position.x / (2.0 * radius) + 0.5, position.y / (2.0 * radius) + 0.5),
            Vector3::x(),
            normal.cross(&Vector3::x()),
        );
        vertex.bitangent = normalize_or(&vertex.bitangent, Vector3::y());
        vertex
    };

    let bottom_center = mesh.add_vertex(cap_vertex(Point3::new(0.0, 0.0, -half), down));
    let top_center = mesh.add_vertex(cap_vertex(Point3::new(0.0, 0.0, half), up));

    let ring: Vec<(f32, f32)> = (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / segments as f32;
            (angle.cos(), angle.sin())
        })
        .collect();

    let bottom: Vec<u32> = ring
        .iter()
        .map(|&(c, s)| mesh.add_vertex(cap_vertex(Point3::new(radius * c, radius * s, -half), down)))
        .collect();
    let top: Vec<u32> = ring
        .iter()
        .map(|&(c, s)| mesh.add_vertex(cap_vertex(Point3::new(radius * c, radius * s, half), up)))
        .collect();

    for i in 0..segments as usize {
        let next = (i + 1) % segments as usize;
        mesh.add_triangle([bottom_center, bottom[next], bottom[i]]);
        mesh.add_triangle([top_center, top[i], top[next]]);
    }

    // Side wall gets its own vertices so the rim stays a hard edge; the seam
    // column is duplicated for continuous UVs.
    let mut side = Vec::with_capacity((segments as usize + 1) * 2);
    for j in 0..=segments {
        let angle = 2.0 * PI * j as f32 / segments as f32;
        let normal = Vector3::new(angle.cos(), angle.sin(), 0.0);
        let tangent = Vector3::new(-angle.sin(), angle.cos(), 0.0);
        let u = j as f32 / segments as f32;
        for (z, v) in [(-half, 0.0), (half, 1.0)] {
            side.push(mesh.add_vertex(Vertex::new(
                Point3::new(radius * normal.x, radius * normal.y, z),
                normal,
                Vector2::new(u, v),
                tangent,
                up,
            )));
        }
    }
    for j in 0..segments as usize {
        let (bi, ti) = (side[2 * j], side[2 * j + 1]);
        let (bn, tn) = (side[2 * j + 2], side[2 * j + 3]);
        mesh.add_triangle([bi, bn, ti]);
        mesh.add_triangle([ti, bn, tn]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::{is_closed, volume};
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let flat = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        assert_eq!(flat.vertex_count(), 24);
        assert_eq!(flat.triangle_count(), 12);

        let shared = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh();
        assert_eq!(shared.vertex_count(), 8);
        assert_eq!(shared.triangle_count(), 12);
    }

    #[test]
    fn test_primitives_are_closed_and_outward() {
        let meshes = [
            Primitive::cube(Vector3::new(2.0, 1.0, 1.0), false).to_mesh(),
            Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh(),
            Primitive::sphere(1.0, 16).to_mesh(),
            Primitive::cylinder(2.0, 0.5, 24).to_mesh(),
        ];
        for mesh in &meshes {
            assert!(mesh.validate().is_ok());
            assert!(is_closed(mesh), "primitive should be closed");
            assert!(volume(mesh) > 0.0, "primitive should be wound outward");
        }
    }

    #[test]
    fn test_sphere_has_no_degenerate_triangles() {
        let mesh = Primitive::sphere(1.0, 8).to_mesh();
        // 8 stacks: 6 full quad rows plus 2 pole fans
        assert_eq!(mesh.triangle_count(), 2 * 8 * 8 - 2 * 8);
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(t);
            assert!((b - a).cross(&(c - a)).norm() > 1e-6, "triangle {} is degenerate", t);
        }
    }

    #[test]
    fn test_cylinder_volume() {
        let mesh = Primitive::cylinder(2.0, 1.0, 128).to_mesh();
        assert_relative_eq!(volume(&mesh), 2.0 * PI, max_relative = 0.01);
    }
}
