// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex with the full set of shading attributes

use crate::utils::math::{approx_eq, normalize_or};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Per-axis tolerance used when deciding two vertices are the same
pub const VERTEX_EPSILON: f32 = 0.001;

/// Vertex with position, normal, texture coordinates and tangent frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coords: Vector2<f32>,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        tex_coords: Vector2<f32>,
        tangent: Vector3<f32>,
        bitangent: Vector3<f32>,
    ) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            tangent,
            bitangent,
        }
    }

    /// Position-only vertex, used as a lookup key when only positions matter
    pub fn from_position(position: Point3<f32>) -> Self {
        Self::new(
            position,
            Vector3::zeros(),
            Vector2::zeros(),
            Vector3::zeros(),
            Vector3::zeros(),
        )
    }

    /// Vertex with an arbitrary tangent frame derived from the normal
    pub fn with_position_normal(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        let normal = normalize_or(&normal, Vector3::z());
        let helper = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let tangent = normalize_or(&(helper - normal * normal.dot(&helper)), Vector3::x());
        let bitangent = normal.cross(&tangent);
        Self::new(position, normal, Vector2::zeros(), tangent, bitangent)
    }

    /// Signed side value of this vertex against a plane, measured in the XY
    /// projection: `dot(n, (p.x - q.x, p.y - q.y, 0))`.
    pub fn side_value(&self, plane_normal: &Vector3<f32>, plane_point: &Point3<f32>) -> f32 {
        let offset = Vector3::new(
            self.position.x - plane_point.x,
            self.position.y - plane_point.y,
            0.0,
        );
        plane_normal.dot(&offset)
    }

    /// Component-wise equality within [`VERTEX_EPSILON`] on every attribute
    pub fn equals(&self, other: &Vertex) -> bool {
        self.equals_within(other, VERTEX_EPSILON)
    }

    pub fn equals_within(&self, other: &Vertex, epsilon: f32) -> bool {
        let close3 = |a: &Vector3<f32>, b: &Vector3<f32>| {
            a.iter().zip(b.iter()).all(|(x, y)| approx_eq(*x, *y, epsilon))
        };
        close3(&self.position.coords, &other.position.coords)
            && close3(&self.normal, &other.normal)
            && approx_eq(self.tex_coords.x, other.tex_coords.x, epsilon)
            && approx_eq(self.tex_coords.y, other.tex_coords.y, epsilon)
            && close3(&self.tangent, &other.tangent)
            && close3(&self.bitangent, &other.bitangent)
    }

    /// Interpolate every attribute. Direction attributes are renormalized
    /// so a lerp between two unit normals stays unit length.
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        let position = self.position + (other.position - self.position) * t;
        let normal = self.normal.lerp(&other.normal, t);
        let tangent = self.tangent.lerp(&other.tangent, t);
        let bitangent = self.bitangent.lerp(&other.bitangent, t);
        Vertex {
            position,
            normal: normalize_or(&normal, self.normal),
            tex_coords: self.tex_coords.lerp(&other.tex_coords, t),
            tangent: normalize_or(&tangent, self.tangent),
            bitangent: normalize_or(&bitangent, self.bitangent),
        }
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.position += offset;
    }

    pub fn transform(&mut self, matrix: &Matrix4<f32>) {
        self.position = matrix.transform_point(&self.position);
        // Normals use the inverse transpose, tangents follow the surface
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        self.normal = normalize_or(&normal_matrix.transform_vector(&self.normal), self.normal);
        self.tangent = normalize_or(&matrix.transform_vector(&self.tangent), self.tangent);
        self.bitangent = normalize_or(&matrix.transform_vector(&self.bitangent), self.bitangent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex_at(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::with_position_normal(Point3::new(x, y, z), Vector3::z())
    }

    #[test]
    fn test_side_value_ignores_z() {
        let normal = Vector3::new(1.0, 0.0, 0.0);
        let point = Point3::new(0.5, 3.0, -7.0);

        assert_relative_eq!(vertex_at(1.0, 0.0, 100.0).side_value(&normal, &point), 0.5);
        assert_relative_eq!(vertex_at(0.0, -2.0, 0.0).side_value(&normal, &point), -0.5);

        // Even a plane normal with a Z component is evaluated in projection
        let tilted = Vector3::new(0.0, 0.0, 1.0);
        assert_eq!(vertex_at(5.0, 5.0, 5.0).side_value(&tilted, &point), 0.0);
    }

    #[test]
    fn test_equals_tolerance() {
        let a = vertex_at(1.0, 2.0, 3.0);
        let mut b = a;
        b.position.x += 0.0009;
        assert!(a.equals(&b));

        b.position.x += 0.002;
        assert!(!a.equals(&b));

        let mut c = a;
        c.tex_coords.y = 0.5;
        assert!(!a.equals(&c), "texture coordinates take part in equality");
    }

    #[test]
    fn test_lerp_midpoint() {
        let mut a = vertex_at(0.0, 0.0, 0.0);
        let mut b = vertex_at(2.0, 4.0, 0.0);
        a.tex_coords = Vector2::new(0.0, 0.0);
        b.tex_coords = Vector2::new(1.0, 0.5);
        a.normal = Vector3::x();
        b.normal = Vector3::y();

        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.position, Point3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(mid.tex_coords, Vector2::new(0.5, 0.25));
        assert_relative_eq!(mid.normal.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(mid.normal.x, mid.normal.y, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_translation_keeps_normal() {
        let mut v = vertex_at(1.0, 1.0, 1.0);
        v.transform(&Matrix4::new_translation(&Vector3::new(0.0, -2.0, 0.0)));
        assert_relative_eq!(v.position, Point3::new(1.0, -1.0, 1.0));
        assert_relative_eq!(v.normal, Vector3::z());
    }

    #[test]
    fn test_tangent_frame_is_orthonormal() {
        let v = Vertex::with_position_normal(Point3::origin(), Vector3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(v.normal.dot(&v.tangent), 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.tangent.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.bitangent.norm(), 1.0, epsilon = 1e-6);
    }
}
