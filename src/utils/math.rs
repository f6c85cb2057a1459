// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Unnormalized face normal (length is twice the triangle area)
pub fn triangle_cross(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    (p1 - p0).cross(&(p2 - p0))
}

pub fn triangle_area(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> f32 {
    0.5 * triangle_cross(p0, p1, p2).norm()
}

pub fn triangle_centroid(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Point3<f32> {
    Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
}

/// Normalize, or return `fallback` when the vector is too short to have a direction
pub fn normalize_or(v: &Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(1.0e-12).unwrap_or(fallback)
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Clamp a value between min and max
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Convert degrees to radians
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}
