// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cutting plane derived from a screen-space swipe
//!
//! The plane always contains the object's Z axis direction: it is built from
//! the XY projection of the swipe in object space, and every side test is
//! evaluated in that projection.

use super::Vertex;
use crate::error::CutError;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which half-space a vertex falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Positive,
    Negative,
    /// Within tolerance of the plane
    On,
}

/// Object-space plane through `point` with XY unit `normal` (z is zero)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPlane {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl CutPlane {
    /// Plane perpendicular (in XY) to the segment `start → end`, through `end`.
    /// The normal is the cut direction rotated by +90 degrees.
    pub fn from_segment(start: &Point3<f32>, end: &Point3<f32>) -> Result<Self, CutError> {
        let direction = Vector3::new(end.x - start.x, end.y - start.y, 0.0);
        let normal = Vector3::new(-direction.y, direction.x, 0.0)
            .try_normalize(1.0e-9)
            .ok_or(CutError::DegenerateSegment)?;
        Ok(Self { point: *end, normal })
    }

    /// Bring a world-space swipe into the object's frame, then build the plane
    pub fn from_world_segment(
        start: &Point3<f32>,
        end: &Point3<f32>,
        model: &Matrix4<f32>,
    ) -> Result<Self, CutError> {
        let inverse = model.try_inverse().ok_or(CutError::NonInvertibleModel)?;
        Self::from_segment(&inverse.transform_point(start), &inverse.transform_point(end))
    }

    /// In-plane direction of the cut (the normal rotated back by -90 degrees)
    pub fn direction(&self) -> Vector3<f32> {
        Vector3::new(self.normal.y, -self.normal.x, 0.0)
    }

    /// Signed distance in the XY projection
    pub fn signed_distance(&self, p: &Point3<f32>) -> f32 {
        self.normal.x * (p.x - self.point.x) + self.normal.y * (p.y - self.point.y)
    }

    pub fn classify(&self, p: &Point3<f32>, epsilon: f32) -> Side {
        Self::side_for(self.signed_distance(p), epsilon)
    }

    /// Side of a vertex, using the vertex's own XY side test
    pub fn classify_vertex(&self, v: &Vertex, epsilon: f32) -> Side {
        Self::side_for(v.side_value(&self.normal, &self.point), epsilon)
    }

    fn side_for(d: f32, epsilon: f32) -> Side {
        if d > epsilon {
            Side::Positive
        } else if d < -epsilon {
            Side::Negative
        } else {
            Side::On
        }
    }

    /// Crossing factor along `start → end`:
    /// `t = dot(point - start, n) / dot(end - start, n)`, `None` when the edge
    /// is parallel to the plane.
    pub fn edge_crossing(&self, start: &Point3<f32>, end: &Point3<f32>) -> Option<f32> {
        let edge = end - start;
        let along = edge.x * self.normal.x + edge.y * self.normal.y;
        if along.abs() <= f32::EPSILON * edge.norm().max(1.0) {
            return None;
        }
        let to_plane = self.point - start;
        Some((to_plane.x * self.normal.x + to_plane.y * self.normal.y) / along)
    }

    /// Rotate the object-space normal into world space
    pub fn world_normal(&self, model: &Matrix4<f32>) -> Vector3<f32> {
        let world = model.transform_vector(&self.normal);
        world.try_normalize(1.0e-9).unwrap_or(self.normal)
    }
}
