// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::{CutPlane, Side, Vertex};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        Self::from_points(vertices.iter().map(|v| v.position))
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(&point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        self.size() * 0.5
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// The side the whole box lies on, when every corner is strictly off the
    /// plane on the same side. `None` if the plane may touch the box.
    pub fn side_of(&self, plane: &CutPlane, epsilon: f32) -> Option<Side> {
        if self.is_empty() {
            return None;
        }
        let mut corners = self.corners().into_iter().map(|c| plane.classify(&c, epsilon));
        let first = corners.next()?;
        if first == Side::On {
            return None;
        }
        corners.all(|side| side == first).then_some(first)
    }
}
