// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::weld::position_classes;
use super::{Mesh, VERTEX_EPSILON};
use crate::utils::math::{triangle_area, triangle_centroid};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStats {
    /// Enclosed volume (meaningful for closed meshes)
    pub volume: f32,
    pub surface_area: f32,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f32; 6],
    /// Area-weighted surface centroid [x, y, z]
    pub centroid: [f32; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge shared by exactly two oppositely wound triangles
    pub is_closed: bool,
}

impl MeshStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            triangle_count: 0,
            is_closed: false,
        }
    }

    /// Pretty print statistics
    pub fn print(&self, title: &str) {
        println!("┌─ {} ", title);
        println!("│ Volume:        {:>10.4}", self.volume);
        println!("│ Surface area:  {:>10.4}", self.surface_area);
        println!(
            "│ Centroid:      ({:>7.3}, {:>7.3}, {:>7.3})",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        println!(
            "│ Bounds:        ({:>7.3}, {:>7.3}, {:>7.3}) .. ({:>7.3}, {:>7.3}, {:>7.3})",
            self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("│ Vertices:      {:>10}", self.vertex_count);
        println!("│ Triangles:     {:>10}", self.triangle_count);
        println!(
            "└ Closed:        {:>10}",
            if self.is_closed { "yes" } else { "no" }
        );
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    if mesh.vertices.is_empty() || mesh.is_empty() {
        return MeshStats::empty();
    }

    let bbox = mesh.bounding_box();
    let centroid = area_weighted_centroid(mesh).unwrap_or_else(|| bbox.center());

    MeshStats {
        volume: volume(mesh),
        surface_area: surface_area(mesh),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid: [centroid.x, centroid.y, centroid.z],
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        is_closed: is_closed(mesh),
    }
}

/// Signed enclosed volume; positive for outward winding
pub fn volume(mesh: &Mesh) -> f32 {
    (0..mesh.triangle_count())
        .map(|t| {
            let [v0, v1, v2] = mesh.triangle_positions(t);
            // Signed volume of tetrahedron formed by triangle and origin
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

pub fn surface_area(mesh: &Mesh) -> f32 {
    (0..mesh.triangle_count())
        .map(|t| {
            let [v0, v1, v2] = mesh.triangle_positions(t);
            triangle_area(&v0, &v1, &v2)
        })
        .sum()
}

/// Centroid of the surface, each triangle weighted by its area.
/// `None` when the mesh has no area.
pub fn area_weighted_centroid(mesh: &Mesh) -> Option<Point3<f32>> {
    let mut total = 0.0;
    let mut sum = Point3::origin().coords;
    for t in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle_positions(t);
        let area = triangle_area(&v0, &v1, &v2);
        total += area;
        sum += triangle_centroid(&v0, &v1, &v2).coords * area;
    }
    (total > 0.0).then(|| Point3::from(sum / total))
}

/// Closed, consistently oriented surface test.
///
/// Vertices are first grouped by position so UV seams and hard edges do not
/// count as boundaries. Triangles that collapse under that grouping are
/// ignored. Every remaining directed edge must be matched by exactly one
/// reverse edge.
pub fn is_closed(mesh: &Mesh) -> bool {
    is_closed_within(mesh, VERTEX_EPSILON)
}

/// [`is_closed`] with an explicit position tolerance
pub fn is_closed_within(mesh: &Mesh, tolerance: f32) -> bool {
    if mesh.is_empty() {
        return false;
    }

    let classes = position_classes(mesh.positions(), tolerance);
    let mut directed: AHashMap<(u32, u32), i32> = AHashMap::new();

    for tri in mesh.triangles() {
        let [a, b, c] = tri.map(|i| classes[i as usize]);
        if a == b || b == c || a == c {
            continue;
        }
        for (from, to) in [(a, b), (b, c), (c, a)] {
            *directed.entry((from, to)).or_insert(0) += 1;
        }
    }

    directed
        .iter()
        .all(|(&(from, to), &count)| count == 1 && directed.get(&(to, from)) == Some(&1))
}
