// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Seam tracking and cap generation

use super::split::SideBuilder;
use crate::geometry::{CutPlane, Vertex};
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector2, Vector3};

/// Directed boundary edges left by the cut on one side, between seam point ids.
///
/// Edges are stored in the winding direction of the triangle that produced
/// them. An edge and its reverse cancel, so only the open boundary remains.
pub(crate) struct SeamEdges {
    edges: Vec<Option<(u32, u32)>>,
    open: AHashMap<(u32, u32), Vec<usize>>,
}

impl SeamEdges {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            open: AHashMap::new(),
        }
    }

    pub fn add(&mut self, a: u32, b: u32) {
        if a == b {
            return;
        }

        if let Some(slot) = self.open.get_mut(&(b, a)).and_then(|slots| slots.pop()) {
            self.edges[slot] = None;
            return;
        }
        self.open.entry((a, b)).or_default().push(self.edges.len());
        self.edges.push(Some((a, b)));
    }

    /// Remaining edges, in insertion order
    pub fn open_edges(&self) -> Vec<(u32, u32)> {
        self.edges.iter().flatten().copied().collect()
    }
}

/// Close the open seam of `side` with a triangle fan around the seam centroid.
///
/// `points` resolves seam ids to positions and `cap_normal` points out of the
/// fragment through the cut face. Returns the number of cap triangles added.
pub(crate) fn build_cap(
    side: &mut SideBuilder,
    plane: &CutPlane,
    points: &[Point3<f32>],
    cap_normal: Vector3<f32>,
) -> usize {
    let edges = side.seam.open_edges();
    if edges.is_empty() {
        return 0;
    }

    let tangent = plane.direction();
    let bitangent = cap_normal.cross(&tangent);
    let cap_vertex = |p: Point3<f32>| {
        let offset = p - plane.point;
        Vertex::new(
            p,
            cap_normal,
            Vector2::new(offset.dot(&tangent), p.z),
            tangent,
            bitangent,
        )
    };

    let apex = side.add_vertex(cap_vertex(seam_center(&edges, points)));
    let mut ring: AHashMap<u32, u32> = AHashMap::new();
    let mut ring_vertex = |side: &mut SideBuilder, id: u32| {
        *ring
            .entry(id)
            .or_insert_with(|| side.add_vertex(cap_vertex(points[id as usize])))
    };

    for &(a, b) in &edges {
        let b_out = ring_vertex(side, b);
        let a_out = ring_vertex(side, a);
        side.push_cap_triangle([apex, b_out, a_out]);
    }
    edges.len()
}

/// Mean of the distinct seam points
fn seam_center(edges: &[(u32, u32)], points: &[Point3<f32>]) -> Point3<f32> {
    let mut seen = AHashSet::new();
    let mut sum = Vector3::zeros();
    for id in edges.iter().flat_map(|&(a, b)| [a, b]) {
        if seen.insert(id) {
            sum += points[id as usize].coords;
        }
    }
    Point3::from(sum / seen.len().max(1) as f32)
}
