// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex deduplication
//!
//! Positions are bucketed into a grid whose cell size equals the tolerance,
//! so any vertex within tolerance of a query lives in one of the 27 cells
//! around it. Lookup is expected O(1) instead of a scan of the buffer.

use super::vertex::{Vertex, VERTEX_EPSILON};
use ahash::AHashMap;
use nalgebra::Point3;

/// Integer grid cell of a position
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositionKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl PositionKey {
    pub fn quantize(p: &Point3<f32>, cell: f32) -> Self {
        Self {
            x: (p.x / cell).floor() as i64,
            y: (p.y / cell).floor() as i64,
            z: (p.z / cell).floor() as i64,
        }
    }

    fn offset(&self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// Accumulates a deduplicated vertex buffer
pub struct VertexWelder {
    vertices: Vec<Vertex>,
    buckets: AHashMap<PositionKey, Vec<u32>>,
    tolerance: f32,
}

impl VertexWelder {
    pub fn new() -> Self {
        Self::with_tolerance(VERTEX_EPSILON)
    }

    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            vertices: Vec::new(),
            buckets: AHashMap::new(),
            tolerance: tolerance.max(f32::EPSILON),
        }
    }

    /// Index of an existing equal vertex, or of `vertex` after appending it
    pub fn get_or_add(&mut self, vertex: &Vertex) -> u32 {
        if let Some(index) = self.find(vertex) {
            return index;
        }

        let index = self.vertices.len() as u32;
        self.vertices.push(*vertex);
        self.buckets
            .entry(PositionKey::quantize(&vertex.position, self.tolerance))
            .or_default()
            .push(index);
        index
    }

    pub fn find(&self, vertex: &Vertex) -> Option<u32> {
        let key = PositionKey::quantize(&vertex.position, self.tolerance);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&key.offset(dx, dy, dz)) else {
                        continue;
                    };
                    if let Some(&index) = bucket
                        .iter()
                        .find(|&&i| self.vertices[i as usize].equals_within(vertex, self.tolerance))
                    {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

impl Default for VertexWelder {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical index per distinct position, used by topology checks that must
/// ignore attribute seams (UV seams, hard edges).
pub fn position_classes(positions: impl Iterator<Item = Point3<f32>>, tolerance: f32) -> Vec<u32> {
    let mut welder = VertexWelder::with_tolerance(tolerance);
    positions
        .map(|position| welder.get_or_add(&Vertex::from_position(position)))
        .collect()
}
