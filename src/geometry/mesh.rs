// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed triangle mesh

use super::weld::VertexWelder;
use super::{BoundingBox, Vertex};
use crate::error::GeometryError;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Texture bound to a mesh. Fragments of a cut inherit their parent's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    pub id: u32,
    pub kind: String,
    pub path: String,
}

/// Triangular mesh: every 3 consecutive indices form one triangle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<TextureRef>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(triangle_count * 3),
            textures: Vec::new(),
        }
    }

    /// Build a mesh from raw buffers, rejecting malformed index data
    pub fn from_buffers(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<TextureRef>,
    ) -> Result<Self, GeometryError> {
        let mesh = Self {
            vertices,
            indices,
            textures,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::IndexCountNotTriangles(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &i)| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                triangle: position / 3,
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.indices.extend_from_slice(&triangle);
    }

    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [
            self.indices[3 * t],
            self.indices[3 * t + 1],
            self.indices[3 * t + 2],
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Corner positions of triangle `t`
    pub fn triangle_positions(&self, t: usize) -> [Point3<f32>; 3] {
        self.triangle(t).map(|i| self.vertices[i as usize].position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// No triangles means nothing to draw or simulate
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for vertex in &mut self.vertices {
            vertex.translate(offset);
        }
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f32>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Merge vertices equal within tolerance and drop triangles that collapse.
    /// Returns the number of vertices removed.
    pub fn weld(&mut self) -> usize {
        let before = self.vertices.len();
        let mut welder = VertexWelder::new();
        let remap: Vec<u32> = self.vertices.iter().map(|v| welder.get_or_add(v)).collect();

        let mut indices = Vec::with_capacity(self.indices.len());
        for [a, b, c] in self.triangles() {
            let tri = [remap[a as usize], remap[b as usize], remap[c as usize]];
            if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
                indices.extend_from_slice(&tri);
            }
        }

        self.vertices = welder.into_vertices();
        self.indices = indices;
        before - self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.add_vertex(Vertex::with_position_normal(Point3::new(x, y, 0.0), Vector3::z()));
        }
        mesh.add_triangle([0, 1, 2]);
        mesh.add_triangle([0, 2, 3]);
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_from_buffers_rejects_bad_indices() {
        let mesh = quad();
        let err = Mesh::from_buffers(mesh.vertices.clone(), vec![0, 1], Vec::new()).unwrap_err();
        assert_eq!(err, GeometryError::IndexCountNotTriangles(2));

        let err = Mesh::from_buffers(mesh.vertices.clone(), vec![0, 1, 2, 0, 2, 7], Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { triangle: 1, index: 7, .. }
        ));
    }

    #[test]
    fn test_weld_removes_duplicates() {
        let mut mesh = quad();
        // Duplicate corner 2 and point the second triangle at the copy
        let copy = mesh.vertices[2];
        let dup = mesh.add_vertex(copy);
        mesh.indices[4] = dup;

        let removed = mesh.weld();
        assert_eq!(removed, 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_translate_moves_bounds() {
        let mut mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        mesh.translate(&Vector3::new(1.0, 0.0, 0.0));
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min.x, 0.0);
        assert_eq!(bbox.max.x, 2.0);
    }
}
