// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::geometry::{Mesh, Vertex};
use crate::utils::math::{normalize_or, triangle_cross};
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector2, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use stl_io::{Normal, Triangle};

/// Export a mesh as binary STL with per-facet normals
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let triangles: Vec<Triangle> = (0..mesh.triangle_count())
        .map(|t| {
            let [a, b, c] = mesh.triangle_positions(t);
            let n = normalize_or(&triangle_cross(&a, &b, &c), Vector3::z());
            Triangle {
                normal: Normal::new([n.x, n.y, n.z]),
                vertices: [a, b, c].map(|p| stl_io::Vertex::new([p.x, p.y, p.z])),
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter())
        .with_context(|| format!("Failed to write STL to {:?}", path))?;
    Ok(())
}

/// Read an STL file into a welded mesh with flat facet normals
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let indexed = stl_io::read_stl(&mut reader)
        .with_context(|| format!("Failed to parse STL {:?}", path))?;

    let mut mesh = Mesh::with_capacity(indexed.faces.len() * 3, indexed.faces.len());
    for face in &indexed.faces {
        let corners = face.vertices.map(|i| {
            let v = indexed.vertices[i];
            Point3::new(v[0], v[1], v[2])
        });
        let stored = Vector3::new(face.normal[0], face.normal[1], face.normal[2]);
        let computed = triangle_cross(&corners[0], &corners[1], &corners[2]);
        let normal = normalize_or(&stored, normalize_or(&computed, Vector3::z()));

        let tri = corners.map(|p| {
            let mut vertex = Vertex::with_position_normal(p, normal);
            vertex.tex_coords = Vector2::new(p.x, p.y);
            mesh.add_vertex(vertex)
        });
        mesh.add_triangle(tri);
    }
    mesh.weld();
    mesh.validate()?;
    Ok(mesh)
}
