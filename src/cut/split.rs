// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle classification and splitting against a cut plane
//!
//! Output vertices are never matched by distance. Source vertices keep
//! their identity through their index, every crossing vertex is cached by
//! the source edge it lies on, and seam points are identified by the
//! position class (or pair of classes) they come from. Neighbouring
//! triangles therefore agree exactly on the seam no matter how close two
//! crossings end up.

use super::cap::SeamEdges;
use crate::geometry::weld::position_classes;
use crate::geometry::{CutPlane, Mesh, Side, TextureRef, Vertex, VERTEX_EPSILON};
use crate::utils::math::{triangle_area, triangle_centroid, triangle_cross};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Undirected source edge, smaller index first
type EdgeKey = (u32, u32);

fn edge_key(a: u32, b: u32) -> EdgeKey {
    (a.min(b), a.max(b))
}

/// Accumulates the triangles routed to one side of the plane
pub(crate) struct SideBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    /// Output index of each source vertex already emitted on this side
    sources: AHashMap<u32, u32>,
    /// Output index of each crossing vertex, by source edge
    crossings: AHashMap<EdgeKey, u32>,
    /// Area of triangles taken from the source surface
    pub surface_area: f32,
    /// Area of synthesized cap triangles
    pub cap_area: f32,
    /// Sum of area * triangle centroid over all triangles
    weighted_centroid: Vector3<f32>,
    pub seam: SeamEdges,
}

impl SideBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            sources: AHashMap::new(),
            crossings: AHashMap::new(),
            surface_area: 0.0,
            cap_area: 0.0,
            weighted_centroid: Vector3::zeros(),
            seam: SeamEdges::new(),
        }
    }

    /// Output index of source vertex `index`, emitting it on first use
    pub fn source_vertex(&mut self, index: u32, vertex: &Vertex) -> u32 {
        let next = self.vertices.len() as u32;
        let out = *self.sources.entry(index).or_insert(next);
        if out == next {
            self.vertices.push(*vertex);
        }
        out
    }

    /// Output index of the crossing on source edge `edge`
    fn crossing_vertex(&mut self, crossing: &Crossing) -> u32 {
        let next = self.vertices.len() as u32;
        let out = *self.crossings.entry(crossing.edge).or_insert(next);
        if out == next {
            self.vertices.push(crossing.vertex);
        }
        out
    }

    /// Append a vertex that belongs to no source element (cap vertices)
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn position(&self, index: u32) -> Point3<f32> {
        self.vertices[index as usize].position
    }

    pub fn push_triangle(&mut self, tri: [u32; 3]) {
        let area = self.accumulate(tri);
        self.surface_area += area;
        self.indices.extend_from_slice(&tri);
    }

    pub fn push_cap_triangle(&mut self, tri: [u32; 3]) {
        let area = self.accumulate(tri);
        self.cap_area += area;
        self.indices.extend_from_slice(&tri);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn total_area(&self) -> f32 {
        self.surface_area + self.cap_area
    }

    /// Area-weighted centroid. Totals at or below `degenerate_area` divide
    /// by one instead of the area.
    pub fn centroid(&self, degenerate_area: f32) -> Point3<f32> {
        Point3::from(self.weighted_centroid / centroid_divisor(self.total_area(), degenerate_area))
    }

    pub fn into_mesh(self, textures: &[TextureRef]) -> Mesh {
        Mesh {
            vertices: self.vertices,
            indices: self.indices,
            textures: textures.to_vec(),
        }
    }

    fn accumulate(&mut self, tri: [u32; 3]) -> f32 {
        let [a, b, c] = tri.map(|i| self.position(i));
        let area = triangle_area(&a, &b, &c);
        self.weighted_centroid += triangle_centroid(&a, &b, &c).coords * area;
        area
    }
}

/// Both sides of a cut in progress
pub(crate) struct SplitPair {
    pub positive: SideBuilder,
    pub negative: SideBuilder,
}

impl SplitPair {
    pub fn new() -> Self {
        Self {
            positive: SideBuilder::new(),
            negative: SideBuilder::new(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideBuilder {
        match side {
            Side::Negative => &mut self.negative,
            Side::Positive | Side::On => &mut self.positive,
        }
    }
}

/// Vertex synthesized where a source edge crosses the plane
#[derive(Debug, Clone, Copy)]
struct Crossing {
    edge: EdgeKey,
    /// Seam point id shared by every edge between the same two positions
    seam_id: u32,
    vertex: Vertex,
}

/// Routes the triangles of one mesh into a [`SplitPair`]
pub(crate) struct TriangleRouter<'a> {
    plane: &'a CutPlane,
    /// Source vertices, positions snapped to their class representative
    vertices: Vec<Vertex>,
    classes: Vec<u32>,
    sides: Vec<Side>,
    /// Position of every seam point id; the first ids are the position classes
    seam_points: Vec<Point3<f32>>,
    seam_ids: AHashMap<EdgeKey, u32>,
    crossings: AHashMap<EdgeKey, Crossing>,
}

impl<'a> TriangleRouter<'a> {
    pub fn new(mesh: &Mesh, plane: &'a CutPlane, epsilon: f32) -> Self {
        let classes = position_classes(mesh.positions(), VERTEX_EPSILON);
        let mut seam_points: Vec<Point3<f32>> = Vec::new();
        for (&class, position) in classes.iter().zip(mesh.positions()) {
            if class as usize == seam_points.len() {
                seam_points.push(position);
            }
        }

        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .zip(&classes)
            .map(|(v, &class)| Vertex {
                position: seam_points[class as usize],
                ..*v
            })
            .collect();
        let sides = vertices
            .iter()
            .map(|v| plane.classify_vertex(v, epsilon))
            .collect();

        Self {
            plane,
            vertices,
            classes,
            sides,
            seam_points,
            seam_ids: AHashMap::new(),
            crossings: AHashMap::new(),
        }
    }

    pub fn seam_points(&self) -> &[Point3<f32>] {
        &self.seam_points
    }

    /// Route one triangle. Returns `true` when it had to be split.
    pub fn route(&mut self, tri: [u32; 3], out: &mut SplitPair) -> bool {
        let sides = tri.map(|i| self.sides[i as usize]);

        if !self.straddles(tri, &sides) {
            let side = self.whole_triangle_side(tri, &sides);
            let builder = out.side_mut(side);
            let emitted = tri.map(|i| builder.source_vertex(i, &self.vertices[i as usize]));
            builder.push_triangle(emitted);
            for i in 0..3 {
                let j = (i + 1) % 3;
                if sides[i] == Side::On && sides[j] == Side::On {
                    builder
                        .seam
                        .add(self.classes[tri[i] as usize], self.classes[tri[j] as usize]);
                }
            }
            return false;
        }

        match sides.iter().position(|&s| s == Side::On) {
            Some(k) => self.split_through_vertex(rotate(&tri, k), rotate(&sides, k), out),
            None => {
                // The lone vertex is the one whose side nobody else shares
                let k = (0..3)
                    .find(|&i| sides[(i + 1) % 3] == sides[(i + 2) % 3])
                    .unwrap_or(0);
                self.split_lone_vertex(rotate(&tri, k), rotate(&sides, k), out);
            }
        }
        true
    }

    fn position(&self, index: u32) -> Point3<f32> {
        self.vertices[index as usize].position
    }

    /// A triangle needs splitting when some edge has a crossing factor
    /// strictly inside (0, 1) between two vertices on opposite sides.
    fn straddles(&self, tri: [u32; 3], sides: &[Side; 3]) -> bool {
        (0..3).any(|i| {
            let j = (i + 1) % 3;
            let opposite = matches!(
                (sides[i], sides[j]),
                (Side::Positive, Side::Negative) | (Side::Negative, Side::Positive)
            );
            opposite
                && self
                    .plane
                    .edge_crossing(&self.position(tri[i]), &self.position(tri[j]))
                    .is_some_and(|t| t > 0.0 && t < 1.0)
        })
    }

    /// Side of a triangle that is not split: its signed vertices decide, and
    /// a triangle lying in the plane goes to the side its face points away from.
    fn whole_triangle_side(&self, tri: [u32; 3], sides: &[Side; 3]) -> Side {
        let positive = sides.iter().filter(|&&s| s == Side::Positive).count();
        let negative = sides.iter().filter(|&&s| s == Side::Negative).count();
        if positive > negative {
            Side::Positive
        } else if negative > positive {
            Side::Negative
        } else {
            let [a, b, c] = tri.map(|i| self.position(i));
            if triangle_cross(&a, &b, &c).dot(&self.plane.normal) > 0.0 {
                Side::Negative
            } else {
                Side::Positive
            }
        }
    }

    /// No vertex on the plane: `a` alone on one side, `b` and `c` on the other
    fn split_lone_vertex(&mut self, [a, b, c]: [u32; 3], sides: [Side; 3], out: &mut SplitPair) {
        let ab = self.crossing(a, b);
        let ac = self.crossing(a, c);

        let lone = out.side_mut(sides[0]);
        let a_out = lone.source_vertex(a, &self.vertices[a as usize]);
        let (ab_out, ac_out) = (lone.crossing_vertex(&ab), lone.crossing_vertex(&ac));
        lone.push_triangle([a_out, ab_out, ac_out]);
        lone.seam.add(ab.seam_id, ac.seam_id);

        let rest = out.side_mut(sides[1]);
        let b_out = rest.source_vertex(b, &self.vertices[b as usize]);
        let c_out = rest.source_vertex(c, &self.vertices[c as usize]);
        let (ab_out, ac_out) = (rest.crossing_vertex(&ab), rest.crossing_vertex(&ac));
        rest.push_triangle([ab_out, b_out, c_out]);
        rest.push_triangle([ab_out, c_out, ac_out]);
        rest.seam.add(ac.seam_id, ab.seam_id);
    }

    /// `o` on the plane, `p` and `q` on opposite sides
    fn split_through_vertex(&mut self, [o, p, q]: [u32; 3], sides: [Side; 3], out: &mut SplitPair) {
        let x = self.crossing(p, q);
        let o_seam = self.classes[o as usize];

        let first = out.side_mut(sides[1]);
        let o_out = first.source_vertex(o, &self.vertices[o as usize]);
        let p_out = first.source_vertex(p, &self.vertices[p as usize]);
        let x_out = first.crossing_vertex(&x);
        first.push_triangle([o_out, p_out, x_out]);
        first.seam.add(x.seam_id, o_seam);

        let second = out.side_mut(sides[2]);
        let o_out = second.source_vertex(o, &self.vertices[o as usize]);
        let q_out = second.source_vertex(q, &self.vertices[q as usize]);
        let x_out = second.crossing_vertex(&x);
        second.push_triangle([o_out, x_out, q_out]);
        second.seam.add(o_seam, x.seam_id);
    }

    /// Crossing on the source edge between `a` and `b`, computed once per edge.
    /// Interpolation always runs from the positive endpoint, so every edge
    /// between the same two positions yields a bit-identical seam position.
    fn crossing(&mut self, a: u32, b: u32) -> Crossing {
        let edge = edge_key(a, b);
        if let Some(crossing) = self.crossings.get(&edge) {
            return *crossing;
        }

        let (from, to) = if self.sides[a as usize] == Side::Positive {
            (a, b)
        } else {
            (b, a)
        };
        let (from, to) = (&self.vertices[from as usize], &self.vertices[to as usize]);
        let t = self
            .plane
            .edge_crossing(&from.position, &to.position)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);
        let vertex = from.lerp(to, t);

        let next = self.seam_points.len() as u32;
        let classes = edge_key(self.classes[a as usize], self.classes[b as usize]);
        let seam_id = *self.seam_ids.entry(classes).or_insert(next);
        if seam_id == next {
            self.seam_points.push(vertex.position);
        }

        let crossing = Crossing {
            edge,
            seam_id,
            vertex,
        };
        self.crossings.insert(edge, crossing);
        crossing
    }
}

pub(crate) fn centroid_divisor(total_area: f32, degenerate_area: f32) -> f32 {
    if total_area <= degenerate_area {
        1.0
    } else {
        total_area
    }
}

fn rotate<T: Copy>(items: &[T; 3], k: usize) -> [T; 3] {
    [items[k % 3], items[(k + 1) % 3], items[(k + 2) % 3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::with_position_normal(Point3::new(x, y, z), Vector3::z())
    }

    fn x_plane() -> CutPlane {
        CutPlane {
            point: Point3::origin(),
            normal: Vector3::x(),
        }
    }

    fn single(corners: [Vertex; 3]) -> Mesh {
        let mut mesh = Mesh::new();
        let tri = corners.map(|v| mesh.add_vertex(v));
        mesh.add_triangle(tri);
        mesh
    }

    fn route_all(mesh: &Mesh, plane: &CutPlane) -> (SplitPair, usize) {
        let mut router = TriangleRouter::new(mesh, plane, 1e-3);
        let mut out = SplitPair::new();
        let split = mesh.triangles().filter(|&tri| router.route(tri, &mut out)).count();
        (out, split)
    }

    #[test]
    fn test_lone_vertex_split_gives_three_triangles() {
        let mesh = single([vertex(1.0, 0.0, 0.0), vertex(-1.0, 1.0, 0.0), vertex(-1.0, -1.0, 0.0)]);
        let (out, split) = route_all(&mesh, &x_plane());

        assert_eq!(split, 1);
        assert_eq!(out.positive.triangle_count(), 1);
        assert_eq!(out.negative.triangle_count(), 2);

        // The pieces add up to the original area of 2
        assert_relative_eq!(
            out.positive.surface_area + out.negative.surface_area,
            2.0,
            epsilon = 1e-5
        );
        assert_relative_eq!(out.positive.surface_area, 0.5, epsilon = 1e-5);

        assert_eq!(out.positive.seam.open_edges().len(), 1);
        assert_eq!(out.negative.seam.open_edges().len(), 1);
    }

    #[test]
    fn test_split_preserves_winding() {
        let tri = [vertex(2.0, 0.0, 0.0), vertex(-1.0, 1.0, 0.0), vertex(-1.0, -1.0, 0.0)];
        let facing = triangle_cross(&tri[0].position, &tri[1].position, &tri[2].position);
        let (out, _) = route_all(&single(tri), &x_plane());

        for side in [out.positive, out.negative] {
            let mesh = side.into_mesh(&[]);
            for t in 0..mesh.triangle_count() {
                let [a, b, c] = mesh.triangle_positions(t);
                assert!(triangle_cross(&a, &b, &c).dot(&facing) > 0.0);
            }
        }
    }

    #[test]
    fn test_split_through_vertex_gives_two_triangles() {
        let mesh = single([vertex(0.0, 1.0, 0.0), vertex(1.0, -1.0, 0.0), vertex(-1.0, -1.0, 0.0)]);
        let (out, _) = route_all(&mesh, &x_plane());

        assert_eq!(out.positive.triangle_count(), 1);
        assert_eq!(out.negative.triangle_count(), 1);
        assert_relative_eq!(out.positive.surface_area, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_touching_triangle_is_not_split() {
        // One vertex within tolerance of the plane, the others positive
        let mesh = single([vertex(0.0005, 0.0, 0.0), vertex(1.0, 1.0, 0.0), vertex(1.0, -1.0, 0.0)]);
        let (out, split) = route_all(&mesh, &x_plane());

        assert_eq!(split, 0);
        assert!(out.negative.is_empty());
        assert_eq!(out.positive.triangle_count(), 1);
    }

    #[test]
    fn test_coplanar_triangle_follows_its_face() {
        // Lies in x = 0, facing +x
        let mesh = single([vertex(0.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0), vertex(0.0, 0.0, 1.0)]);
        let (out, _) = route_all(&mesh, &x_plane());

        assert!(out.positive.is_empty());
        assert!(!out.negative.is_empty());
        assert_eq!(out.negative.seam.open_edges().len(), 3);
    }

    #[test]
    fn test_shared_edge_reuses_one_crossing() {
        // Two triangles sharing the edge (0, 1), which crosses the plane
        let mut mesh = Mesh::new();
        for v in [
            vertex(1.0, 0.0, 0.0),
            vertex(-1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(0.0, -1.0, 0.0),
        ] {
            mesh.add_vertex(v);
        }
        mesh.add_triangle([0, 1, 2]);
        mesh.add_triangle([1, 0, 3]);

        let (out, split) = route_all(&mesh, &x_plane());
        assert_eq!(split, 2);
        // Source vertex 0 plus the single crossing on edge (0, 1)
        let positive = out.positive.into_mesh(&[]);
        assert_eq!(positive.vertex_count(), 2 + 2);
        assert_eq!(positive.triangle_count(), 2);
    }

    #[test]
    fn test_close_crossings_stay_distinct() {
        // Fan around a hub just outside the tolerance band: the crossings of
        // neighbouring spokes are far closer together than the weld tolerance
        let mut mesh = Mesh::new();
        mesh.add_vertex(vertex(0.0011, 0.0, 0.0));
        for y in [-0.6, -0.2, 0.2, 0.6] {
            mesh.add_vertex(vertex(-1.0, y, 0.0));
        }
        for k in 1..4 {
            mesh.add_triangle([0, k, k + 1]);
        }

        let (out, split) = route_all(&mesh, &x_plane());
        assert_eq!(split, 3);
        assert_eq!(out.positive.seam.open_edges().len(), 3);

        // Hub plus four crossings about 4e-4 apart
        let positive = out.positive.into_mesh(&[]);
        assert_eq!(positive.triangle_count(), 3);
        assert_eq!(positive.vertex_count(), 5);
    }

    #[test]
    fn test_degenerate_centroid_divides_by_one() {
        let mut side = SideBuilder::new();
        let tri = [vertex(0.0, 0.0, 0.0), vertex(0.1, 0.0, 0.0), vertex(0.0, 0.1, 0.0)]
            .map(|v| side.add_vertex(v));
        side.push_triangle(tri);
        let area = side.total_area();
        assert!(area < 0.09);
        let centroid = side.centroid(0.09);
        assert_relative_eq!(centroid.x, area * 0.1 / 3.0, epsilon = 1e-7);
    }
}
