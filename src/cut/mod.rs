// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh cut engine
//!
//! Splits a closed triangle mesh by a plane into two closed fragments. Each
//! fragment is recentred on its area-weighted centroid, carries the point set
//! for its collision hull and a mass weight proportional to the share of the
//! original surface it kept.

mod cap;
mod split;

use crate::error::CutError;
use crate::geometry::weld::position_classes;
use crate::geometry::{CutPlane, Mesh, Side, TextureRef, VERTEX_EPSILON};
use crate::telemetry::OperationTimer;
use crate::utils::math::{clamp, triangle_area, triangle_centroid};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use split::{centroid_divisor, SideBuilder, SplitPair, TriangleRouter};
use tracing::debug;

/// Tolerances and policies of the cut engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Vertices closer than this to the plane count as lying on it
    pub plane_epsilon: f32,
    /// Fragments whose total area is at or below this skip the centroid division
    pub degenerate_area: f32,
    /// Lower clamp for a fragment's mass weight
    pub min_weight: f32,
    /// Close the cut faces of both fragments
    pub cap: bool,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            plane_epsilon: 2.0e-3,
            degenerate_area: 0.09,
            min_weight: 0.01,
            cap: true,
        }
    }
}

/// One side of a cut
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Geometry recentred so the centroid sits at the origin
    pub mesh: Mesh,
    /// Centroid in the source mesh's local frame
    pub centroid_local: Point3<f32>,
    /// Centroid transformed by the source model matrix
    pub centroid_world: Point3<f32>,
    /// Distinct vertex positions of the recentred mesh
    pub hull: Vec<Point3<f32>>,
    /// Share of the parent's mass, in (0, 1]
    pub weight: f32,
    /// Area inherited from the source surface
    pub surface_area: f32,
    /// Area of the synthesized cap
    pub cap_area: f32,
    pub cap_triangles: usize,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

/// Result of cutting one mesh
#[derive(Debug, Clone)]
pub struct CutOutcome {
    pub positive: Fragment,
    pub negative: Fragment,
    /// Object-space plane the mesh was cut with
    pub plane: CutPlane,
    /// Plane normal in world space, the direction fragments are pushed apart
    pub normal_world: Vector3<f32>,
    /// Triangles that straddled the plane
    pub split_triangles: usize,
}

impl CutOutcome {
    /// Both fragments received geometry
    pub fn is_split(&self) -> bool {
        !self.positive.is_empty() && !self.negative.is_empty()
    }
}

/// Stateless cutter; holds only its configuration
#[derive(Debug, Clone, Default)]
pub struct MeshCutter {
    config: CutConfig,
}

impl MeshCutter {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    /// Cut `mesh` (placed by `model`) along the world-space swipe `start → end`
    pub fn cut(
        &self,
        mesh: &Mesh,
        cut_start: &Point3<f32>,
        cut_end: &Point3<f32>,
        model: &Matrix4<f32>,
    ) -> Result<CutOutcome, CutError> {
        let plane = CutPlane::from_world_segment(cut_start, cut_end, model)?;
        self.cut_with_plane(mesh, &plane, model)
    }

    /// Cut with a plane already expressed in the mesh's local frame
    pub fn cut_with_plane(
        &self,
        mesh: &Mesh,
        plane: &CutPlane,
        model: &Matrix4<f32>,
    ) -> Result<CutOutcome, CutError> {
        mesh.validate()?;
        let timer = OperationTimer::with_context("mesh_cut", mesh.triangle_count(), mesh.vertex_count());
        let epsilon = self.config.plane_epsilon;

        let (mut positive, mut negative, split_triangles) =
            match mesh.bounding_box().side_of(plane, epsilon) {
                Some(side) => {
                    let (whole, empty) = (self.whole_fragment(mesh, model), self.empty_fragment(model));
                    match side {
                        Side::Negative => (empty, whole, 0),
                        _ => (whole, empty, 0),
                    }
                }
                None => self.split(mesh, plane, model),
            };

        assign_weights(&mut positive, &mut negative, self.config.min_weight);

        let outcome = CutOutcome {
            positive,
            negative,
            plane: *plane,
            normal_world: plane.world_normal(model),
            split_triangles,
        };

        let elapsed_ms = timer.finish();
        debug!(
            split_triangles,
            positive_triangles = outcome.positive.mesh.triangle_count(),
            negative_triangles = outcome.negative.mesh.triangle_count(),
            positive_weight = outcome.positive.weight,
            elapsed_ms,
            "mesh cut"
        );
        Ok(outcome)
    }

    fn split(&self, mesh: &Mesh, plane: &CutPlane, model: &Matrix4<f32>) -> (Fragment, Fragment, usize) {
        let mut router = TriangleRouter::new(mesh, plane, self.config.plane_epsilon);
        let mut pair = SplitPair::new();
        let mut split_triangles = 0;

        for tri in mesh.triangles() {
            if router.route(tri, &mut pair) {
                split_triangles += 1;
            }
        }

        let SplitPair {
            mut positive,
            mut negative,
        } = pair;
        let (mut positive_caps, mut negative_caps) = (0, 0);
        if self.config.cap {
            let points = router.seam_points();
            if !positive.is_empty() {
                positive_caps = cap::build_cap(&mut positive, plane, points, -plane.normal);
            }
            if !negative.is_empty() {
                negative_caps = cap::build_cap(&mut negative, plane, points, plane.normal);
            }
        }

        (
            self.finish_side(positive, positive_caps, &mesh.textures, model),
            self.finish_side(negative, negative_caps, &mesh.textures, model),
            split_triangles,
        )
    }

    fn finish_side(
        &self,
        side: SideBuilder,
        cap_triangles: usize,
        textures: &[TextureRef],
        model: &Matrix4<f32>,
    ) -> Fragment {
        let centroid_local = side.centroid(self.config.degenerate_area);
        let (surface_area, cap_area) = (side.surface_area, side.cap_area);
        let mut mesh = side.into_mesh(textures);
        if mesh.is_empty() {
            return self.empty_fragment(model);
        }
        mesh.translate(&-centroid_local.coords);

        Fragment {
            hull: hull_points(&mesh),
            mesh,
            centroid_local,
            centroid_world: model.transform_point(&centroid_local),
            weight: 0.0,
            surface_area,
            cap_area,
            cap_triangles,
        }
    }

    /// The plane missed: the whole mesh becomes one fragment without
    /// touching the splitting path
    fn whole_fragment(&self, mesh: &Mesh, model: &Matrix4<f32>) -> Fragment {
        let mut surface_area = 0.0;
        let mut weighted = Vector3::zeros();
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(t);
            let area = triangle_area(&a, &b, &c);
            surface_area += area;
            weighted += triangle_centroid(&a, &b, &c).coords * area;
        }
        let centroid_local =
            Point3::from(weighted / centroid_divisor(surface_area, self.config.degenerate_area));

        let mut whole = mesh.clone();
        whole.translate(&-centroid_local.coords);
        Fragment {
            hull: hull_points(&whole),
            mesh: whole,
            centroid_local,
            centroid_world: model.transform_point(&centroid_local),
            weight: 0.0,
            surface_area,
            cap_area: 0.0,
            cap_triangles: 0,
        }
    }

    fn empty_fragment(&self, model: &Matrix4<f32>) -> Fragment {
        Fragment {
            mesh: Mesh::new(),
            centroid_local: Point3::origin(),
            centroid_world: model.transform_point(&Point3::origin()),
            hull: Vec::new(),
            weight: 0.0,
            surface_area: 0.0,
            cap_area: 0.0,
            cap_triangles: 0,
        }
    }
}

/// Mass split proportional to kept surface area, clamped away from zero
fn assign_weights(positive: &mut Fragment, negative: &mut Fragment, min_weight: f32) {
    let total = positive.surface_area + negative.surface_area;
    let weight = if total > 0.0 {
        clamp(positive.surface_area / total, min_weight, 1.0 - min_weight)
    } else {
        0.5
    };
    positive.weight = weight;
    negative.weight = 1.0 - weight;
}

fn hull_points(mesh: &Mesh) -> Vec<Point3<f32>> {
    let classes = position_classes(mesh.positions(), VERTEX_EPSILON);
    let mut hull = Vec::new();
    for (class, position) in classes.into_iter().zip(mesh.positions()) {
        if class as usize == hull.len() {
            hull.push(position);
        }
    }
    hull
}
