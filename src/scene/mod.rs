// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene orchestration
//!
//! Owns the live objects (mesh, tint and body handle together), drives the
//! physics world, turns screen-space swipes into cuts and feeds a
//! [`Renderer`]. Mesh and body of an object are always addressed through
//! the same [`BodyHandle`].

pub mod assets;
pub mod camera;
pub mod render;

pub use assets::{AssetLibrary, AssetLoader};
pub use camera::{Camera, CameraConfig};
pub use render::{DrawCall, DrawRecorder, FrameUniforms, Renderer};

use crate::cut::{CutConfig, MeshCutter};
use crate::error::{CutError, SceneError};
use crate::physics::{BodyHandle, PhysicsConfig, PhysicsWorld};
use crate::telemetry::OperationTimer;
use crate::utils::math::deg_to_rad;
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Objects whose body falls below this height are removed
    pub kill_y: f32,
    pub spawn_y: f32,
    /// Spawn X is uniform in [-spawn_x_range, spawn_x_range]
    pub spawn_x_range: f32,
    /// Height of the background plane
    pub background_y: f32,
    pub light_position: [f32; 3],
    pub kd: f32,
    /// Assets spawned round-robin whenever the scene empties
    pub assets: Vec<String>,
    pub seed: Option<u64>,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            kill_y: -8.0,
            spawn_y: -5.9,
            spawn_x_range: 6.0,
            background_y: -6.0,
            light_position: [5.0, 10.0, 10.0],
            kd: 0.8,
            assets: vec!["cube".into(), "sphere".into(), "cylinder".into()],
            seed: None,
            camera: CameraConfig::default(),
        }
    }
}

/// One live object
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub body: BodyHandle,
    /// Geometry in the body's local frame
    pub mesh: crate::geometry::Mesh,
    pub tint: [f32; 3],
}

/// What one simulation step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Fixed physics steps taken
    pub steps: u32,
    /// Objects removed by the kill zone
    pub removed: usize,
}

/// What a cut gesture did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutReport {
    /// Colliders the swipe touched
    pub hits: usize,
    /// Bodies replaced by two fragments
    pub cut: usize,
    /// Hits that resolved to no live object
    pub unresolved: usize,
    /// Bodies the plane touched without producing two non-empty halves
    pub unsplit: usize,
}

pub struct Scene {
    config: SceneConfig,
    camera: Camera,
    physics: PhysicsWorld,
    cutter: MeshCutter,
    loader: Box<dyn AssetLoader>,
    objects: Vec<SceneObject>,
    pending_release: Vec<BodyHandle>,
    rng: StdRng,
}

impl Scene {
    pub fn new(
        config: SceneConfig,
        physics: PhysicsConfig,
        cut: CutConfig,
        loader: Box<dyn AssetLoader>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let physics = PhysicsWorld::new(PhysicsConfig {
            seed: physics.seed.or(config.seed.map(|s| s.wrapping_add(1))),
            ..physics
        });
        Self {
            camera: Camera::from_config(&config.camera),
            physics,
            cutter: MeshCutter::new(cut),
            loader,
            objects: Vec::new(),
            pending_release: Vec::new(),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, body: BodyHandle) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.body == body)
    }

    pub fn mesh_count(&self) -> usize {
        self.objects.len()
    }

    /// Load an asset, give it a random tint and launch it from below the view
    pub fn add_mesh(&mut self, path: &str) -> Result<BodyHandle, SceneError> {
        let mesh = self.loader.load(path)?;
        let hull: Vec<Point3<f32>> = mesh.positions().collect();

        let range = self.config.spawn_x_range.abs();
        let x = if range > 0.0 {
            self.rng.gen_range(-range..=range)
        } else {
            0.0
        };
        let body = self
            .physics
            .add_body(&hull, &Point3::new(x, self.config.spawn_y, 0.0));
        let tint = [self.rng.gen(), self.rng.gen(), self.rng.gen()];

        info!(path, ?body, x, "added mesh");
        self.objects.push(SceneObject { body, mesh, tint });
        Ok(body)
    }

    pub fn all_mesh_removed(&self) -> bool {
        self.objects.is_empty()
    }

    /// Advance physics by one frame, then drop whatever fell out of view
    pub fn simulation_step(&mut self, frame_delta: f32) -> StepReport {
        let steps = self.physics.step(frame_delta);
        let removed = self.reap_fallen();
        StepReport { steps, removed }
    }

    /// Remove objects below the kill height, or whose body is gone
    pub fn reap_fallen(&mut self) -> usize {
        let kill_y = self.config.kill_y;
        let fallen: Vec<BodyHandle> = self
            .objects
            .iter()
            .filter(|o| {
                self.physics
                    .translation(o.body)
                    .map_or(true, |p| p.y < kill_y)
            })
            .map(|o| o.body)
            .collect();

        for &body in &fallen {
            self.physics.remove_body(body);
            self.pending_release.push(body);
            debug!(?body, "removed fallen object");
        }
        self.objects.retain(|o| !fallen.contains(&o.body));
        fallen.len()
    }

    /// Cut every object under the swipe between two NDC points
    pub fn cut(&mut self, start_ndc: &Point2<f32>, end_ndc: &Point2<f32>) -> Result<CutReport, SceneError> {
        let start = self.camera.unproject(start_ndc);
        let end = self.camera.unproject(end_ndc);
        self.cut_world(&start, &end)
    }

    /// Cut every object crossed by a world-space segment
    pub fn cut_world(&mut self, start: &Point3<f32>, end: &Point3<f32>) -> Result<CutReport, SceneError> {
        let _timer = OperationTimer::new("scene_cut");
        let hits = self.physics.cast_segment(start, end);
        let mut report = CutReport {
            hits: hits.len(),
            ..CutReport::default()
        };

        for hit in hits {
            let Some(body) = self.physics.find_body(hit.collider) else {
                warn!(collider = ?hit.collider, "hit collider has no body, skipping");
                report.unresolved += 1;
                continue;
            };
            let Some(index) = self.objects.iter().position(|o| o.body == body) else {
                warn!(?body, "hit body has no scene object, skipping");
                report.unresolved += 1;
                continue;
            };
            let Some(model) = self.physics.transform(body) else {
                report.unresolved += 1;
                continue;
            };

            let outcome = match self.cutter.cut(&self.objects[index].mesh, start, end, &model) {
                Ok(outcome) => outcome,
                Err(CutError::DegenerateSegment) => {
                    debug!(?body, "swipe has no extent in the object's plane");
                    report.unsplit += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if !outcome.is_split() {
                report.unsplit += 1;
                continue;
            }

            let (positive, negative) = self.physics.replace_body_with_cut(body, &outcome)?;
            let tint = self.objects[index].tint;
            self.objects[index] = SceneObject {
                body: positive,
                mesh: outcome.positive.mesh,
                tint,
            };
            self.objects.insert(
                index + 1,
                SceneObject {
                    body: negative,
                    mesh: outcome.negative.mesh,
                    tint,
                },
            );
            self.pending_release.push(body);
            report.cut += 1;
        }

        if report.cut > 0 {
            info!(cut = report.cut, hits = report.hits, "cut applied");
        }
        Ok(report)
    }

    /// Background plane model: lowered, laid flat and stretched
    pub fn background_model(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(0.0, self.config.background_y, 0.0))
            * Matrix4::new_rotation(Vector3::x() * deg_to_rad(90.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(10.0, 10.0, 1.0))
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            view: *self.camera.view(),
            projection: *self.camera.projection(),
            light_position: Point3::from(self.config.light_position),
            kd: self.config.kd,
        }
    }

    /// Release resources of removed objects, then draw background and objects
    pub fn draw_scene(&mut self, renderer: &mut dyn Renderer, wireframe: bool) {
        for body in self.pending_release.drain(..) {
            renderer.release(body);
        }

        renderer.begin_frame(&self.frame_uniforms());
        renderer.draw_background(&self.background_model());
        for object in &self.objects {
            let Some(model) = self.physics.transform(object.body) else {
                continue;
            };
            renderer.draw_mesh(object.body, &object.mesh, &model, object.tint, wireframe);
        }
    }

    /// Remove every object
    pub fn clear(&mut self) {
        for object in self.objects.drain(..) {
            self.physics.remove_body(object.body);
            self.pending_release.push(object.body);
        }
    }
}
