// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid-body adapter
//!
//! Wraps a rapier world and exposes only what the scene needs: spawning
//! bodies from hull points, swapping a body for its two cut fragments,
//! segment queries and fixed-step advancement. Bodies are addressed by
//! [`BodyHandle`], which stays valid (and detects reuse) no matter how many
//! other bodies are removed.

mod shape;

pub use shape::hull_shape;

use crate::cut::{CutOutcome, Fragment};
use crate::error::PhysicsError;
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use parry3d::query::Ray;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stable, generation-checked identity of a simulated body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl BodyHandle {
    pub fn raw(&self) -> RigidBodyHandle {
        self.0
    }
}

/// Optional static floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundConfig {
    /// Y of the top surface
    pub height: f32,
    pub half_extent: f32,
}

/// Simulation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration along Y
    pub gravity: f32,
    pub fixed_timestep: f32,
    /// Longest frame delta fed to the accumulator; slower frames slow the
    /// simulation down
    pub max_frame_delta: f32,
    /// Upper bound on fixed steps per frame; extra time is dropped
    pub max_substeps: u32,
    pub angular_damping: f32,
    /// Magnitude of the impulse pushing cut fragments apart
    pub cut_impulse: f32,
    /// Offset from the fragment's centre of mass where the separation
    /// impulse lands; X is mirrored for the negative fragment
    pub cut_impulse_offset: [f32; 3],
    pub spawn_mass: f32,
    /// Launch impulse X is uniform in [-launch_impulse_x, launch_impulse_x]
    pub launch_impulse_x: f32,
    pub launch_impulse_y: f32,
    /// Launch impulse is applied at this offset from the centre of mass
    pub launch_offset: [f32; 3],
    pub min_hull_half_extent: f32,
    pub seed: Option<u64>,
    pub ground: Option<GroundConfig>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.82,
            fixed_timestep: 1.0 / 60.0,
            max_frame_delta: 1.0 / 60.0,
            max_substeps: 10,
            angular_damping: 0.9,
            cut_impulse: 0.20,
            cut_impulse_offset: [0.5, 0.5, 0.0],
            spawn_mass: 1.0,
            launch_impulse_x: 2.0,
            launch_impulse_y: 13.0,
            launch_offset: [1.0, 0.0, 0.0],
            min_hull_half_extent: 0.01,
            seed: None,
            ground: None,
        }
    }
}

/// One collider crossed by a segment query
#[derive(Debug, Clone, Copy)]
pub struct SegmentHit {
    pub collider: ColliderHandle,
    /// Fraction of the segment at the first contact, 0 when starting inside
    pub toi: f32,
    pub point: Point3<f32>,
}

/// Dynamics world with fixed-step accumulation
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    accumulator: f32,
    rng: StdRng,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_timestep;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut world = Self {
            gravity: Vector3::new(0.0, config.gravity, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
            rng,
            config,
        };

        if let Some(ground) = world.config.ground.clone() {
            let floor = ColliderBuilder::cuboid(ground.half_extent, 0.1, ground.half_extent)
                .translation(Vector3::new(0.0, ground.height - 0.1, 0.0))
                .build();
            world.colliders.insert(floor);
        }
        world
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Spawn a body at `start` and launch it upwards with a randomized
    /// horizontal component
    pub fn add_body(&mut self, hull: &[Point3<f32>], start: &Point3<f32>) -> BodyHandle {
        let jx = if self.config.launch_impulse_x > 0.0 {
            self.rng
                .gen_range(-self.config.launch_impulse_x..=self.config.launch_impulse_x)
        } else {
            0.0
        };
        let impulse = Vector3::new(jx, self.config.launch_impulse_y, 0.0);

        let handle = self.add_body_with(
            hull,
            Isometry3::translation(start.x, start.y, start.z),
            self.config.spawn_mass,
            Vector3::zeros(),
            Vector3::zeros(),
        );
        if let Some(body) = self.bodies.get_mut(handle.0) {
            let at = body.position() * Point3::from(Vector3::from(self.config.launch_offset));
            body.apply_impulse_at_point(impulse, at, true);
        }
        debug!(?handle, x = start.x, jx, "spawned body");
        handle
    }

    /// Insert a dynamic body with an explicit pose, mass and velocities
    pub fn add_body_with(
        &mut self,
        hull: &[Point3<f32>],
        position: Isometry3<f32>,
        mass: f32,
        linvel: Vector3<f32>,
        angvel: Vector3<f32>,
    ) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(position)
            .linvel(linvel)
            .angvel(angvel)
            .angular_damping(self.config.angular_damping)
            .build();
        let handle = self.bodies.insert(body);

        let shape = hull_shape(hull, self.config.min_hull_half_extent);
        let collider = ColliderBuilder::new(shape).mass(mass.max(f32::EPSILON)).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }
        BodyHandle(handle)
    }

    /// Remove `handle` and insert the two fragments of `outcome` in its place.
    ///
    /// Fragments start at their world centroids with the parent's rotation
    /// and velocities, masses equal to their weights, and an impulse of
    /// `cut_impulse` pushing them apart along the cut normal. The impulse
    /// lands off the centre of mass, so both halves also start to spin.
    /// Returns `(positive, negative)`.
    pub fn replace_body_with_cut(
        &mut self,
        handle: BodyHandle,
        outcome: &CutOutcome,
    ) -> Result<(BodyHandle, BodyHandle), PhysicsError> {
        let parent = self
            .bodies
            .get(handle.0)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        let rotation: UnitQuaternion<f32> = *parent.rotation();
        let linvel = *parent.linvel();
        let angvel = *parent.angvel();

        self.remove_body(handle);

        let push = outcome.normal_world * self.config.cut_impulse;
        let [ox, oy, oz] = self.config.cut_impulse_offset;
        let mut spawn = |fragment: &Fragment, impulse: Vector3<f32>, offset: Vector3<f32>| {
            let position = Isometry3::from_parts(
                Translation3::from(fragment.centroid_world.coords),
                rotation,
            );
            let child = self.add_body_with(&fragment.hull, position, fragment.weight, linvel, angvel);
            if let Some(body) = self.bodies.get_mut(child.0) {
                let at = *body.center_of_mass() + offset;
                body.apply_impulse_at_point(impulse, at, true);
            }
            child
        };

        let positive = spawn(&outcome.positive, push, Vector3::new(ox, oy, oz));
        let negative = spawn(&outcome.negative, -push, Vector3::new(-ox, oy, oz));
        debug!(?handle, ?positive, ?negative, "replaced body with cut fragments");
        Ok((positive, negative))
    }

    /// World transform of a body as a model matrix
    pub fn transform(&self, handle: BodyHandle) -> Option<Matrix4<f32>> {
        self.bodies
            .get(handle.0)
            .map(|body| body.position().to_homogeneous())
    }

    pub fn translation(&self, handle: BodyHandle) -> Option<Point3<f32>> {
        self.bodies
            .get(handle.0)
            .map(|body| Point3::from(*body.translation()))
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(handle.0).map(|body| *body.linvel())
    }

    pub fn angular_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(handle.0).map(|body| *body.angvel())
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(handle.0).map(|body| body.mass())
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Remove a body and its colliders. `false` if it was already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Body owning `collider`, if any
    pub fn find_body(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        self.colliders
            .get(collider)
            .and_then(|c| c.parent())
            .map(BodyHandle)
    }

    /// Every collider the segment `start → end` touches, nearest first
    pub fn cast_segment(&self, start: &Point3<f32>, end: &Point3<f32>) -> Vec<SegmentHit> {
        let direction = end - start;
        if direction.norm_squared() <= f32::EPSILON {
            return Vec::new();
        }
        let ray = Ray::new(*start, direction);

        let mut hits: Vec<SegmentHit> = self
            .colliders
            .iter()
            .filter_map(|(handle, collider)| {
                collider
                    .shape()
                    .cast_ray(collider.position(), &ray, 1.0, true)
                    .map(|toi| SegmentHit {
                        collider: handle,
                        toi,
                        point: ray.point_at(toi),
                    })
            })
            .collect();
        hits.sort_by(|a, b| a.toi.total_cmp(&b.toi));
        hits
    }

    /// Advance by a frame's wall-clock delta using fixed steps.
    ///
    /// The delta is clamped to `max_frame_delta` (one fixed step by default),
    /// so slow frames slow the simulation down rather than exploding the
    /// step count. At most `max_substeps` steps run; time beyond that is
    /// dropped. Returns the number of steps taken.
    pub fn step(&mut self, frame_delta: f32) -> u32 {
        let dt = self.config.fixed_timestep;
        self.accumulator += frame_delta.clamp(0.0, self.config.max_frame_delta.max(0.0));

        let mut steps = 0;
        while self.accumulator >= dt && steps < self.config.max_substeps {
            self.step_once();
            self.accumulator -= dt;
            steps += 1;
        }
        if steps == self.config.max_substeps && self.accumulator >= dt {
            warn!(dropped = self.accumulator, "physics fell behind, dropping time");
            self.accumulator = 0.0;
        }
        steps
    }

    fn step_once(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}
