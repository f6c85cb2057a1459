// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed perspective camera and screen-to-world conversion

use crate::utils::math::deg_to_rad;
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width and height in pixels
    pub viewport: [u32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.0, 7.0],
            target: [0.0, 1.0, 6.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 10000.0,
            viewport: [1280, 720],
        }
    }
}

/// Camera with cached matrices.
///
/// Cut gestures are unprojected at a single depth: the NDC depth of the
/// world origin, which is where bodies are spawned.
#[derive(Debug, Clone)]
pub struct Camera {
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    inverse_view_projection: Matrix4<f32>,
    cut_depth: f32,
    viewport: [u32; 2],
}

impl Camera {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>, viewport: [u32; 2]) -> Self {
        let view_projection = projection * view;
        let inverse_view_projection = view_projection
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
        let origin = view_projection * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let cut_depth = if origin.w.abs() > f32::EPSILON {
            origin.z / origin.w
        } else {
            0.0
        };
        Self {
            view,
            projection,
            inverse_view_projection,
            cut_depth,
            viewport,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let [width, height] = config.viewport;
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let view = Matrix4::look_at_rh(
            &Point3::from(config.eye),
            &Point3::from(config.target),
            &Vector3::y(),
        );
        let projection = Matrix4::new_perspective(
            aspect,
            deg_to_rad(config.fov_degrees),
            config.near,
            config.far,
        );
        Self::new(view, projection, config.viewport)
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn cut_depth(&self) -> f32 {
        self.cut_depth
    }

    /// Pixel coordinates (origin top-left) to normalized device coordinates
    pub fn screen_to_ndc(&self, x: f32, y: f32) -> Point2<f32> {
        let [width, height] = self.viewport;
        Point2::new(
            2.0 * x / width.max(1) as f32 - 1.0,
            1.0 - 2.0 * y / height.max(1) as f32,
        )
    }

    /// World point under `ndc` at the cut depth
    pub fn unproject(&self, ndc: &Point2<f32>) -> Point3<f32> {
        let clip = Vector4::new(ndc.x, ndc.y, self.cut_depth, 1.0);
        let world = self.inverse_view_projection * clip;
        if world.w.abs() > f32::EPSILON {
            Point3::new(world.x / world.w, world.y / world.w, world.z / world.w)
        } else {
            Point3::new(world.x, world.y, world.z)
        }
    }

    /// World point to normalized device coordinates
    pub fn project(&self, point: &Point3<f32>) -> Point2<f32> {
        let clip = self.projection * self.view * point.to_homogeneous();
        Point2::new(clip.x / clip.w, clip.y / clip.w)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}
