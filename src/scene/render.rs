// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Drawing interface
//!
//! The scene never talks to a graphics API. It hands meshes and model
//! matrices to a [`Renderer`], and tells it when the GPU resources of a
//! removed body can be released.

use crate::geometry::Mesh;
use crate::physics::BodyHandle;
use nalgebra::{Matrix4, Point3};

/// Per-frame shading inputs
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub light_position: Point3<f32>,
    /// Diffuse reflection coefficient
    pub kd: f32,
}

pub trait Renderer {
    fn begin_frame(&mut self, _uniforms: &FrameUniforms) {}

    fn draw_background(&mut self, model: &Matrix4<f32>);

    fn draw_mesh(
        &mut self,
        body: BodyHandle,
        mesh: &Mesh,
        model: &Matrix4<f32>,
        tint: [f32; 3],
        wireframe: bool,
    );

    /// Live feedback while a cut gesture is in progress
    fn draw_cut_indicator(&mut self, _start: &Point3<f32>, _end: &Point3<f32>) {}

    /// Free whatever was uploaded for `body`
    fn release(&mut self, body: BodyHandle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Background,
    Mesh {
        body: BodyHandle,
        triangles: usize,
        model: Matrix4<f32>,
        tint: [f32; 3],
        wireframe: bool,
    },
    Indicator {
        start: Point3<f32>,
        end: Point3<f32>,
    },
}

/// Headless renderer that records what would have been drawn
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub frames: usize,
    pub calls: Vec<DrawCall>,
    pub released: Vec<BodyHandle>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Mesh { .. }))
            .count()
    }

    pub fn triangles_drawn(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Mesh { triangles, .. } => *triangles,
                _ => 0,
            })
            .sum()
    }
}

impl Renderer for DrawRecorder {
    fn begin_frame(&mut self, _uniforms: &FrameUniforms) {
        self.frames += 1;
        self.calls.clear();
    }

    fn draw_background(&mut self, _model: &Matrix4<f32>) {
        self.calls.push(DrawCall::Background);
    }

    fn draw_mesh(
        &mut self,
        body: BodyHandle,
        mesh: &Mesh,
        model: &Matrix4<f32>,
        tint: [f32; 3],
        wireframe: bool,
    ) {
        self.calls.push(DrawCall::Mesh {
            body,
            triangles: mesh.triangle_count(),
            model: *model,
            tint,
            wireframe,
        });
    }

    fn draw_cut_indicator(&mut self, start: &Point3<f32>, end: &Point3<f32>) {
        self.calls.push(DrawCall::Indicator {
            start: *start,
            end: *end,
        });
    }

    fn release(&mut self, body: BodyHandle) {
        self.released.push(body);
    }
}
