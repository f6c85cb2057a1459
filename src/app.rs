// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Application loop
//!
//! [`ApplicationState`] owns the scene and the input state. A host (window
//! shell, CLI, test) feeds it [`InputEvent`]s and calls [`ApplicationState::frame`]
//! once per displayed frame. Within a frame the order is fixed: spawn,
//! physics step, kill-zone reap, cut gesture, draw.

use crate::config::KatanaConfig;
use crate::error::SceneError;
use crate::physics::BodyHandle;
use crate::scene::{AssetLoader, CutReport, Renderer, Scene};
use nalgebra::Point2;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Wireframe,
    Pause,
}

/// Pointer positions are in NDC
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press(Point2<f32>),
    Move(Point2<f32>),
    Release(Point2<f32>),
    Key(Key),
}

/// Progress of the current cut gesture
#[derive(Debug, Clone, Default)]
pub struct InputState {
    start: Option<Point2<f32>>,
    cursor: Option<Point2<f32>>,
    pending_cut: Option<(Point2<f32>, Point2<f32>)>,
}

impl InputState {
    pub fn press(&mut self, at: Point2<f32>) {
        self.start = Some(at);
        self.cursor = Some(at);
    }

    pub fn drag(&mut self, to: Point2<f32>) {
        if self.start.is_some() {
            self.cursor = Some(to);
        }
    }

    /// Finish the gesture. A release without a press is ignored.
    pub fn release(&mut self, at: Point2<f32>) {
        if let Some(start) = self.start.take() {
            self.pending_cut = Some((start, at));
        }
        self.cursor = None;
    }

    /// Live segment while the button is held
    pub fn indicator(&self) -> Option<(Point2<f32>, Point2<f32>)> {
        self.start.zip(self.cursor)
    }

    pub fn take_cut(&mut self) -> Option<(Point2<f32>, Point2<f32>)> {
        self.pending_cut.take()
    }
}

/// Summary of one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub spawned: Option<BodyHandle>,
    pub steps: u32,
    pub removed: usize,
    pub cut: Option<CutReport>,
    pub live: usize,
}

pub struct ApplicationState {
    scene: Scene,
    input: InputState,
    next_asset: usize,
    wireframe: bool,
    paused: bool,
    quit: bool,
}

impl ApplicationState {
    pub fn new(config: KatanaConfig, loader: Box<dyn AssetLoader>) -> Self {
        let KatanaConfig { cut, physics, scene } = config;
        Self::with_scene(Scene::new(scene, physics, cut, loader))
    }

    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene,
            input: InputState::default(),
            next_asset: 0,
            wireframe: false,
            paused: false,
            quit: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press(at) => self.input.press(at),
            InputEvent::Move(to) => self.input.drag(to),
            InputEvent::Release(at) => self.input.release(at),
            InputEvent::Key(Key::Escape) => self.quit = true,
            InputEvent::Key(Key::Wireframe) => self.wireframe = !self.wireframe,
            InputEvent::Key(Key::Pause) => {
                self.paused = !self.paused;
                info!(paused = self.paused, "simulation toggled");
            }
        }
    }

    /// Run one frame of `frame_delta` seconds and draw it into `renderer`
    pub fn frame(
        &mut self,
        frame_delta: f32,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameReport, SceneError> {
        let mut report = FrameReport {
            spawned: self.spawn_if_empty()?,
            ..FrameReport::default()
        };

        if !self.paused {
            let step = self.scene.simulation_step(frame_delta);
            report.steps = step.steps;
            report.removed = step.removed;
        }

        if let Some((start, end)) = self.input.take_cut() {
            report.cut = Some(self.scene.cut(&start, &end)?);
        }

        self.scene.draw_scene(renderer, self.wireframe);
        if let Some((start, end)) = self.input.indicator() {
            let camera = self.scene.camera();
            renderer.draw_cut_indicator(&camera.unproject(&start), &camera.unproject(&end));
        }

        report.live = self.scene.mesh_count();
        Ok(report)
    }

    /// Spawn the next asset of the round-robin list when nothing is live
    fn spawn_if_empty(&mut self) -> Result<Option<BodyHandle>, SceneError> {
        if !self.scene.all_mesh_removed() {
            return Ok(None);
        }
        let assets = &self.scene.config().assets;
        if assets.is_empty() {
            return Ok(None);
        }
        let asset = assets[self.next_asset % assets.len()].clone();
        self.next_asset = (self.next_asset + 1) % assets.len();

        debug!(%asset, "scene empty, spawning next asset");
        self.scene.add_mesh(&asset).map(Some)
    }
}
