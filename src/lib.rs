// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Katana
//!
//! Interactive mesh slicing. Closed triangle meshes fall under rigid-body
//! physics and are cut in two by screen-space swipes; each cut yields two
//! capped, recentred meshes with convex hulls and mass weights that are
//! fed straight back into the simulation.

pub mod app;
pub mod config;
pub mod cut;
pub mod error;
pub mod geometry;
pub mod io;
pub mod physics;
pub mod scene;
pub mod telemetry;
pub mod utils;

pub use app::{ApplicationState, InputEvent, InputState, Key};
pub use config::KatanaConfig;
pub use cut::{CutConfig, CutOutcome, Fragment, MeshCutter};
pub use error::{KatanaError, Result};
pub use geometry::{Mesh, Primitive, Vertex};
pub use io::export_stl;
pub use physics::{BodyHandle, PhysicsConfig, PhysicsWorld};
pub use scene::{Scene, SceneConfig};

use nalgebra::{Matrix4, Point3};
use scene::{AssetLibrary, AssetLoader};

/// Load a built-in asset (or an STL path) placed at the origin and cut it
/// with the world-space segment `start → end`
pub fn cut_asset(path: &str, start: &Point3<f32>, end: &Point3<f32>) -> Result<CutOutcome> {
    let mesh = AssetLibrary::default().load(path)?;
    let outcome = MeshCutter::default().cut(&mesh, start, end, &Matrix4::identity())?;
    Ok(outcome)
}
