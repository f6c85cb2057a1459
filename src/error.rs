// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the slicing kernel
//!
//! Each subsystem has its own enum so callers can match on the failure they
//! care about; [`KatanaError`] collects them for code that just wants `?`.

use crate::physics::BodyHandle;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, KatanaError>;

/// Mesh buffer validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Cut engine failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CutError {
    #[error("cut segment has no extent in the XY plane of the object")]
    DegenerateSegment,

    #[error("model matrix is not invertible")]
    NonInvertibleModel,

    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] GeometryError),
}

/// Rigid-body adapter failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("no live body for handle {0:?}")]
    UnknownBody(BodyHandle),
}

/// Asset loading failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to read asset {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("asset {path} is not a usable mesh: {source}")]
    Invalid {
        path: String,
        #[source]
        source: GeometryError,
    },
}

/// Scene orchestration failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Cut(#[from] CutError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Umbrella error for the whole crate
#[derive(Debug, Error)]
pub enum KatanaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Cut(#[from] CutError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
