// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and the primitives the cut engine works on

pub mod analytics;
mod bbox;
mod mesh;
mod plane;
mod primitives;
mod vertex;
pub mod weld;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use mesh::{Mesh, TextureRef};
pub use plane::{CutPlane, Side};
pub use primitives::Primitive;
pub use vertex::{Vertex, VERTEX_EPSILON};
pub use weld::VertexWelder;
