// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh import and export

pub mod stl;

pub use stl::{export_stl, read_stl};
