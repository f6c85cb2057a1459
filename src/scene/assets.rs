// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh asset lookup

use crate::error::AssetError;
use crate::geometry::{Mesh, Primitive};
use crate::io::stl::read_stl;
use ahash::AHashMap;
use nalgebra::Vector3;
use std::path::Path;
use tracing::{debug, warn};

/// Source of meshes for the scene, addressed by path
pub trait AssetLoader {
    fn load(&self, path: &str) -> Result<Mesh, AssetError>;
}

/// Built-in primitives addressed by name, plus STL files on disk.
///
/// A path is resolved as an STL file when it ends in `.stl` and exists;
/// otherwise its file stem is looked up among the primitives, so
/// `models/cube.obj` and `cube` both give the cube.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    primitives: AHashMap<String, Primitive>,
}

impl AssetLibrary {
    pub fn empty() -> Self {
        Self {
            primitives: AHashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, primitive: Primitive) {
        self.primitives.insert(name.into(), primitive);
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.primitives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn stem(path: &str) -> &str {
        Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(path)
    }
}

impl Default for AssetLibrary {
    fn default() -> Self {
        let mut library = Self::empty();
        library.insert("cube", Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false));
        library.insert("plank", Primitive::cube(Vector3::new(2.0, 0.5, 0.5), false));
        library.insert("sphere", Primitive::sphere(0.6, 24));
        library.insert("cylinder", Primitive::cylinder(1.2, 0.5, 24));
        library
    }
}

impl AssetLoader for AssetLibrary {
    fn load(&self, path: &str) -> Result<Mesh, AssetError> {
        let file = Path::new(path);
        let is_stl = file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));
        if is_stl && file.exists() {
            debug!(path, "loading STL asset");
            return read_stl(file).map_err(|err| {
                warn!(path, error = %err, "failed to read STL asset");
                AssetError::Unreadable {
                    path: path.to_string(),
                    reason: format!("{:#}", err),
                }
            });
        }

        let primitive = self
            .primitives
            .get(Self::stem(path))
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        let mesh = primitive.to_mesh();
        mesh.validate().map_err(|source| AssetError::Invalid {
            path: path.to_string(),
            source,
        })?;
        Ok(mesh)
    }
}
