// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface appearance records from material libraries

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// RGB color [r, g, b] where values are 0.0-1.0
pub type Color = [f32; 3];

/// Material table keyed by `newmtl` name
pub type MaterialTable = FxHashMap<String, Arc<Material>>;

/// One `newmtl` entry of a material library
///
/// Built once while the library is parsed and shared by every mesh that
/// binds it through `usemtl`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Name from the `newmtl` directive
    pub name: String,
    /// Ambient color (`Ka`)
    pub ambient: Color,
    /// Diffuse color (`Kd`)
    pub diffuse: Color,
    /// Specular color (`Ks`)
    pub specular: Color,
    /// Specular exponent (`Ns`)
    pub shininess: f32,
    /// Opacity, 1.0 is fully opaque (`d`, or `1 - Tr`)
    pub alpha: f32,
    /// Resolved diffuse texture path (`map_Kd`)
    pub diffuse_texture: Option<PathBuf>,
}

impl Material {
    /// Create a material with the library format's default values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [1.0, 1.0, 1.0],
            shininess: 0.0,
            alpha: 1.0,
            diffuse_texture: None,
        }
    }

    /// Check if the material is at least partly transparent
    pub fn is_transparent(&self) -> bool {
        self.alpha < 1.0
    }

    /// Diffuse color with alpha appended, [r, g, b, a]
    pub fn diffuse_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.diffuse;
        [r, g, b, self.alpha]
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::new("default")
    }
}
