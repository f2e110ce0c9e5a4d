// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material library (`.mtl`) parser
//!
//! A line state machine keyed on `newmtl`: each entry collects its color,
//! opacity and texture directives until the next `newmtl` or end of file.

use crate::tokenizer::{parse_f32, parse_vector, Arity, SourcePos, TokenLine};
use obj_lite_model::{
    resolve_relative, Color, Location, Material, MaterialTable, ParseError, ResourceResolver,
    Result,
};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Material library directive, selected by the first token of a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MtlDirective<'a> {
    NewMaterial,
    Ambient,
    Diffuse,
    Specular,
    Shininess,
    Dissolve,
    Transparency,
    DiffuseMap,
    /// Recognised but not modelled (lighting model, other maps, ...)
    Ignored,
    Other(&'a str),
}

impl<'a> MtlDirective<'a> {
    fn parse(keyword: &'a str) -> Self {
        match keyword {
            "newmtl" => MtlDirective::NewMaterial,
            "Ka" => MtlDirective::Ambient,
            "Kd" => MtlDirective::Diffuse,
            "Ks" => MtlDirective::Specular,
            "Ns" => MtlDirective::Shininess,
            "d" => MtlDirective::Dissolve,
            "Tr" => MtlDirective::Transparency,
            "map_Kd" => MtlDirective::DiffuseMap,
            "illum" | "map_Ka" | "Ni" | "Ke" | "Tf" | "map_Ks" | "map_Ns" | "map_d"
            | "map_Bump" | "map_bump" | "bump" | "disp" | "decal" | "refl" | "sharpness" => {
                MtlDirective::Ignored
            }
            other => MtlDirective::Other(other),
        }
    }
}

/// Parse state of one library
#[derive(Default)]
struct LibraryState {
    current: Option<Material>,
    finished: Vec<Material>,
}

impl LibraryState {
    fn state_name(&self) -> &'static str {
        if self.current.is_some() {
            "ProcessMaterial"
        } else {
            "Init"
        }
    }

    fn step(mut self, line: &TokenLine<'_>, path: &Path, pos: SourcePos<'_>) -> Result<Self> {
        let directive = MtlDirective::parse(line.keyword);
        if directive == MtlDirective::NewMaterial {
            Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
            self.finished.extend(self.current.take());
            self.current = Some(Material::new(line.joined_args()));
            return Ok(self);
        }

        let state = self.state_name();
        let Some(material) = self.current.as_mut() else {
            return Err(ParseError::illegal(line.keyword, state, pos.location()));
        };

        match directive {
            MtlDirective::Ambient => material.ambient = parse_color(line, pos)?,
            MtlDirective::Diffuse => material.diffuse = parse_color(line, pos)?,
            MtlDirective::Specular => material.specular = parse_color(line, pos)?,
            MtlDirective::Shininess => {
                Arity::Exactly(1).check(line.keyword, &line.args, pos)?;
                material.shininess = parse_f32(line.args[0], pos)?;
            }
            MtlDirective::Dissolve => {
                // `d -halo 0.5` puts the value last
                Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
                material.alpha = parse_f32(line.args[line.args.len() - 1], pos)?;
            }
            MtlDirective::Transparency => {
                Arity::Exactly(1).check(line.keyword, &line.args, pos)?;
                material.alpha = 1.0 - parse_f32(line.args[0], pos)?;
            }
            MtlDirective::DiffuseMap => {
                // options precede the file name
                Arity::AtLeast(1).check(line.keyword, &line.args, pos)?;
                let name = line.args[line.args.len() - 1];
                material.diffuse_texture = Some(resolve_relative(path, name));
            }
            MtlDirective::Ignored => {}
            MtlDirective::NewMaterial | MtlDirective::Other(_) => {
                return Err(ParseError::illegal(line.keyword, state, pos.location()));
            }
        }
        Ok(self)
    }

    fn finish(mut self) -> Vec<Material> {
        self.finished.extend(self.current.take());
        self.finished
    }
}

/// `Ka`/`Kd`/`Ks`: three components, or one meaning a grey level
fn parse_color(line: &TokenLine<'_>, pos: SourcePos<'_>) -> Result<Color> {
    if line.args.len() == 1 {
        let level = parse_f32(line.args[0], pos)?;
        return Ok([level; 3]);
    }
    parse_vector(line.keyword, &line.args, Arity::Exactly(3), pos)
}

/// Parse a material library stream
///
/// `path` is the library's own identifier; relative texture names are
/// resolved against its directory. Materials are returned in file order.
pub fn parse_library(reader: &mut dyn BufRead, path: &Path) -> Result<Vec<Material>> {
    let source = path.display().to_string();
    let mut state = LibraryState::default();
    for (i, raw) in reader.lines().enumerate() {
        let raw = raw.map_err(|err| ParseError::read(err, Location::new(&source, i + 1)))?;
        let Some(line) = TokenLine::parse(i + 1, &raw) else {
            continue;
        };
        state = state.step(&line, path, SourcePos::new(&source, line.number))?;
    }
    Ok(state.finish())
}

/// Open a library through `resolver` and parse it
///
/// With `verify_textures`, every resolved diffuse texture must exist
/// according to the resolver.
pub fn load_library(
    resolver: &dyn ResourceResolver,
    path: &Path,
    verify_textures: bool,
) -> Result<Vec<Material>> {
    let mut reader = resolver.open(path)?;
    let materials = parse_library(&mut *reader, path)?;
    if verify_textures {
        for texture in materials.iter().filter_map(|m| m.diffuse_texture.as_deref()) {
            if !resolver.exists(texture) {
                return Err(ParseError::unresolved(
                    texture.display(),
                    format!("texture referenced by {} not found", path.display()),
                ));
            }
        }
    }
    log::debug!(
        "Loaded {} materials from {}",
        materials.len(),
        path.display()
    );
    Ok(materials)
}

/// Merge parsed materials into a table; a repeated name replaces the entry
pub fn merge_into(table: &mut MaterialTable, materials: Vec<Material>) {
    for material in materials {
        let name = material.name.clone();
        if let Some(previous) = table.insert(name, Arc::new(material)) {
            log::warn!(
                "Material '{}' defined more than once, keeping the last definition",
                previous.name
            );
        }
    }
}
