use std::fs;
use std::path::Path;

use glam::Vec3;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::cursor::LineCursor;
use crate::error::{LoadError, Result};
use crate::tables::NamedStore;
use crate::texture::{Texture, TextureLoader};

/// Upper bound of the specular exponent.
pub const MAX_SHININESS: f32 = 1000.0;

/// Surface parameters read from an MTL library.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Specular exponent in `[0, 1000]`.
    pub shininess: f32,
    /// Index into the owning model's texture table.
    pub ambient_map: Option<usize>,
    /// Index into the owning model's texture table.
    pub diffuse_map: Option<usize>,
}

/// Materials and textures belonging to one model.
///
/// Every library a model pulls in is merged into the same set, so a texture
/// file is decoded once no matter how many libraries or materials name it.
#[derive(Debug, Clone, Default)]
pub struct MaterialSet {
    materials: NamedStore<String, Material>,
    textures: NamedStore<String, Texture>,
}

impl MaterialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a single library into a fresh set.
    pub fn from_file(dir: &Path, filename: &str, loader: &dyn TextureLoader) -> Result<Self> {
        let mut set = Self::new();
        set.load_library(dir, filename, loader)?;
        Ok(set)
    }

    /// Reads `dir/filename` and merges its materials into this set.
    ///
    /// Texture paths are resolved against the directory holding the library.
    pub fn load_library(
        &mut self,
        dir: &Path,
        filename: &str,
        loader: &dyn TextureLoader,
    ) -> Result<()> {
        let path = dir.join(filename);
        let source = fs::read_to_string(&path).map_err(|err| LoadError::io(&path, err))?;
        let library_dir = path.parent().unwrap_or(dir);
        debug!("reading material library {}", path.display());
        self.parse_library(&source, &path, library_dir, loader)
    }

    /// Parses library text. `origin` is only used in diagnostics.
    pub fn parse_library(
        &mut self,
        source: &str,
        origin: &Path,
        dir: &Path,
        loader: &dyn TextureLoader,
    ) -> Result<()> {
        let mut cursor = LineCursor::new(source);
        let mut current = None;
        if let Err(err) = self.read_directives(&mut cursor, &mut current, origin, dir, loader) {
            error!(
                "error reading material library {}; last token was {:?}",
                origin.display(),
                cursor.last_token()
            );
            return Err(err);
        }
        if let Some((name, material)) = current {
            self.commit(name, material);
        }
        Ok(())
    }

    fn read_directives(
        &mut self,
        cursor: &mut LineCursor<'_>,
        current: &mut Option<(String, Material)>,
        origin: &Path,
        dir: &Path,
        loader: &dyn TextureLoader,
    ) -> Result<()> {
        while let Some(token) = cursor.next_token() {
            if token == "newmtl" {
                let name = cursor
                    .next_arg()
                    .ok_or_else(|| missing(cursor, origin, "material name"))?;
                if let Some((name, material)) =
                    current.replace((name.to_string(), Material::default()))
                {
                    self.commit(name, material);
                }
            } else if let Some((_, material)) = current.as_mut() {
                match token {
                    "Ka" => material.ambient = read_color(cursor, origin)?,
                    "Kd" => material.diffuse = read_color(cursor, origin)?,
                    "Ks" => material.specular = read_color(cursor, origin)?,
                    "Ns" => {
                        let exponent: f32 = cursor
                            .parse_arg("specular exponent")
                            .map_err(|err| err.at(origin))?;
                        material.shininess = exponent.max(0.0).min(MAX_SHININESS);
                    }
                    "map_Ka" => {
                        material.ambient_map = Some(self.texture(cursor, origin, dir, loader)?)
                    }
                    "map_Kd" => {
                        material.diffuse_map = Some(self.texture(cursor, origin, dir, loader)?)
                    }
                    _ => {}
                }
            }
            cursor.skip_line();
        }
        Ok(())
    }

    fn commit(&mut self, name: String, material: Material) {
        if self.materials.index_of(name.as_str()).is_some() {
            debug!("material {name} redefined; later definition wins");
        }
        self.materials.push(name, material);
    }

    fn texture(
        &mut self,
        cursor: &mut LineCursor<'_>,
        origin: &Path,
        dir: &Path,
        loader: &dyn TextureLoader,
    ) -> Result<usize> {
        // Map options such as `-s 1 1 1` precede the filename.
        let mut filename = None;
        while let Some(arg) = cursor.next_arg() {
            filename = Some(arg);
        }
        let filename = filename.ok_or_else(|| missing(cursor, origin, "texture filename"))?;
        self.textures
            .get_or_try_insert_with(filename.to_string(), || {
                loader.load(&dir.join(filename))
            })
    }

    /// Resolves a material name to its current index.
    pub fn material_id(&self, name: &str) -> Option<usize> {
        self.materials.index_of(name)
    }

    pub fn material(&self, id: usize) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Resolves a material name to its current definition.
    pub fn by_name(&self, name: &str) -> Option<&Material> {
        self.materials.lookup(name)
    }

    pub fn materials(&self) -> &[Material] {
        self.materials.items()
    }

    pub fn texture_id(&self, filename: &str) -> Option<usize> {
        self.textures.index_of(filename)
    }

    pub fn textures(&self) -> &[Texture] {
        self.textures.items()
    }
}

fn read_color(cursor: &mut LineCursor<'_>, origin: &Path) -> Result<Vec3> {
    let [r, g, b] = cursor
        .parse_floats::<3>("color channel")
        .map_err(|err| err.at(origin))?;
    Ok(Vec3::new(r, g, b).max(Vec3::ZERO).min(Vec3::ONE))
}

fn missing(cursor: &LineCursor<'_>, origin: &Path, expected: &'static str) -> LoadError {
    LoadError::MalformedToken {
        path: origin.to_path_buf(),
        line: cursor.line(),
        expected,
        found: "end of line".to_string(),
    }
}
