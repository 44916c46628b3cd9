use std::fs;
use std::path::{Path, PathBuf};

use glam::{EulerRot, Mat4, Quat, Vec3};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::cursor::LineCursor;
use crate::error::{LoadError, Result};
use crate::model::Model;
use crate::tables::NamedStore;
use crate::texture::{ImageTextureLoader, TextureLoader};

/// The scene's single directional light.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Unit direction the light travels in.
    pub direction: Vec3,
    pub color: Vec3,
    /// Ambient contribution in `[0, 1]`.
    pub ambient: f32,
}

/// Constant, linear and quadratic distance attenuation terms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub exponent: f32,
    /// Cone angle in degrees, `[0, 180]`.
    pub angle: f32,
    /// Range of the light, never negative.
    pub length: f32,
    pub attenuation: Attenuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    /// Animation speed in `[0, 1]`.
    pub velocity: f32,
    pub attenuation: Attenuation,
}

/// Stable reference to a model owned by a scene's [`ModelCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

impl ModelHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An instance of a model placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Roll, pitch and yaw in degrees.
    pub orientation: Vec3,
    pub scale: Vec3,
    pub model: ModelHandle,
}

impl Placement {
    /// Object-to-world transform: scale, then roll about Z, pitch about X,
    /// yaw about Y, then translation.
    pub fn model_matrix(&self) -> Mat4 {
        let [roll, pitch, yaw] = self.orientation.to_array().map(f32::to_radians);
        let rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Models loaded for a scene, keyed by resolved file path.
///
/// Each path is parsed at most once; later placements reuse the stored model.
#[derive(Debug, Default)]
pub struct ModelCache {
    models: NamedStore<PathBuf, Model>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `dir/file`, parsing the model on first use.
    pub fn get_or_load(
        &mut self,
        dir: &Path,
        file: &str,
        loader: &dyn TextureLoader,
    ) -> Result<ModelHandle> {
        let path = dir.join(file);
        if self.models.index_of(&path).is_some() {
            debug!("reusing cached model {}", path.display());
        }
        let id = self.models.get_or_try_insert_with(path.clone(), || {
            info!("loading model {}", path.display());
            Model::from_file(dir, file, loader)
        })?;
        Ok(ModelHandle(id))
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle.0)
    }

    pub fn handle(&self, path: &Path) -> Option<ModelHandle> {
        self.models.index_of(path).map(ModelHandle)
    }

    pub fn models(&self) -> &[Model] {
        self.models.items()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Lights and model placements read from a scene file.
///
/// The scene owns every model its placements refer to; dropping it releases
/// all of them at once.
#[derive(Debug, Default)]
pub struct Scene {
    sunlight: Option<DirectionalLight>,
    spotlights: Vec<SpotLight>,
    pointlights: Vec<PointLight>,
    placements: Vec<Placement>,
    models: ModelCache,
}

impl Scene {
    /// Loads a scene file, decoding textures with the `image` crate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &ImageTextureLoader)
    }

    /// Loads a scene file. Model paths are resolved against the scene's directory.
    pub fn load_with(path: impl AsRef<Path>, loader: &dyn TextureLoader) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
        let dir = scene_dir(path);
        info!("reading scene {}", path.display());
        SceneParser::new(&source, path, dir, loader).run()
    }

    /// Parses scene text, resolving model paths against `dir`.
    pub fn parse(source: &str, dir: &Path, loader: &dyn TextureLoader) -> Result<Self> {
        SceneParser::new(source, Path::new("<scene>"), dir, loader).run()
    }

    pub fn sunlight(&self) -> Option<&DirectionalLight> {
        self.sunlight.as_ref()
    }

    pub fn spotlights(&self) -> &[SpotLight] {
        &self.spotlights
    }

    pub fn pointlights(&self) -> &[PointLight] {
        &self.pointlights
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle)
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }
}

/// Directory model paths resolve against. A bare file name means the working directory.
fn scene_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

struct SceneParser<'a> {
    cursor: LineCursor<'a>,
    origin: &'a Path,
    dir: &'a Path,
    loader: &'a dyn TextureLoader,
    scene: Scene,
}

impl<'a> SceneParser<'a> {
    fn new(
        source: &'a str,
        origin: &'a Path,
        dir: &'a Path,
        loader: &'a dyn TextureLoader,
    ) -> Self {
        Self {
            cursor: LineCursor::new(source),
            origin,
            dir,
            loader,
            scene: Scene::default(),
        }
    }

    fn run(mut self) -> Result<Scene> {
        if let Err(err) = self.read_blocks() {
            error!(
                "error reading scene {}; last token was {:?}",
                self.origin.display(),
                self.cursor.last_token()
            );
            return Err(err);
        }
        info!(
            "scene {}: {} placements of {} models, {} spotlights, {} pointlights",
            self.origin.display(),
            self.scene.placements.len(),
            self.scene.models.len(),
            self.scene.spotlights.len(),
            self.scene.pointlights.len()
        );
        Ok(self.scene)
    }

    fn read_blocks(&mut self) -> Result<()> {
        while let Some(token) = self.cursor.next_token() {
            match token {
                "sunlight" => self.sunlight()?,
                "spotlight" => self.spotlight()?,
                "pointlight" => self.pointlight()?,
                "model" => self.placement()?,
                comment if comment.starts_with('#') => self.cursor.skip_line(),
                other => {
                    debug!(
                        "{}:{}: skipping unknown entry {other:?}",
                        self.origin.display(),
                        self.cursor.line()
                    );
                    self.cursor.skip_line();
                }
            }
        }
        Ok(())
    }

    fn sunlight(&mut self) -> Result<()> {
        let mut light = DirectionalLight::default();
        self.read_block(|parser, key| {
            match key {
                "direction" => light.direction = parser.vec3("direction")?.normalize_or_zero(),
                "color" => light.color = parser.color()?,
                "ambient" => light.ambient = parser.float("ambient")?.max(0.0).min(1.0),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        if self.scene.sunlight.replace(light).is_some() {
            warn!(
                "{}: sunlight declared more than once; using the last declaration",
                self.origin.display()
            );
        }
        Ok(())
    }

    fn spotlight(&mut self) -> Result<()> {
        let mut light = SpotLight::default();
        self.read_block(|parser, key| {
            match key {
                "position" => light.position = parser.vec3("position")?,
                "direction" => light.direction = parser.vec3("direction")?.normalize_or_zero(),
                "color" => light.color = parser.color()?,
                "exponent" => light.exponent = parser.float("exponent")?,
                "angle" => light.angle = parser.float("angle")?.max(0.0).min(180.0),
                "length" => light.length = parser.float("length")?.max(0.0),
                "attenuation" => light.attenuation = parser.attenuation()?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        self.scene.spotlights.push(light);
        Ok(())
    }

    fn pointlight(&mut self) -> Result<()> {
        let mut light = PointLight::default();
        self.read_block(|parser, key| {
            match key {
                "position" => light.position = parser.vec3("position")?,
                "color" => light.color = parser.color()?,
                "velocity" => light.velocity = parser.float("velocity")?.max(0.0).min(1.0),
                "attenuation" => light.attenuation = parser.attenuation()?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        self.scene.pointlights.push(light);
        Ok(())
    }

    fn placement(&mut self) -> Result<()> {
        let mut position = Vec3::ZERO;
        let mut orientation = Vec3::ZERO;
        let mut scale = Vec3::ONE;
        let mut model = None;
        self.read_block(|parser, key| {
            match key {
                "position" => position = parser.vec3("position")?,
                "orientation" => orientation = parser.vec3("orientation")?,
                "scale" => scale = parser.vec3("scale")?,
                "file" => {
                    let file = parser.quoted()?;
                    model = Some(parser.scene.models.get_or_load(parser.dir, file, parser.loader)?);
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        let model = model.ok_or_else(|| LoadError::MissingField {
            path: self.origin.to_path_buf(),
            line: self.cursor.line(),
            block: "model",
            field: "file",
        })?;
        self.scene.placements.push(Placement {
            position,
            orientation,
            scale,
            model,
        });
        Ok(())
    }

    /// Reads `{ key values... }`, handing each key to `field`.
    ///
    /// Keys `field` does not recognize are skipped to the end of their line.
    fn read_block(
        &mut self,
        mut field: impl FnMut(&mut Self, &'a str) -> Result<bool>,
    ) -> Result<()> {
        if self.cursor.peek_char() != Some('{') {
            let found = self.cursor.next_token().unwrap_or("end of input");
            return Err(self.malformed("`{`", found));
        }
        self.cursor.bump();
        loop {
            match self.cursor.peek_char() {
                Some('}') => {
                    self.cursor.bump();
                    return Ok(());
                }
                Some('#') => self.cursor.skip_line(),
                Some(_) => {
                    let Some(key) = self.cursor.next_token() else {
                        continue;
                    };
                    if !field(self, key)? {
                        debug!(
                            "{}:{}: ignoring key {key:?}",
                            self.origin.display(),
                            self.cursor.line()
                        );
                        self.cursor.skip_line_until('}');
                    }
                }
                None => return Err(self.malformed("`}`", "end of input")),
            }
        }
    }

    fn quoted(&mut self) -> Result<&'a str> {
        let line = self.cursor.line();
        self.cursor.skip_line_until('"');
        if self.cursor.line() != line || self.cursor.bump() != Some('"') {
            return Err(self.malformed("quoted file path", "end of line"));
        }
        match self.cursor.read_until('"') {
            Some(path) if !path.contains('\n') => Ok(path),
            _ => Err(self.malformed("closing quote", "end of line")),
        }
    }

    fn vec3(&mut self, expected: &'static str) -> Result<Vec3> {
        self.cursor
            .parse_floats::<3>(expected)
            .map(Vec3::from_array)
            .map_err(|err| err.at(self.origin))
    }

    fn color(&mut self) -> Result<Vec3> {
        Ok(self.vec3("color channel")?.max(Vec3::ZERO).min(Vec3::ONE))
    }

    fn float(&mut self, expected: &'static str) -> Result<f32> {
        self.cursor
            .parse_arg(expected)
            .map_err(|err| err.at(self.origin))
    }

    fn attenuation(&mut self) -> Result<Attenuation> {
        let [constant, linear, quadratic] = self
            .cursor
            .parse_floats::<3>("attenuation constant")
            .map_err(|err| err.at(self.origin))?;
        Ok(Attenuation {
            constant,
            linear,
            quadratic,
        })
    }

    fn malformed(&self, expected: &'static str, found: &str) -> LoadError {
        LoadError::MalformedToken {
            path: self.origin.to_path_buf(),
            line: self.cursor.line(),
            expected,
            found: found.to_string(),
        }
    }
}
