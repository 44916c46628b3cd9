use std::fs;
use std::mem;
use std::path::Path;

use glam::{Vec2, Vec3};
use log::{debug, error, warn};

use crate::cursor::LineCursor;
use crate::error::{LoadError, Result};
use crate::material::{Material, MaterialSet};
use crate::texture::{Texture, TextureLoader};

/// Name given to triangles that appear before the first `g` directive.
pub const DEFAULT_GROUP: &str = "default";

/// Which attribute pools a triangle's vertices index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    Position,
    PositionTexcoord,
    PositionNormal,
    PositionTexcoordNormal,
}

/// Zero-based pool indices for the three corners of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleVertices {
    Position {
        positions: [usize; 3],
    },
    PositionTexcoord {
        positions: [usize; 3],
        texcoords: [usize; 3],
    },
    PositionNormal {
        positions: [usize; 3],
        normals: [usize; 3],
    },
    PositionTexcoordNormal {
        positions: [usize; 3],
        texcoords: [usize; 3],
        normals: [usize; 3],
    },
}

impl TriangleVertices {
    pub fn vertex_type(&self) -> VertexType {
        match self {
            Self::Position { .. } => VertexType::Position,
            Self::PositionTexcoord { .. } => VertexType::PositionTexcoord,
            Self::PositionNormal { .. } => VertexType::PositionNormal,
            Self::PositionTexcoordNormal { .. } => VertexType::PositionTexcoordNormal,
        }
    }

    pub fn positions(&self) -> [usize; 3] {
        match *self {
            Self::Position { positions }
            | Self::PositionTexcoord { positions, .. }
            | Self::PositionNormal { positions, .. }
            | Self::PositionTexcoordNormal { positions, .. } => positions,
        }
    }

    pub fn texcoords(&self) -> Option<[usize; 3]> {
        match *self {
            Self::PositionTexcoord { texcoords, .. }
            | Self::PositionTexcoordNormal { texcoords, .. } => Some(texcoords),
            _ => None,
        }
    }

    pub fn normals(&self) -> Option<[usize; 3]> {
        match *self {
            Self::PositionNormal { normals, .. } | Self::PositionTexcoordNormal { normals, .. } => {
                Some(normals)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: TriangleVertices,
    /// Index into the model's material list.
    pub material: Option<usize>,
    pub smoothing_group: u32,
    pub smooth_shading: bool,
}

/// Triangles collected under one `g` directive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleGroup {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

impl TriangleGroup {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }
}

/// Geometry, groups and materials read from one OBJ file.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
    groups: Vec<TriangleGroup>,
    materials: MaterialSet,
}

impl Model {
    /// Loads `dir/filename`. Material libraries are resolved against the
    /// directory containing the model file.
    pub fn from_file(dir: &Path, filename: &str, loader: &dyn TextureLoader) -> Result<Self> {
        let path = dir.join(filename);
        let source = fs::read_to_string(&path).map_err(|err| LoadError::io(&path, err))?;
        let model_dir = path.parent().unwrap_or(dir);
        debug!("reading model {}", path.display());
        ObjParser::new(filename, &source, &path, model_dir, loader).run()
    }

    /// Parses OBJ text as if it had been read from `dir/name`.
    pub fn parse(
        name: &str,
        source: &str,
        dir: &Path,
        loader: &dyn TextureLoader,
    ) -> Result<Self> {
        let origin = dir.join(name);
        ObjParser::new(name, source, &origin, dir, loader).run()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    /// Unit-length vertex normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Non-empty groups in file order.
    pub fn groups(&self) -> &[TriangleGroup] {
        &self.groups
    }

    pub fn materials(&self) -> &MaterialSet {
        &self.materials
    }

    pub fn material(&self, id: usize) -> Option<&Material> {
        self.materials.material(id)
    }

    pub fn textures(&self) -> &[Texture] {
        self.materials.textures()
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|group| group.triangles.len()).sum()
    }
}

/// State that applies to every face read after it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParseContext {
    material: Option<usize>,
    smoothing_group: u32,
    smooth_shading: bool,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            material: None,
            smoothing_group: 1,
            smooth_shading: false,
        }
    }
}

impl ParseContext {
    fn with_material(self, material: usize) -> Self {
        Self {
            material: Some(material),
            ..self
        }
    }

    fn with_smoothing(self, group: Option<u32>) -> Self {
        match group {
            Some(smoothing_group) => Self {
                smoothing_group,
                smooth_shading: true,
                ..self
            },
            None => Self {
                smooth_shading: false,
                ..self
            },
        }
    }

    fn triangle(self, vertices: TriangleVertices) -> Triangle {
        Triangle {
            vertices,
            material: self.material,
            smoothing_group: self.smoothing_group,
            smooth_shading: self.smooth_shading,
        }
    }
}

struct ObjParser<'a> {
    cursor: LineCursor<'a>,
    origin: &'a Path,
    dir: &'a Path,
    loader: &'a dyn TextureLoader,
    model: Model,
    group: TriangleGroup,
}

impl<'a> ObjParser<'a> {
    fn new(
        name: &str,
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
            model: Model {
                name: name.to_string(),
                ..Model::default()
            },
            group: TriangleGroup::named(DEFAULT_GROUP),
        }
    }

    fn run(mut self) -> Result<Model> {
        if let Err(err) = self.read_directives() {
            error!(
                "error reading {}; last token was {:?}",
                self.origin.display(),
                self.cursor.last_token()
            );
            return Err(err);
        }
        self.finish_group(String::new());
        debug!(
            "read {}: {} positions, {} texcoords, {} normals, {} groups, {} triangles",
            self.model.name,
            self.model.positions.len(),
            self.model.texcoords.len(),
            self.model.normals.len(),
            self.model.groups.len(),
            self.model.triangle_count()
        );
        Ok(self.model)
    }

    fn read_directives(&mut self) -> Result<()> {
        let mut context = ParseContext::default();
        while let Some(token) = self.cursor.next_token() {
            if !token.starts_with('#') {
                context = self.directive(token, context)?;
            }
            self.cursor.skip_line();
        }
        Ok(())
    }

    fn directive(&mut self, token: &str, context: ParseContext) -> Result<ParseContext> {
        match token {
            "v" => {
                let position = self.floats::<3>("vertex coordinate")?;
                self.model.positions.push(Vec3::from_array(position));
            }
            "vt" => {
                let texcoord = self.floats::<2>("texture coordinate")?;
                self.model.texcoords.push(Vec2::from_array(texcoord));
            }
            "vn" => {
                let normal = self.floats::<3>("normal component")?;
                self.model.normals.push(Vec3::from_array(normal).normalize());
            }
            "mtllib" => self.material_libraries()?,
            "usemtl" => {
                let name = self.arg("material name")?;
                let id = self.model.materials.material_id(name).ok_or_else(|| {
                    LoadError::UnresolvedReference {
                        path: self.origin.to_path_buf(),
                        line: self.cursor.line(),
                        kind: "material",
                        name: name.to_string(),
                    }
                })?;
                return Ok(context.with_material(id));
            }
            "g" => {
                let mut names = Vec::new();
                while let Some(name) = self.cursor.next_arg() {
                    names.push(name);
                }
                let name = if names.is_empty() {
                    DEFAULT_GROUP.to_string()
                } else {
                    names.join(" ")
                };
                self.finish_group(name);
            }
            "s" => {
                let group = match self.arg("smoothing group")? {
                    "off" | "0" => None,
                    value => Some(value.parse::<u32>().map_err(|_| {
                        LoadError::MalformedToken {
                            path: self.origin.to_path_buf(),
                            line: self.cursor.line(),
                            expected: "smoothing group",
                            found: value.to_string(),
                        }
                    })?),
                };
                return Ok(context.with_smoothing(group));
            }
            "f" => self.face(context)?,
            "vp" => debug!(
                "{}:{}: ignoring parameter-space vertex",
                self.origin.display(),
                self.cursor.line()
            ),
            _ => {}
        }
        Ok(context)
    }

    fn material_libraries(&mut self) -> Result<()> {
        let first = self.arg("material library filename")?;
        let mut filename = Some(first);
        while let Some(name) = filename {
            let line = self.cursor.line();
            let library = self.dir.join(name);
            self.model
                .materials
                .load_library(self.dir, name, self.loader)
                .map_err(|err| {
                    let library_missing = matches!(
                        &err,
                        LoadError::Io { path, .. } if *path == library
                    ) && err.is_not_found();
                    if library_missing {
                        LoadError::UnresolvedReference {
                            path: self.origin.to_path_buf(),
                            line,
                            kind: "material library",
                            name: name.to_string(),
                        }
                    } else {
                        err
                    }
                })?;
            filename = self.cursor.next_arg();
        }
        Ok(())
    }

    fn face(&mut self, context: ParseContext) -> Result<()> {
        let line = self.cursor.line();
        let malformed = |reason: String| LoadError::MalformedFace {
            path: self.origin.to_path_buf(),
            line,
            reason,
        };

        let mut specs = Vec::with_capacity(3);
        while let Some(arg) = self.cursor.next_arg() {
            if arg.starts_with('#') {
                break;
            }
            specs.push(arg);
        }
        if specs.len() > 3 {
            warn!(
                "{}:{line}: skipping face with {} vertices; only triangles are supported",
                self.origin.display(),
                specs.len()
            );
            return Ok(());
        }
        let [a, b, c] = specs[..] else {
            return Err(malformed(format!(
                "expected 3 vertices, found {}",
                specs.len()
            )));
        };

        let first = VertexSpec::parse(a).map_err(&malformed)?;
        let vertex_type = first.vertex_type();
        let mut corners = [first; 3];
        for (corner, text) in corners.iter_mut().zip([a, b, c]).skip(1) {
            *corner = VertexSpec::parse(text).map_err(&malformed)?;
            if corner.vertex_type() != vertex_type {
                return Err(malformed(format!(
                    "vertex {text:?} does not match the {vertex_type:?} layout of {a:?}"
                )));
            }
        }

        let mut positions = [0; 3];
        let mut texcoords = [0; 3];
        let mut normals = [0; 3];
        for (i, corner) in corners.iter().enumerate() {
            positions[i] = resolve_index(corner.position, self.model.positions.len(), "position")
                .map_err(&malformed)?;
            if let Some(texcoord) = corner.texcoord {
                texcoords[i] = resolve_index(texcoord, self.model.texcoords.len(), "texcoord")
                    .map_err(&malformed)?;
            }
            if let Some(normal) = corner.normal {
                normals[i] = resolve_index(normal, self.model.normals.len(), "normal")
                    .map_err(&malformed)?;
            }
        }

        let vertices = match vertex_type {
            VertexType::Position => TriangleVertices::Position { positions },
            VertexType::PositionTexcoord => TriangleVertices::PositionTexcoord {
                positions,
                texcoords,
            },
            VertexType::PositionNormal => TriangleVertices::PositionNormal { positions, normals },
            VertexType::PositionTexcoordNormal => TriangleVertices::PositionTexcoordNormal {
                positions,
                texcoords,
                normals,
            },
        };
        self.group.triangles.push(context.triangle(vertices));
        Ok(())
    }

    fn finish_group(&mut self, next: String) {
        let group = mem::replace(&mut self.group, TriangleGroup::named(next));
        if group.triangles.is_empty() {
            debug!("dropping empty group {:?} in {}", group.name, self.model.name);
        } else {
            self.model.groups.push(group);
        }
    }

    fn floats<const N: usize>(&mut self, expected: &'static str) -> Result<[f32; N]> {
        self.cursor
            .parse_floats::<N>(expected)
            .map_err(|err| err.at(self.origin))
    }

    fn arg(&mut self, expected: &'static str) -> Result<&'a str> {
        self.cursor.next_arg().ok_or_else(|| LoadError::MalformedToken {
            path: self.origin.to_path_buf(),
            line: self.cursor.line(),
            expected,
            found: "end of line".to_string(),
        })
    }
}

/// One `v[/t][/n]` corner of a face, indices still as written.
#[derive(Debug, Clone, Copy)]
struct VertexSpec<'s> {
    position: &'s str,
    texcoord: Option<&'s str>,
    normal: Option<&'s str>,
}

impl<'s> VertexSpec<'s> {
    fn parse(text: &'s str) -> std::result::Result<Self, String> {
        let mut parts = text.split('/');
        let position = parts.next().unwrap_or_default();
        let (texcoord, normal) = match (parts.next(), parts.next(), parts.next()) {
            (None, None, None) => (None, None),
            (Some(t), None, None) if !t.is_empty() => (Some(t), None),
            (Some(""), Some(n), None) if !n.is_empty() => (None, Some(n)),
            (Some(t), Some(n), None) if !t.is_empty() && !n.is_empty() => (Some(t), Some(n)),
            _ => return Err(format!("unrecognized vertex layout {text:?}")),
        };
        Ok(Self {
            position,
            texcoord,
            normal,
        })
    }

    fn vertex_type(&self) -> VertexType {
        match (self.texcoord.is_some(), self.normal.is_some()) {
            (false, false) => VertexType::Position,
            (true, false) => VertexType::PositionTexcoord,
            (false, true) => VertexType::PositionNormal,
            (true, true) => VertexType::PositionTexcoordNormal,
        }
    }
}

/// Converts a one-based index to a zero-based one, rejecting anything outside the pool.
fn resolve_index(text: &str, len: usize, pool: &str) -> std::result::Result<usize, String> {
    let index: i64 = text
        .parse()
        .map_err(|_| format!("{pool} index {text:?} is not an integer"))?;
    if index < 1 {
        return Err(format!("{pool} index {index} is out of range (indices start at 1)"));
    }
    let zero_based = (index - 1) as usize;
    if zero_based >= len {
        return Err(format!("{pool} index {index} is out of range ({len} defined)"));
    }
    Ok(zero_based)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::testing::RecordingLoader;
    use crate::texture::ImageTextureLoader;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";

    fn parse(source: &str) -> Result<Model> {
        let loader = RecordingLoader::default();
        Model::parse("test.obj", source, Path::new("."), &loader)
    }

    fn only_triangle(model: &Model) -> Triangle {
        assert_eq!(model.groups().len(), 1);
        assert_eq!(model.groups()[0].triangles.len(), 1);
        model.groups()[0].triangles[0]
    }

    #[test]
    fn position_only_face() {
        let model = parse(&format!("{TRIANGLE}f 1 2 3\n")).unwrap();
        let triangle = only_triangle(&model);
        assert_eq!(triangle.vertices.vertex_type(), VertexType::Position);
        assert_eq!(triangle.vertices.positions(), [0, 1, 2]);
        assert_eq!(triangle.vertices.texcoords(), None);
        assert_eq!(triangle.material, None);
        assert_eq!(triangle.smoothing_group, 1);
        assert!(!triangle.smooth_shading);
        assert_eq!(model.groups()[0].name, DEFAULT_GROUP);
    }

    #[test]
    fn full_vertex_face() {
        let source = format!(
            "{TRIANGLE}vt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nvn 0 0 2\nvn 0 0 3\nf 1/1/1 2/2/2 3/3/3\n"
        );
        let model = parse(&source).unwrap();
        let triangle = only_triangle(&model);
        assert_eq!(
            triangle.vertices,
            TriangleVertices::PositionTexcoordNormal {
                positions: [0, 1, 2],
                texcoords: [0, 1, 2],
                normals: [0, 1, 2],
            }
        );
    }

    #[test]
    fn texcoord_and_normal_only_layouts() {
        let source = format!(
            "{TRIANGLE}vt 0 0\nvt 1 1\nvn 1 0 0\nf 3/2 2/1 1/2\nf 1//1 2//1 3//1\n"
        );
        let model = parse(&source).unwrap();
        let triangles = &model.groups()[0].triangles;
        assert_eq!(
            triangles[0].vertices,
            TriangleVertices::PositionTexcoord {
                positions: [2, 1, 0],
                texcoords: [1, 0, 1],
            }
        );
        assert_eq!(
            triangles[1].vertices,
            TriangleVertices::PositionNormal {
                positions: [0, 1, 2],
                normals: [0, 0, 0],
            }
        );
    }

    #[test]
    fn normals_are_unit_length() {
        let model = parse("vn 3 4 0\nvn 0 0 -0.25\nvn 1 1 1\n").unwrap();
        for normal in model.normals() {
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
        assert!(model.normals()[0].abs_diff_eq(Vec3::new(0.6, 0.8, 0.0), 1e-6));
    }

    #[test]
    fn groups_are_split_and_empty_ones_dropped() {
        let source = format!(
            "{TRIANGLE}f 1 2 3\ng empty\ng body\nf 1 2 3\nf 3 2 1\ng\ng tail\nf 2 3 1"
        );
        let model = parse(&source).unwrap();
        let names: Vec<_> = model.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, [DEFAULT_GROUP, "body", "tail"]);
        assert_eq!(model.groups()[1].triangles.len(), 2);
        assert_eq!(model.triangle_count(), 4);
    }

    #[test]
    fn smoothing_applies_to_following_faces() {
        let source = format!("{TRIANGLE}f 1 2 3\ns 4\nf 1 2 3\ns off\nf 1 2 3\ns 0\nf 1 2 3\n");
        let model = parse(&source).unwrap();
        let state: Vec<_> = model.groups()[0]
            .triangles
            .iter()
            .map(|t| (t.smoothing_group, t.smooth_shading))
            .collect();
        assert_eq!(state, [(1, false), (4, true), (4, false), (4, false)]);
    }

    #[test]
    fn invalid_smoothing_group_is_malformed() {
        let err = parse("s sometimes\n").unwrap_err();
        assert!(matches!(err, LoadError::MalformedToken { .. }));
    }

    #[test]
    fn undeclared_material_is_unresolved() {
        let err = parse(&format!("{TRIANGLE}usemtl ghost\nf 1 2 3\n")).unwrap_err();
        match err {
            LoadError::UnresolvedReference { kind, name, line, .. } => {
                assert_eq!(kind, "material");
                assert_eq!(name, "ghost");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mixed_face_layout_is_rejected() {
        let source = format!("{TRIANGLE}vt 0 0\nf 1/1 2 3/1\n");
        assert!(matches!(
            parse(&source).unwrap_err(),
            LoadError::MalformedFace { line: 5, .. }
        ));
    }

    #[test]
    fn bad_separator_pattern_is_rejected() {
        for face in ["f 1// 2// 3//", "f 1/1/1/1 2 3", "f 1/ 2/ 3/", "f a b c"] {
            let source = format!("{TRIANGLE}vt 0 0\nvn 0 1 0\n{face}\n");
            assert!(
                matches!(parse(&source).unwrap_err(), LoadError::MalformedFace { .. }),
                "{face} should be rejected"
            );
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        for face in ["f 0 1 2", "f -1 1 2", "f 1 2 4"] {
            let source = format!("{TRIANGLE}{face}\n");
            assert!(
                matches!(parse(&source).unwrap_err(), LoadError::MalformedFace { .. }),
                "{face} should be rejected"
            );
        }
        let source = format!("{TRIANGLE}vt 0 0\nf 1/2 2/1 3/1\n");
        assert!(parse(&source).is_err());
    }

    #[test]
    fn short_face_is_rejected() {
        let source = format!("{TRIANGLE}f 1 2\n");
        assert!(matches!(
            parse(&source).unwrap_err(),
            LoadError::MalformedFace { .. }
        ));
    }

    #[test]
    fn quads_and_unsupported_directives_are_skipped() {
        let source = format!(
            "# a comment f 1 2 3\n{TRIANGLE}v 1 1 0\nvp 0.5 0.5\no thing\nl 1 2\n\
             f 1 2 3 4\nf 1 2 3 # trailing comment\n"
        );
        let model = parse(&source).unwrap();
        assert_eq!(model.positions().len(), 4);
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn truncated_vertex_reports_last_token() {
        let err = parse("v 1 2 x\n").unwrap_err();
        match err {
            LoadError::MalformedToken { found, line, .. } => {
                assert_eq!(found, "x");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn materials_come_from_libraries_next_to_the_model() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sub = dir.path().join("crate");
        fs::create_dir(&sub).unwrap();
        fs::write(
            sub.join("crate.mtl"),
            "newmtl wood\nKd 0.5 0.3 0.1\nmap_Kd wood.png\nnewmtl metal\nKs 1 1 1\n",
        )
        .unwrap();
        fs::write(sub.join("trim.mtl"), "newmtl trim\nmap_Kd wood.png\n").unwrap();
        fs::write(
            sub.join("crate.obj"),
            format!(
                "mtllib crate.mtl trim.mtl\n{TRIANGLE}usemtl metal\nf 1 2 3\n\
                 usemtl wood\nf 1 2 3\nusemtl trim\nf 1 2 3\n"
            ),
        )
        .unwrap();

        let loader = RecordingLoader::default();
        let model = Model::from_file(dir.path(), "crate/crate.obj", &loader).unwrap();
        assert_eq!(model.name(), "crate/crate.obj");
        assert_eq!(loader.call_count(), 1);
        assert_eq!(*loader.calls.borrow(), vec![sub.join("wood.png")]);
        assert_eq!(model.textures().len(), 1);

        let triangles = &model.groups()[0].triangles;
        let ids: Vec<_> = triangles.iter().map(|t| t.material).collect();
        assert_eq!(ids, [Some(1), Some(0), Some(2)]);
        assert_eq!(model.material(0).unwrap().diffuse_map, Some(0));
        assert_eq!(model.material(2).unwrap().diffuse_map, Some(0));
    }

    #[test]
    fn missing_material_library_is_unresolved() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("lonely.obj"), "mtllib nowhere.mtl\n").unwrap();
        let loader = RecordingLoader::default();
        let err = Model::from_file(dir.path(), "lonely.obj", &loader).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnresolvedReference {
                kind: "material library",
                ..
            }
        ));
    }

    #[test]
    fn missing_texture_is_reported_against_the_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("ok.mtl"), "newmtl a\nmap_Kd absent.png\n").unwrap();
        fs::write(dir.path().join("m.obj"), "mtllib ok.mtl\n").unwrap();
        let err = Model::from_file(dir.path(), "m.obj", &ImageTextureLoader).unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err:?}");
        match err {
            LoadError::Io { path, .. } => assert_eq!(path, dir.path().join("absent.png")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_material_library_fails_the_model() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("bad.mtl"), "newmtl a\nKa red\n").unwrap();
        fs::write(dir.path().join("bad.obj"), "mtllib bad.mtl\n").unwrap();
        let loader = RecordingLoader::default();
        let err = Model::from_file(dir.path(), "bad.obj", &loader).unwrap_err();
        match err {
            LoadError::MalformedToken { path, .. } => assert!(path.ends_with("bad.mtl")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_model_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loader = RecordingLoader::default();
        let err = Model::from_file(dir.path(), "nope.obj", &loader).unwrap_err();
        assert!(err.is_not_found());
    }
}
