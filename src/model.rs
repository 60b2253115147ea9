//! Wavefront OBJ/MTL loading
//!
//! Reads positions, texture coordinates, normals and polygon faces grouped by
//! material. Indices are stored zero-based with -1 marking an absent
//! component. Polygons are kept as written and fanned into triangles when the
//! model is drawn.

use std::fs;
use std::path::{Path, PathBuf};

use crate::present::{is_front_facing, project_vertex, shade_color};
use crate::rasterizer::{
    draw_triangle, draw_triangle_wide, BlendMode, Color, DepthBuffer, Image, Matrix3x3,
    RasterSettings, Real, Sampler, Texture, Vector2, Vector3, Vertex,
};

/// Error type for model loading
#[derive(Debug)]
pub enum ModelError {
    IoError(std::io::Error),
    ParseError { line: usize, message: String },
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::IoError(e)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::IoError(e) => write!(f, "IO error: {}", e),
            ModelError::ParseError { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for ModelError {}

fn parse_error(line: usize, message: impl Into<String>) -> ModelError {
    ModelError::ParseError { line, message: message.into() }
}

/// Material name used for faces that precede any `usemtl`
pub const DEFAULT_MATERIAL: &str = "default";

/// Zero-based references into the model arrays, -1 when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub v: i32,
    pub t: i32,
    pub n: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    pub indices: Vec<Index>,
}

impl Face {
    /// Fan triangulation around the first index.
    pub fn triangles(&self) -> impl Iterator<Item = [Index; 3]> + '_ {
        let i = &self.indices;
        (1..i.len().saturating_sub(1)).map(move |t| [i[0], i[t], i[t + 1]])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Color,
    /// Diffuse map, resolved against the directory of the MTL file
    pub texture: Option<PathBuf>,
    pub faces: Vec<Face>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: Color::WHITE,
            texture: None,
            faces: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub positions: Vec<Vector3>,
    pub texcoords: Vec<Vector2>,
    pub normals: Vec<Vector3>,
    pub materials: Vec<Material>,
}

fn parse_reals<const N: usize>(
    words: &mut std::str::SplitWhitespace,
    line: usize,
) -> Result<[Real; N], ModelError> {
    let mut out = [Real::ZERO; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let word = words
            .next()
            .ok_or_else(|| parse_error(line, format!("expected {} numbers, found {}", N, i)))?;
        let f: f32 = word
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number '{}'", word)))?;
        *slot = Real::from_f32(f);
    }
    Ok(out)
}

/// Resolves one 1-based (or negative, relative) OBJ index against `count`
/// elements. An empty field is absent.
fn resolve_index(field: Option<&str>, count: usize, line: usize) -> Result<i32, ModelError> {
    let field = match field {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(-1),
    };
    let i: i64 = field
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{}'", field)))?;
    let resolved = if i < 0 { count as i64 + i } else { i - 1 };
    if resolved < 0 || resolved >= count as i64 {
        return Err(parse_error(line, format!("index {} out of range ({} defined)", i, count)));
    }
    Ok(resolved as i32)
}

fn parse_index(word: &str, model: &Model, line: usize) -> Result<Index, ModelError> {
    let mut parts = word.split('/');
    let v = resolve_index(parts.next(), model.positions.len(), line)?;
    if v < 0 {
        return Err(parse_error(line, format!("face vertex '{}' has no position", word)));
    }
    let t = resolve_index(parts.next(), model.texcoords.len(), line)?;
    let n = resolve_index(parts.next(), model.normals.len(), line)?;
    Ok(Index { v, t, n })
}

fn find_or_add_material(materials: &mut Vec<Material>, name: &str) -> usize {
    match materials.iter().position(|m| m.name == name) {
        Some(i) => i,
        None => {
            materials.push(Material::new(name));
            materials.len() - 1
        }
    }
}

fn rest_of_line<'a>(line: &'a str, directive: &str) -> &'a str {
    line.trim_start()[directive.len()..].trim()
}

/// Parses MTL source. Texture paths are resolved against `dir`.
pub fn parse_mtl(src: &str, dir: &Path) -> Result<Vec<Material>, ModelError> {
    let mut materials: Vec<Material> = Vec::new();

    for (i, text) in src.lines().enumerate() {
        let line = i + 1;
        let mut words = text.split_whitespace();
        let Some(directive) = words.next() else { continue };
        match directive {
            "newmtl" => {
                let name = rest_of_line(text, directive);
                if name.is_empty() {
                    return Err(parse_error(line, "newmtl without a name"));
                }
                materials.push(Material::new(name));
            }
            "Kd" | "map_Kd" => {
                let Some(current) = materials.last_mut() else {
                    return Err(parse_error(line, format!("{} before newmtl", directive)));
                };
                if directive == "Kd" {
                    let [r, g, b] = parse_reals::<3>(&mut words, line)?;
                    let channel = |x: Real| (x.clamp(Real::ZERO, Real::ONE) * 255).to_int() as u8;
                    current.diffuse = Color::with_blend(channel(r), channel(g), channel(b), BlendMode::Solid);
                } else {
                    current.texture = Some(dir.join(rest_of_line(text, directive)));
                }
            }
            _ => {}
        }
    }
    Ok(materials)
}

/// Parses OBJ source. `mtllib` files are read relative to `dir`.
pub fn parse_obj(src: &str, dir: &Path) -> Result<Model, ModelError> {
    let mut model = Model::default();
    let mut current: Option<usize> = None;

    for (i, text) in src.lines().enumerate() {
        let line = i + 1;
        let mut words = text.split_whitespace();
        let Some(directive) = words.next() else { continue };
        match directive {
            "v" => {
                let [x, y, z] = parse_reals::<3>(&mut words, line)?;
                model.positions.push(Vector3::new(x, y, z));
            }
            "vt" | "t" => {
                let [u, v] = parse_reals::<2>(&mut words, line)?;
                model.texcoords.push(Vector2::new(u, v));
            }
            "vn" | "n" => {
                let [x, y, z] = parse_reals::<3>(&mut words, line)?;
                model.normals.push(Vector3::new(x, y, z));
            }
            "f" => {
                let indices = words
                    .map(|w| parse_index(w, &model, line))
                    .collect::<Result<Vec<_>, _>>()?;
                if indices.len() < 3 {
                    return Err(parse_error(line, "face needs at least 3 vertices"));
                }
                let m = match current {
                    Some(m) => m,
                    None => {
                        let m = find_or_add_material(&mut model.materials, DEFAULT_MATERIAL);
                        current = Some(m);
                        m
                    }
                };
                model.materials[m].faces.push(Face { indices });
            }
            "usemtl" => {
                let name = rest_of_line(text, directive);
                if !model.materials.iter().any(|m| m.name == name) {
                    log::warn!("Line {}: unknown material '{}', using default", line, name);
                    current = Some(find_or_add_material(&mut model.materials, DEFAULT_MATERIAL));
                } else {
                    current = Some(find_or_add_material(&mut model.materials, name));
                }
            }
            "mtllib" => {
                let path = dir.join(rest_of_line(text, directive));
                let mtl_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                let contents = fs::read_to_string(&path)?;
                for material in parse_mtl(&contents, &mtl_dir)? {
                    match model.materials.iter_mut().find(|m| m.name == material.name) {
                        Some(existing) => {
                            existing.diffuse = material.diffuse;
                            existing.texture = material.texture;
                        }
                        None => model.materials.push(material),
                    }
                }
            }
            "g" | "o" | "s" => {}
            d if d.starts_with('#') => {}
            d => log::debug!("Line {}: skipped '{}'", line, d),
        }
    }

    // materials that never received a face are not worth drawing
    model.materials.retain(|m| !m.faces.is_empty());
    Ok(model)
}

/// Loads an OBJ file and any material libraries it references.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let model = parse_obj(&contents, &dir)?;
    log::info!(
        "Loaded {}: {} positions, {} materials, {} faces",
        path.display(),
        model.positions.len(),
        model.materials.len(),
        model.face_count()
    );
    Ok(model)
}

impl Model {
    pub fn face_count(&self) -> usize {
        self.materials.iter().map(|m| m.faces.len()).sum()
    }

    /// Moves the bounding box center to the origin and scales the largest
    /// extent to 4 units.
    pub fn center(&mut self) {
        let Some(&first) = self.positions.first() else { return };
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let mid = (min + max) / 2;
        let size = max - min;
        let extent = size.x.max(size.y).max(size.z);
        let scale = if extent > Real::ZERO { Real::from_int(4) / extent } else { Real::ONE };
        for p in &mut self.positions {
            *p = (*p - mid) * scale;
        }
    }

    /// Distance from the origin to the farthest position.
    pub fn radius(&self) -> Real {
        self.positions.iter().fold(Real::ZERO, |r, p| r.max(p.len()))
    }

    /// Loads each material's diffuse map. Missing or unreadable maps are
    /// logged and left out.
    pub fn load_textures(&self) -> Vec<Option<Texture>> {
        self.materials
            .iter()
            .map(|m| {
                let path = m.texture.as_ref()?;
                match Texture::load(path) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        log::warn!("Material '{}': {}", m.name, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn position(&self, i: i32) -> Option<Vector3> {
        self.positions.get(usize::try_from(i).ok()?).copied()
    }

    fn texcoord(&self, i: i32) -> Vector2 {
        usize::try_from(i)
            .ok()
            .and_then(|i| self.texcoords.get(i).copied())
            .unwrap_or(Vector2::ZERO)
    }

    fn normal(&self, i: i32) -> Option<Vector3> {
        self.normals.get(usize::try_from(i).ok()?).copied()
    }

    /// Rotates, offsets, shades and draws every front-facing triangle.
    /// Triangles with a vertex behind the eye are skipped. Returns the
    /// number of triangles submitted.
    pub fn draw(
        &self,
        dst: &mut Image,
        mut zbuf: Option<&mut DepthBuffer>,
        rot: &Matrix3x3,
        offset: Vector3,
        textures: &[Option<Texture>],
        settings: &RasterSettings,
        wide: bool,
    ) -> usize {
        let eye = Vector3::new(Real::ZERO, Real::ZERO, Real::from_int(-1));
        let (width, height) = (dst.width(), dst.height());
        let mut count = 0;

        for (mi, material) in self.materials.iter().enumerate() {
            let tex = textures.get(mi).and_then(|t| t.as_ref()).map(|t| t as &dyn Sampler);
            for face in &material.faces {
                for tri in face.triangles() {
                    let (Some(pa), Some(pb), Some(pc)) =
                        (self.position(tri[0].v), self.position(tri[1].v), self.position(tri[2].v))
                    else {
                        continue;
                    };
                    let view = [pa * *rot + offset, pb * *rot + offset, pc * *rot + offset];
                    if view.iter().any(|v| v.z <= Real::ZERO) {
                        continue;
                    }

                    let face_normal = (view[2] - view[0]).cross(view[1] - view[0]).normalize();
                    let verts: [Vertex; 3] = std::array::from_fn(|k| {
                        let n = self.normal(tri[k].n).map(|n| n * *rot).unwrap_or(face_normal);
                        Vertex::new(
                            project_vertex(view[k], width, height),
                            self.texcoord(tri[k].t),
                            shade_color(material.diffuse, eye.dot(n)),
                        )
                    });

                    if !is_front_facing(verts[0].v, verts[1].v, verts[2].v) {
                        continue;
                    }
                    let [a, b, c] = &verts;
                    if wide {
                        draw_triangle_wide(dst, zbuf.as_deref_mut(), a, b, c, tex, settings);
                    } else {
                        draw_triangle(dst, zbuf.as_deref_mut(), a, b, c, tex, settings);
                    }
                    count += 1;
                }
            }
        }
        count
    }
}
