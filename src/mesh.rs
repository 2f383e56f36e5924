//! Triangle meshes: the drawable unit of a [`Scene`](crate::scene::Scene).
//!
//! A [`Mesh`] owns its model-space triangles, the material they are shaded
//! with, and the model transform applied each frame.

use std::fmt;
use std::path::Path;

use crate::material::Material;
use crate::math::{Vec2, Vec3};
use crate::transform::Transform;
use crate::triangle::Triangle;

/// Error produced when importing a mesh from disk.
#[derive(Debug)]
pub enum LoadError {
    /// The OBJ parser rejected the file.
    Obj(tobj::LoadError),
    /// The file parsed but contained no triangles.
    Empty(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj(e) => write!(f, "failed to load OBJ: {e}"),
            LoadError::Empty(path) => write!(f, "'{path}' contains no triangles"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Obj(e) => Some(e),
            LoadError::Empty(_) => None,
        }
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    triangles: Vec<Triangle>,
    material: Material,
    transform: Transform,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>, material: Material) -> Self {
        Self {
            name: name.into(),
            triangles,
            material,
            transform: Transform::default(),
        }
    }

    /// Load every object in an OBJ file into a single mesh.
    ///
    /// Faces are triangulated. Missing normals, UVs or vertex colors fall back
    /// to zero normals, zero UVs and white.
    pub fn from_obj<P: AsRef<Path>>(path: P, material: Material) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options)?;

        let mut triangles = Vec::new();
        for model in &models {
            let m = &model.mesh;
            let position = |i: usize| Vec3::new(m.positions[3 * i], m.positions[3 * i + 1], m.positions[3 * i + 2]);
            let normal = |i: usize| match m.normals.get(3 * i..3 * i + 3) {
                Some(&[x, y, z]) => Vec3::new(x, y, z),
                _ => Vec3::ZERO,
            };
            let uv = |i: usize| match m.texcoords.get(2 * i..2 * i + 2) {
                Some(&[u, v]) => Vec2::new(u, v),
                _ => Vec2::ZERO,
            };
            let color = |i: usize| match m.vertex_color.get(3 * i..3 * i + 3) {
                Some(&[r, g, b]) => Vec3::new(r, g, b),
                _ => Vec3::ONE,
            };

            for face in m.indices.chunks_exact(3) {
                let idx = [face[0] as usize, face[1] as usize, face[2] as usize];
                triangles.push(
                    Triangle::new(position(idx[0]), position(idx[1]), position(idx[2]))
                        .with_normals(idx.map(normal))
                        .with_tex_coords(idx.map(uv))
                        .with_colors(idx.map(color)),
                );
            }
        }

        if triangles.is_empty() {
            return Err(LoadError::Empty(path.display().to_string()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());
        log::info!(
            "loaded '{}': {} objects, {} triangles",
            name,
            models.len(),
            triangles.len()
        );
        Ok(Self::new(name, triangles, material))
    }

    /// Axis-aligned cube spanning `[-1, 1]` with outward, counter-clockwise faces,
    /// per-face normals and a full `[0, 1]` UV square on every face.
    pub fn cube(material: Material) -> Self {
        const FACES: [(Vec3, Vec3); 6] = [
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let uvs = corners.map(|(s, t)| Vec2::new((s + 1.0) * 0.5, (t + 1.0) * 0.5));

        let mut triangles = Vec::with_capacity(12);
        for (n, v) in FACES {
            // u x v == n keeps the quad counter-clockwise seen from outside
            let u = v.cross(n);
            let p = corners.map(|(s, t)| n + u * s + v * t);
            for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
                triangles.push(
                    Triangle::new(p[a], p[b], p[c])
                        .with_normals([n; 3])
                        .with_tex_coords([uvs[a], uvs[b], uvs[c]]),
                );
            }
        }
        Self::new("cube", triangles, material)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangles_mut(&mut self) -> &mut Vec<Triangle> {
        &mut self.triangles
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_faces_wind_outward() {
        let cube = Mesh::cube(Material::default());
        assert_eq!(cube.triangles().len(), 12);
        for t in cube.triangles() {
            let [a, b, c] = *t.vertices();
            let face_normal = (b - a).cross(c - a).normalize();
            assert_relative_eq!(face_normal.dot(t.normal[0]), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn missing_obj_reports_load_error() {
        let err = Mesh::from_obj("does/not/exist.obj", Material::default()).unwrap_err();
        assert!(matches!(err, LoadError::Obj(_)));
        assert!(err.to_string().contains("failed to load OBJ"));
    }

    #[test]
    fn obj_file_becomes_triangles() {
        let path = std::env::temp_dir().join(format!("rasterpipe-quad-{}.obj", std::process::id()));
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        )
        .expect("write temp obj");

        let mesh = Mesh::from_obj(&path, Material::default()).expect("quad loads");
        let _ = std::fs::remove_file(&path);

        assert_eq!(mesh.triangles().len(), 2);
        assert!(mesh.triangles().iter().all(|t| !t.is_culled()));
        assert_eq!(mesh.triangles()[0].color[0], Vec3::ONE);
    }
}
