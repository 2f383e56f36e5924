//! Scene aggregate consumed by [`Renderer::draw`](crate::render::Renderer::draw).
//!
//! The scene is only mutated between frames; `draw` borrows it immutably.

use crate::camera::Camera;
use crate::light::PointLight;
use crate::math::Vec3;
use crate::mesh::Mesh;
use crate::projection::Projection;

/// Anything that can be added to a [`Scene`].
#[derive(Debug, Clone)]
pub enum Drawable {
    Mesh(Mesh),
    Light(PointLight),
}

impl From<Mesh> for Drawable {
    fn from(mesh: Mesh) -> Self {
        Drawable::Mesh(mesh)
    }
}

impl From<PointLight> for Drawable {
    fn from(light: PointLight) -> Self {
        Drawable::Light(light)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<Mesh>,
    lights: Vec<PointLight>,
    camera: Option<Camera>,
    ambient_intensity: Vec3,
    projection: Projection,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            lights: Vec::new(),
            camera: None,
            ambient_intensity: Vec3::splat(10.0),
            projection: Projection::default(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh or a light.
    pub fn add(&mut self, drawable: impl Into<Drawable>) {
        match drawable.into() {
            Drawable::Mesh(mesh) => self.meshes.push(mesh),
            Drawable::Light(light) => self.lights.push(light),
        }
    }

    /// Replace every mesh with `mesh`.
    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.meshes.clear();
        self.meshes.push(mesh);
    }

    /// Remove the first mesh called `name`, returning it.
    pub fn remove_mesh(&mut self, name: &str) -> Option<Mesh> {
        let index = self.meshes.iter().position(|m| m.name() == name)?;
        Some(self.meshes.remove(index))
    }

    pub fn clear_meshes(&mut self) {
        self.meshes.clear();
    }

    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|m| m.name() == name)
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn ambient_intensity(&self) -> Vec3 {
        self.ambient_intensity
    }

    pub fn set_ambient_intensity(&mut self, intensity: Vec3) {
        self.ambient_intensity = intensity;
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn add_routes_drawables() {
        let mut scene = Scene::new();
        scene.add(Mesh::cube(Material::default()));
        scene.add(PointLight::new(Vec3::ONE, Vec3::splat(50.0)));
        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.triangle_count(), 12);
    }

    #[test]
    fn set_mesh_replaces_and_remove_finds_by_name() {
        let mut scene = Scene::new();
        scene.add(Mesh::cube(Material::default()));
        scene.add(Mesh::cube(Material::default()));
        scene.set_mesh(Mesh::new("floor", Vec::new(), Material::default()));
        assert_eq!(scene.meshes().len(), 1);

        assert!(scene.remove_mesh("cube").is_none());
        assert_eq!(scene.remove_mesh("floor").map(|m| m.name().to_string()), Some("floor".into()));
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn defaults_match_the_demo_lighting() {
        let scene = Scene::default();
        assert!(scene.camera().is_none());
        assert_eq!(scene.ambient_intensity(), Vec3::splat(10.0));
    }
}
