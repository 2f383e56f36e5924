//! Renders a mesh once per shader and writes each frame as a PNG.
//!
//! ```text
//! rasterpipe [model.obj] [texture.png]
//! ```
//!
//! Without a model a cube is drawn. Set `RUST_LOG=debug` for frame stats.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use rasterpipe::prelude::*;

const WIDTH: usize = 700;
const HEIGHT: usize = 700;

fn build_scene(model: Option<&str>, texture: Option<Arc<Texture>>) -> anyhow::Result<Scene> {
    let material = Material::cow(texture);
    let mut mesh = match model {
        Some(path) => Mesh::from_obj(path, material).with_context(|| format!("loading model '{path}'"))?,
        None => Mesh::cube(material),
    };
    mesh.transform_mut().rotate_y_degrees(140.0).set_scale_uniform(2.5);

    let mut scene = Scene::new();
    scene.set_camera(Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP));
    scene.set_projection(Projection::from_degrees(45.0, WIDTH as f32 / HEIGHT as f32, 0.1, 50.0));
    scene.add(mesh);
    scene.add(PointLight::new(Vec3::new(20.0, 20.0, 20.0), Vec3::splat(500.0)));
    scene.add(PointLight::new(Vec3::new(-20.0, 20.0, 0.0), Vec3::splat(500.0)));
    Ok(scene)
}

fn render(renderer: &mut Renderer, scene: &Scene, name: &str) -> anyhow::Result<()> {
    let start = Instant::now();
    let stats = renderer.draw(scene)?;
    log::info!("{name}: {stats} in {:.1?}", start.elapsed());

    let path = format!("{name}.png");
    renderer
        .frame()
        .save(&path)
        .with_context(|| format!("writing '{path}'"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let model = args.next();
    let texture = match args.next() {
        Some(path) => Some(Arc::new(
            Texture::from_file(&path).with_context(|| format!("loading texture '{path}'"))?,
        )),
        None => None,
    };
    let textured = texture.is_some();

    let scene = build_scene(model.as_deref(), texture)?;
    let mut renderer = Renderer::new(RenderConfig::new(WIDTH, HEIGHT).with_anti_aliasing(true))?;

    renderer.set_fragment_shader(NormalShader);
    render(&mut renderer, &scene, "normal")?;

    renderer.set_fragment_shader(PhongShader);
    render(&mut renderer, &scene, "phong")?;

    if textured {
        renderer.set_fragment_shader(TextureShader);
        render(&mut renderer, &scene, "texture")?;

        renderer.set_fragment_shader(BumpShader::default());
        render(&mut renderer, &scene, "bump")?;

        renderer.set_fragment_shader(DisplacementShader::default());
        render(&mut renderer, &scene, "displacement")?;
    }

    let config = renderer.config().with_render_mode(RenderMode::Edge);
    renderer.set_config(config)?;
    render(&mut renderer, &scene, "wireframe")?;

    Ok(())
}
