//! The render context.
//!
//! [`Renderer`] owns the sample buffer, the back and presented frames, the
//! active shaders and the worker pool. Each [`draw`](Renderer::draw):
//!
//! 1. builds per-mesh matrices and moves the lights into view space,
//! 2. clears the sample buffer,
//! 3. runs the configured schedule,
//! 4. resolves samples into the back frame and swaps it to the front.

use std::mem;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::framebuffer::Frame;
use super::rasterizer::FragmentStage;
use super::samples::SampleBuffer;
use super::scheduler::{self, DrawPlan, MeshJob};
use super::stats::FrameStats;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::light::PointLight;
use crate::scene::Scene;
use crate::shader::{FragmentShader, PerspectiveShader, PhongShader, ShadeContext, TransformContext, VertexShader};

pub struct Renderer {
    config: RenderConfig,
    samples: SampleBuffer,
    back: Frame,
    front: Frame,
    fragment_shader: Arc<dyn FragmentShader>,
    vertex_shader: Arc<dyn VertexShader>,
    pool: ThreadPool,
    last_stats: FrameStats,
}

fn build_pool(threads: usize) -> Result<ThreadPool, RenderError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("raster-{i}"))
        .build()
        .map_err(|e| RenderError::InvalidConfig(format!("failed to start worker pool: {e}")))
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let threads = config.thread_count();
        log::debug!(
            "renderer {}x{}, {} samples per axis, {:?} on {} threads",
            config.width,
            config.height,
            config.samples_per_axis(),
            config.schedule,
            threads
        );
        Ok(Self {
            samples: SampleBuffer::new(config.width, config.height, config.samples_per_axis(), config.clear_color),
            back: Frame::new(config.width, config.height, config.clear_color),
            front: Frame::new(config.width, config.height, config.clear_color),
            fragment_shader: Arc::new(PhongShader),
            vertex_shader: Arc::new(PerspectiveShader),
            pool: build_pool(threads)?,
            last_stats: FrameStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Swap in a new configuration, reallocating buffers and the pool only
    /// where the change requires it.
    pub fn set_config(&mut self, config: RenderConfig) -> Result<(), RenderError> {
        config.validate()?;

        if config.thread_count() != self.config.thread_count() {
            self.pool = build_pool(config.thread_count())?;
            log::debug!("worker pool resized to {} threads", config.thread_count());
        }

        let resized = config.width != self.config.width || config.height != self.config.height;
        if resized || config.samples_per_axis() != self.config.samples_per_axis() {
            self.samples = SampleBuffer::new(config.width, config.height, config.samples_per_axis(), config.clear_color);
            log::debug!(
                "sample buffer reallocated: {}x{} samples",
                self.samples.width(),
                self.samples.height()
            );
        }
        if resized {
            self.back = Frame::new(config.width, config.height, config.clear_color);
            self.front = Frame::new(config.width, config.height, config.clear_color);
        }

        self.config = config;
        Ok(())
    }

    pub fn set_fragment_shader(&mut self, shader: impl FragmentShader + 'static) {
        self.fragment_shader = Arc::new(shader);
    }

    pub fn set_vertex_shader(&mut self, shader: impl VertexShader + 'static) {
        self.vertex_shader = Arc::new(shader);
    }

    /// The most recently presented frame.
    pub fn frame(&self) -> &Frame {
        &self.front
    }

    /// Stored depth of a sample from the last draw (sample coordinates,
    /// y up). `-inf` where nothing was drawn.
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.samples.depth(x, y)
    }

    pub fn samples_per_axis(&self) -> usize {
        self.samples.samples_per_axis()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Render `scene` and present the result.
    ///
    /// Blocks until every worker has finished. Without a camera nothing is
    /// drawn and the presented frame keeps its previous contents.
    pub fn draw(&mut self, scene: &Scene) -> Result<FrameStats, RenderError> {
        let Some(camera) = scene.camera() else {
            log::error!("draw called without a camera; frame left unchanged");
            return Err(RenderError::MissingCamera);
        };

        let view = camera.view_matrix();
        let projection = scene.projection().matrix();
        let lights: Vec<PointLight> = scene.lights().iter().map(|l| l.transformed(&view)).collect();
        let fragment: &dyn FragmentShader = self.fragment_shader.as_ref();

        let jobs: Vec<MeshJob> = scene
            .meshes()
            .iter()
            .map(|mesh| MeshJob {
                triangles: mesh.triangles(),
                transform: TransformContext::new(
                    mesh.transform().to_matrix(),
                    view,
                    projection,
                    self.config.width,
                    self.config.height,
                ),
                stage: FragmentStage::new(
                    fragment,
                    ShadeContext::new(mesh.material(), &lights, camera),
                    scene.ambient_intensity(),
                ),
            })
            .collect();

        let plan = DrawPlan {
            mode: self.config.render_mode,
            samples_per_axis: self.samples.samples_per_axis(),
            wire_color: self.config.wire_color,
            point_color: self.config.point_color,
        };

        self.samples.clear(self.config.clear_color);
        let mut stats = scheduler::run(
            self.config.schedule,
            &self.pool,
            &jobs,
            self.vertex_shader.as_ref(),
            &plan,
            &mut self.samples,
        );
        stats.triangles = scene.triangle_count();

        let (samples, back, pool) = (&mut self.samples, &mut self.back, &self.pool);
        pool.install(|| samples.resolve(back));
        mem::swap(&mut self.front, &mut self.back);

        log::debug!("frame: {stats}");
        self.last_stats = stats;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::{RenderMode, Schedule};
    use crate::material::Material;
    use crate::math::{Vec3, Vec4};
    use crate::mesh::Mesh;
    use crate::shader::{ConstantShader, FragmentPayload, VertexColorShader};
    use crate::triangle::Triangle;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    /// Vertex stage for tests that place triangles directly in screen space:
    /// keeps x and y, and caches the given z as view depth.
    struct ScreenSpace;

    impl VertexShader for ScreenSpace {
        fn transform(&self, _ctx: &TransformContext, triangle: &mut Triangle) -> bool {
            triangle.view_pos = *triangle.vertices();
            true
        }
    }

    fn screen_renderer(width: usize, height: usize, schedule: Schedule) -> Renderer {
        let config = RenderConfig::new(width, height).with_schedule(schedule).with_threads(4);
        let mut renderer = Renderer::new(config).expect("valid config");
        renderer.set_vertex_shader(ScreenSpace);
        renderer
    }

    fn screen_scene(triangles: Vec<Triangle>) -> Scene {
        let mut scene = Scene::new();
        scene.set_camera(Camera::default());
        scene.add(Mesh::new("tris", triangles, Material::default()));
        scene
    }

    fn tri(a: (f32, f32), b: (f32, f32), c: (f32, f32), z: f32, color: Vec3) -> Triangle {
        Triangle::new(Vec3::new(a.0, a.1, z), Vec3::new(b.0, b.1, z), Vec3::new(c.0, c.1, z)).with_colors([color; 3])
    }

    fn assert_close(actual: Option<Vec3>, expected: Vec3) {
        let actual = actual.expect("pixel in bounds");
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-5);
    }

    fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
        (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
    }

    #[test]
    fn missing_camera_is_an_error_and_keeps_the_frame() {
        let mut renderer = screen_renderer(8, 8, Schedule::Serial);
        let mut scene = Scene::new();
        scene.add(Mesh::cube(Material::default()));
        assert_eq!(renderer.draw(&scene), Err(RenderError::MissingCamera));
        assert!(renderer.frame().pixels().iter().all(|&p| p == Vec3::ZERO));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            Renderer::new(RenderConfig::new(0, 4)),
            Err(RenderError::InvalidConfig(_))
        ));
        let mut renderer = screen_renderer(4, 4, Schedule::Serial);
        assert!(renderer.set_config(RenderConfig::new(4, 4).with_samples(0)).is_err());
        assert_eq!(renderer.config().width, 4);
    }

    #[test]
    fn constant_triangle_covers_exactly_its_pixel_centers() {
        let (a, b, c) = ((100.0, 100.0), (200.0, 100.0), (150.0, 200.0));
        let mut renderer = screen_renderer(300, 300, Schedule::Serial);
        renderer.set_fragment_shader(ConstantShader::new(Vec3::ONE));
        renderer
            .draw(&screen_scene(vec![tri(a, b, c, -1.0, Vec3::ONE)]))
            .expect("draw");

        let frame = renderer.frame();
        for y in 0..300 {
            for x in 0..300 {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let inside = edge(a, b, p) > 0.0 && edge(b, c, p) > 0.0 && edge(c, a, p) > 0.0;
                let on_hull = edge(a, b, p) >= 0.0 && edge(b, c, p) >= 0.0 && edge(c, a, p) >= 0.0;
                let lit = frame.pixel(x, y) == Some(Vec3::ONE);
                if inside {
                    assert!(lit, "({x}, {y}) should be covered");
                }
                if !on_hull {
                    assert!(!lit, "({x}, {y}) lies outside the triangle");
                }
            }
        }
        assert!(renderer.last_stats().samples_shaded > 4_000);
    }

    #[test]
    fn nearer_triangle_wins_in_either_order() {
        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let near = tri((10.0, 10.0), (50.0, 10.0), (30.0, 50.0), -1.0, red);
        let far = tri((5.0, 5.0), (60.0, 5.0), (30.0, 60.0), -5.0, blue);

        for order in [vec![far, near], vec![near, far]] {
            let mut renderer = screen_renderer(64, 64, Schedule::Serial);
            renderer.set_fragment_shader(VertexColorShader);
            renderer.draw(&screen_scene(order)).expect("draw");
            let frame = renderer.frame();
            assert_close(frame.pixel(30, 20), red);
            assert_close(frame.pixel(30, 55), blue);
            assert_relative_eq!(renderer.depth(30, 20).unwrap_or_default(), -1.0, epsilon = 1e-5);
            assert_relative_eq!(renderer.depth(30, 55).unwrap_or_default(), -5.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn zero_area_triangle_draws_nothing() {
        let mut renderer = screen_renderer(32, 32, Schedule::Serial);
        let stats = renderer
            .draw(&screen_scene(vec![tri((1.0, 9.0), (10.0, 9.0), (20.0, 9.0), -1.0, Vec3::ONE)]))
            .expect("draw");
        assert_eq!(stats.samples_shaded, 0);
        assert_eq!(stats.culled, 1);
        assert!(renderer.frame().pixels().iter().all(|&p| p == Vec3::ZERO));
    }

    #[test]
    fn one_sample_per_axis_matches_no_anti_aliasing() {
        let scene = screen_scene(vec![
            tri((3.3, 2.1), (40.7, 9.9), (20.2, 38.6), -2.0, Vec3::new(0.2, 0.7, 0.4)),
            tri((0.0, 30.0), (45.0, 20.0), (44.0, 44.0), -3.0, Vec3::new(0.9, 0.1, 0.3)),
        ]);
        let mut plain = screen_renderer(48, 48, Schedule::Serial);
        plain.set_fragment_shader(VertexColorShader);
        plain.draw(&scene).expect("draw");

        let mut aa = screen_renderer(48, 48, Schedule::Serial);
        aa.set_config(aa.config().with_anti_aliasing(true).with_samples(1).with_schedule(Schedule::Serial))
            .expect("valid");
        aa.set_fragment_shader(VertexColorShader);
        aa.draw(&scene).expect("draw");

        assert_eq!(plain.frame(), aa.frame());
    }

    #[test]
    fn supersampling_softens_edges() {
        let scene = screen_scene(vec![tri((0.0, 0.0), (16.0, 0.0), (0.0, 16.0), -1.0, Vec3::ONE)]);
        let mut renderer = screen_renderer(16, 16, Schedule::Serial);
        renderer
            .set_config(RenderConfig::new(16, 16).with_anti_aliasing(true).with_samples(4).with_schedule(Schedule::Serial))
            .expect("valid");
        renderer.set_vertex_shader(ScreenSpace);
        renderer.set_fragment_shader(ConstantShader::new(Vec3::ONE));
        renderer.draw(&scene).expect("draw");

        assert_eq!(renderer.samples_per_axis(), 4);
        assert_eq!(renderer.frame().pixel(2, 2), Some(Vec3::ONE));
        // Pixel straddling the hypotenuse: partially covered
        let edge_pixel = renderer.frame().pixel(7, 8).map(|c| c.x).unwrap_or_default();
        assert!(edge_pixel > 0.0 && edge_pixel < 1.0, "{edge_pixel}");
    }

    #[test]
    fn interpolated_position_reprojects_to_the_sample() {
        let width = 64;
        let height = 64;
        let mut renderer = Renderer::new(RenderConfig::new(width, height).with_schedule(Schedule::Serial))
            .expect("valid config");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        renderer.set_fragment_shader(move |p: &FragmentPayload, _: &ShadeContext| {
            sink.lock().unwrap().push((p.view_pos, p.screen_pos));
            Vec3::ONE
        });

        // Strongly slanted in depth
        let mut scene = Scene::new();
        scene.set_camera(Camera::default());
        scene.add(Mesh::new(
            "slope",
            vec![Triangle::new(
                Vec3::new(-1.0, -1.0, -1.5),
                Vec3::new(4.0, -1.0, -8.0),
                Vec3::new(-1.0, 1.5, -2.0),
            )],
            Material::default(),
        ));
        renderer.draw(&scene).expect("draw");

        let projection = scene.projection().matrix();
        let samples = seen.lock().unwrap();
        assert!(samples.len() > 50);
        for &(view_pos, screen) in samples.iter() {
            let clip = projection * Vec4::point(view_pos);
            let sx = (clip.x / clip.w + 1.0) * 0.5 * width as f32;
            let sy = (clip.y / clip.w + 1.0) * 0.5 * height as f32;
            assert_relative_eq!(sx, screen.x, epsilon = 1e-2);
            assert_relative_eq!(sy, screen.y, epsilon = 1e-2);
        }
    }

    #[test]
    fn schedules_produce_identical_frames() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::new(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO, Vec3::UP));
        scene.add(PointLight::new(Vec3::new(2.0, 3.0, 3.0), Vec3::splat(20.0)));
        let mut cube = Mesh::cube(Material::default());
        cube.transform_mut().rotate_y_degrees(30.0);
        scene.add(cube);
        let mut back = Mesh::cube(Material::default());
        back.transform_mut().set_position(Vec3::new(0.7, 0.3, -1.9)).set_scale_uniform(0.8);
        scene.add(back);

        let render = |schedule: Schedule, aa: bool| {
            let config = RenderConfig::new(96, 72)
                .with_schedule(schedule)
                .with_threads(4)
                .with_anti_aliasing(aa);
            let mut renderer = Renderer::new(config).expect("valid config");
            let stats = renderer.draw(&scene).expect("draw");
            (renderer.frame().clone(), stats)
        };

        for aa in [false, true] {
            let (serial, serial_stats) = render(Schedule::Serial, aa);
            let (tiles, tiles_stats) = render(Schedule::Tiles, aa);
            let (queue, queue_stats) = render(Schedule::WorkQueue, aa);
            assert_eq!(serial, tiles);
            assert_eq!(serial, queue);
            assert_eq!(serial_stats, tiles_stats);
            assert_eq!(serial_stats.culled, queue_stats.culled);
            assert_eq!(serial_stats.triangles, 24);
            assert!(serial.pixels().iter().any(|&p| p != Vec3::ZERO));
        }
    }

    #[test]
    fn wireframe_and_points_ignore_depth() {
        let scene = screen_scene(vec![tri((2.0, 2.0), (20.0, 2.0), (10.0, 20.0), -1.0, Vec3::ONE)]);
        let green = Vec3::new(0.0, 1.0, 0.0);
        for schedule in [Schedule::Serial, Schedule::Tiles, Schedule::WorkQueue] {
            let mut renderer = screen_renderer(24, 24, schedule);
            let config = renderer.config().with_render_mode(RenderMode::Edge).with_wire_color(green);
            renderer.set_config(config).expect("valid");
            renderer.draw(&scene).expect("draw");
            assert_eq!(renderer.frame().pixel(10, 2), Some(green));
            assert_eq!(renderer.frame().pixel(10, 10), Some(Vec3::ZERO));
            assert_eq!(renderer.depth(10, 2), Some(f32::NEG_INFINITY));

            let config = renderer.config().with_render_mode(RenderMode::Vertex).with_point_color(green);
            renderer.set_config(config).expect("valid");
            renderer.draw(&scene).expect("draw");
            assert_eq!(renderer.frame().pixel(2, 2), Some(green));
            assert_eq!(renderer.frame().pixel(10, 2), Some(Vec3::ZERO));
        }
    }

    #[test]
    fn wireframe_with_a_vertex_at_the_eye_plane_is_clipped() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::default());
        scene.add(Mesh::new(
            "grazing",
            vec![Triangle::new(
                Vec3::new(-1.0, -1.0, -5.0),
                Vec3::new(1.0, -1.0, -5.0),
                Vec3::new(10000.0, 0.0, -0.00002),
            )],
            Material::default(),
        ));
        let green = Vec3::new(0.0, 1.0, 0.0);
        for schedule in [Schedule::Serial, Schedule::Tiles, Schedule::WorkQueue] {
            let config = RenderConfig::new(16, 16)
                .with_schedule(schedule)
                .with_threads(2)
                .with_render_mode(RenderMode::Edge)
                .with_wire_color(green);
            let mut renderer = Renderer::new(config).expect("valid config");
            let stats = renderer.draw(&scene).expect("draw");
            assert_eq!(stats.unprojectable, 0);
            assert!(renderer.frame().pixels().iter().any(|&p| p == green));
        }
    }

    #[test]
    fn triangle_behind_the_camera_is_counted_not_drawn() {
        let mut renderer = Renderer::new(RenderConfig::new(16, 16).with_threads(2)).expect("valid config");
        let mut scene = Scene::new();
        scene.set_camera(Camera::default());
        scene.add(Mesh::new(
            "behind",
            vec![Triangle::new(Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, -1.0, 2.0), Vec3::new(0.0, 1.0, 2.0))],
            Material::default(),
        ));
        let stats = renderer.draw(&scene).expect("draw");
        assert_eq!(stats.unprojectable, 1);
        assert_eq!(stats.samples_shaded, 0);
        assert!(renderer.frame().pixels().iter().all(|p| p.is_finite()));
    }
}
