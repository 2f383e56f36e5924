//! Distributes triangles over the worker pool.
//!
//! Three schedules share one per-triangle pipeline (vertex stage, cull,
//! rasterize):
//!
//! - `Serial` runs it on the calling thread with exclusive buffer access.
//! - `WorkQueue` spawns one task per worker; each pulls triangle indices from
//!   an atomic cursor and writes through row locks.
//! - `Tiles` projects every triangle up front, then hands each worker a band
//!   of rows to draw every triangle into, in submission order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use rayon::ThreadPool;

use super::rasterizer::{draw_outline, draw_points, fill_triangle, FragmentStage};
use super::samples::{SampleBuffer, SampleTarget};
use super::stats::FrameStats;
use crate::config::{RenderMode, Schedule};
use crate::math::Vec3;
use crate::shader::{TransformContext, VertexShader};
use crate::triangle::Triangle;

/// Bands per worker in tile mode, so fast workers can pick up slack.
const BANDS_PER_THREAD: usize = 4;

/// One mesh's worth of work for a frame.
pub(crate) struct MeshJob<'a> {
    pub triangles: &'a [Triangle],
    pub transform: TransformContext,
    pub stage: FragmentStage<'a>,
}

/// Frame-wide drawing settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DrawPlan {
    pub mode: RenderMode,
    pub samples_per_axis: usize,
    pub wire_color: Vec3,
    pub point_color: Vec3,
}

/// Draw an already projected triangle.
fn draw_projected<T: SampleTarget + ?Sized>(
    triangle: &Triangle,
    stage: &FragmentStage,
    plan: &DrawPlan,
    target: &mut T,
    stats: &mut FrameStats,
) {
    let n = plan.samples_per_axis;
    match plan.mode {
        RenderMode::Face => stats.record(fill_triangle(triangle, n, target, stage)),
        RenderMode::Edge => draw_outline(triangle, n, target, plan.wire_color),
        RenderMode::Vertex => draw_points(triangle, n, target, plan.point_color),
    }
}

/// Vertex stage plus cull. `None` means nothing should be drawn.
fn project(triangle: &Triangle, job: &MeshJob, vertex: &dyn VertexShader, plan: &DrawPlan, stats: &mut FrameStats) -> Option<Triangle> {
    let mut t = *triangle;
    if !vertex.transform(&job.transform, &mut t) {
        stats.unprojectable += 1;
        return None;
    }
    if plan.mode == RenderMode::Face && t.is_culled() {
        stats.culled += 1;
        return None;
    }
    Some(t)
}

fn process<T: SampleTarget + ?Sized>(
    triangle: &Triangle,
    job: &MeshJob,
    vertex: &dyn VertexShader,
    plan: &DrawPlan,
    target: &mut T,
    stats: &mut FrameStats,
) {
    if let Some(t) = project(triangle, job, vertex, plan, stats) {
        draw_projected(&t, &job.stage, plan, target, stats);
    }
}

pub(crate) fn run(
    schedule: Schedule,
    pool: &ThreadPool,
    jobs: &[MeshJob],
    vertex: &dyn VertexShader,
    plan: &DrawPlan,
    buffer: &mut SampleBuffer,
) -> FrameStats {
    match schedule {
        Schedule::Serial => serial(jobs, vertex, plan, buffer),
        Schedule::WorkQueue => work_queue(pool, jobs, vertex, plan, buffer),
        Schedule::Tiles => tiles(pool, jobs, vertex, plan, buffer),
    }
}

fn serial(jobs: &[MeshJob], vertex: &dyn VertexShader, plan: &DrawPlan, buffer: &mut SampleBuffer) -> FrameStats {
    let mut stats = FrameStats::default();
    let mut target = buffer.exclusive();
    for job in jobs {
        for triangle in job.triangles {
            process(triangle, job, vertex, plan, &mut target, &mut stats);
        }
    }
    stats
}

fn work_queue(
    pool: &ThreadPool,
    jobs: &[MeshJob],
    vertex: &dyn VertexShader,
    plan: &DrawPlan,
    buffer: &SampleBuffer,
) -> FrameStats {
    let total = Mutex::new(FrameStats::default());
    let workers = pool.current_num_threads().max(1);

    for job in jobs {
        let cursor = AtomicUsize::new(0);
        pool.scope(|s| {
            for _ in 0..workers {
                let mut target = buffer.shared();
                let (cursor, total) = (&cursor, &total);
                s.spawn(move |_| {
                    let mut stats = FrameStats::default();
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(triangle) = job.triangles.get(i) else {
                            break;
                        };
                        process(triangle, job, vertex, plan, &mut target, &mut stats);
                    }
                    *total.lock().unwrap_or_else(PoisonError::into_inner) += stats;
                });
            }
        });
    }

    total.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn tiles(
    pool: &ThreadPool,
    jobs: &[MeshJob],
    vertex: &dyn VertexShader,
    plan: &DrawPlan,
    buffer: &mut SampleBuffer,
) -> FrameStats {
    pool.install(|| {
        let mut stats = FrameStats::default();
        let mut projected = Vec::new();
        for (j, job) in jobs.iter().enumerate() {
            let results: Vec<(Option<Triangle>, FrameStats)> = job
                .triangles
                .par_iter()
                .map(|triangle| {
                    let mut stats = FrameStats::default();
                    (project(triangle, job, vertex, plan, &mut stats), stats)
                })
                .collect();
            for (t, s) in results {
                stats += s;
                projected.extend(t.map(|t| (j, t)));
            }
        }

        let height = buffer.height();
        let bands = pool.current_num_threads().max(1) * BANDS_PER_THREAD;
        let band_rows = height.div_ceil(bands).max(1);

        stats += buffer
            .bands(band_rows)
            .map(|mut target| {
                let mut stats = FrameStats::default();
                for (j, t) in &projected {
                    draw_projected(t, &jobs[*j].stage, plan, &mut target, &mut stats);
                }
                stats
            })
            .reduce(FrameStats::default, |mut a, b| {
                a += b;
                a
            });
        stats
    })
}
