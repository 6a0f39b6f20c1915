use std::time::Instant;

use crate::{
    camera::rig::CameraParams,
    foundation::{
        core::RenderParams,
        error::{FlightError, FlightResult},
    },
    render::frame::{FrameBgr, render_frame},
    scene::field::Scene,
};

/// Thread-pool configuration for the data-parallel sampling loops.
///
/// `threads: None` uses the process-wide rayon pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderThreading {
    pub threads: Option<usize>,
}

/// Render a single frame on a pool sized per `threading`.
pub fn render_frame_with(
    scene: &dyn Scene,
    camera: &CameraParams,
    params: &RenderParams,
    threading: &RenderThreading,
) -> FlightResult<FrameBgr> {
    match threading.threads {
        None => render_frame(scene, camera, params),
        Some(_) => {
            let pool = build_thread_pool(threading.threads)?;
            pool.install(|| render_frame(scene, camera, params))
        }
    }
}

/// Render one frame per pose, streaming each finished frame to `sink`.
///
/// Frames are produced strictly in pose order; only the per-pixel work inside a
/// frame is parallel. `sink` receives the frame index alongside the pixels so
/// it can name output files.
#[tracing::instrument(skip_all, fields(frames = poses.len()))]
pub fn render_flight(
    scene: &dyn Scene,
    poses: &[CameraParams],
    params: &RenderParams,
    threading: &RenderThreading,
    mut sink: impl FnMut(usize, FrameBgr) -> FlightResult<()>,
) -> FlightResult<()> {
    params.validate()?;
    let pool = match threading.threads {
        None => None,
        Some(_) => Some(build_thread_pool(threading.threads)?),
    };

    let start = Instant::now();
    for (idx, pose) in poses.iter().enumerate() {
        let frame = match &pool {
            Some(pool) => pool.install(|| render_frame(scene, pose, params))?,
            None => render_frame(scene, pose, params)?,
        };
        sink(idx, frame)?;
        tracing::info!(
            frame = idx + 1,
            total = poses.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rendered flight frame"
        );
    }
    Ok(())
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> FlightResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FlightError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FlightError::sampling(format!("failed to build rayon thread pool: {e}")))
}
