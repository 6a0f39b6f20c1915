//! Boxflight renders ray-marched Mandelbox frames on the CPU and plans
//! autonomous camera flights through the fractal.
//!
//! # Pipeline overview
//!
//! 1. **Sample**: `CameraBasis + (i, j) -> RaySample` (one ray march per pixel)
//! 2. **Render**: every pixel marched and shaded into a [`FrameBgr`]
//! 3. **Measure**: [`sample_stats`] reduces a frame to distance extremes plus
//!    five directional probes, without shading
//! 4. **Plan**: [`PathPlanner`] consumes those statistics frame by frame and
//!    emits one [`CameraParams`] pose per flight frame
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: sampling and planning are pure for a given
//!   scene; the statistics reduction breaks ties by pixel index so results do
//!   not depend on thread scheduling.
//! - **Injected scenes**: the march/shade strategy is a [`Scene`] trait object,
//!   so the loops run against deterministic stubs in tests and the
//!   [`Mandelbox`] in production.
//! - **Fork-join parallelism only**: renderers block until their rayon region
//!   completes; the planner is strictly sequential across frames.
#![forbid(unsafe_code)]

mod camera;
mod config;
mod foundation;
mod path;
mod render;
mod scene;

pub use camera::rig::{CameraBasis, CameraParams};
pub use config::FlightConfig;
pub use foundation::core::RenderParams;
pub use foundation::error::{FlightError, FlightResult};
pub use path::planner::{PathPlanner, PlannerConfig, plan_path};
pub use render::frame::{FrameBgr, render_frame, render_frame_into};
pub use render::pipeline::{RenderThreading, render_flight, render_frame_with};
pub use render::sample::{pixel_ray, sample_pixel};
pub use render::stats::{FrameStats, PROBE_CENTER, ProbeSample, probe_coords, sample_stats};
pub use scene::field::{RaySample, Scene};
pub use scene::mandelbox::{Mandelbox, MandelboxParams};
