use glam::DVec3;

use crate::{
    camera::rig::CameraBasis,
    foundation::core::RenderParams,
    scene::field::{RaySample, Scene},
};

/// Unit ray direction from the camera through the center of pixel `(i, j)`.
pub fn pixel_ray(basis: &CameraBasis, i: u32, j: u32) -> DVec3 {
    (basis.unproject(i, j) - basis.origin()).normalize_or(basis.forward())
}

/// March the ray through pixel `(i, j)`.
///
/// This is the one sampling primitive shared by the frame renderer and the
/// statistics sampler. Pure function of its inputs; safe to call concurrently.
pub fn sample_pixel(
    scene: &dyn Scene,
    params: &RenderParams,
    basis: &CameraBasis,
    eps: f64,
    i: u32,
    j: u32,
) -> RaySample {
    let dir = pixel_ray(basis, i, j);
    scene.ray_march(params, basis.origin(), dir, eps)
}
