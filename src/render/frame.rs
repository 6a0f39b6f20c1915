use rayon::prelude::*;

use crate::{
    camera::rig::{CameraBasis, CameraParams},
    foundation::{
        core::RenderParams,
        error::{FlightError, FlightResult},
    },
    render::sample::pixel_ray,
    scene::field::Scene,
};

/// A rendered frame: `width * height * 3` bytes, row-major, (B,G,R) per pixel.
///
/// The blue-first channel order is the wire convention of the original renderer
/// and is preserved end to end; convert with [`FrameBgr::to_rgb8`] before
/// handing pixels to RGB consumers such as PNG encoders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBgr {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameBgr {
    /// Copy of the pixel data with channels swapped to (R,G,B).
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        out
    }
}

/// Render every pixel of a frame into a fresh buffer.
#[tracing::instrument(skip(scene, camera, params), fields(w = params.width, h = params.height))]
pub fn render_frame(
    scene: &dyn Scene,
    camera: &CameraParams,
    params: &RenderParams,
) -> FlightResult<FrameBgr> {
    let mut data = vec![0u8; params.pixel_count() * 3];
    render_frame_into(scene, camera, params, &mut data)?;
    Ok(FrameBgr {
        width: params.width,
        height: params.height,
        data,
    })
}

/// Render every pixel of a frame into a caller-provided buffer of exactly
/// `width * height * 3` bytes.
///
/// Rows are distributed across the rayon pool; each row is a disjoint `&mut`
/// chunk of the buffer, so worker threads never share output bytes. Work
/// stealing absorbs the spatial variation in march cost the same way the
/// original's guided row scheduling did.
pub fn render_frame_into(
    scene: &dyn Scene,
    camera: &CameraParams,
    params: &RenderParams,
    out: &mut [u8],
) -> FlightResult<()> {
    params.validate()?;
    let expected = params.pixel_count() * 3;
    if out.len() != expected {
        return Err(FlightError::validation(format!(
            "output buffer is {} bytes, expected {expected}",
            out.len()
        )));
    }

    let basis = CameraBasis::new(camera, params);
    let eps = params.eps();
    let origin = basis.origin();
    let row_bytes = params.width as usize * 3;

    out.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(j, row)| {
            let j = j as u32;
            for i in 0..params.width {
                let dir = pixel_ray(&basis, i, j);
                let sample = scene.ray_march(params, origin, dir, eps);
                let color = scene.shade(&sample, params, origin, dir);

                let k = i as usize * 3;
                row[k] = scale_channel(color.z);
                row[k + 1] = scale_channel(color.y);
                row[k + 2] = scale_channel(color.x);
            }
        });

    Ok(())
}

fn scale_channel(v: f64) -> u8 {
    (v * 255.0).clamp(0.0, 255.0) as u8
}
