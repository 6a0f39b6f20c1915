use glam::DVec3;

use crate::foundation::core::RenderParams;

/// A camera pose: where the camera sits, what it looks at and how wide it sees.
///
/// `fov` is the half-width of the far plane at unit distance along the view
/// direction; `fov = 1` therefore gives a 90-degree half-angle. The orientation
/// frame derived from a pose lives in [`CameraBasis`], rebuilt per pose rather
/// than cached here, so a mutated pose can never be sampled against a stale
/// basis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraParams {
    pub pos: DVec3,
    pub target: DVec3,
    pub fov: f64,
}

impl CameraParams {
    pub fn new(pos: DVec3, target: DVec3, fov: f64) -> Self {
        Self { pos, target, fov }
    }

    /// Unit look direction. Falls back to +Z when `pos == target`.
    pub fn look_dir(&self) -> DVec3 {
        (self.target - self.pos).normalize_or(DVec3::Z)
    }
}

/// Orthonormal view frame plus far-plane spans, derived from a pose and the
/// image dimensions. This is the projection state the original renderer
/// recomputed before sampling each new pose.
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    origin: DVec3,
    forward: DVec3,
    plane_right: DVec3,
    plane_up: DVec3,
    width: u32,
    height: u32,
}

const WORLD_UP: DVec3 = DVec3::new(0.0, 1.0, 0.0);

impl CameraBasis {
    pub fn new(camera: &CameraParams, params: &RenderParams) -> Self {
        let forward = camera.look_dir();
        // Degenerate when looking straight up or down.
        let right = forward.cross(WORLD_UP).normalize_or(DVec3::X);
        let up = right.cross(forward);

        let aspect = f64::from(params.width) / f64::from(params.height);
        Self {
            origin: camera.pos,
            forward,
            plane_right: right * camera.fov * aspect,
            plane_up: up * camera.fov,
            width: params.width,
            height: params.height,
        }
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn forward(&self) -> DVec3 {
        self.forward
    }

    /// Map a pixel to the point on the far plane its ray passes through.
    ///
    /// Pixel centers are sampled; `j` grows downward in the image, so the
    /// vertical NDC axis is flipped.
    pub fn unproject(&self, i: u32, j: u32) -> DVec3 {
        let ndc_x = 2.0 * (f64::from(i) + 0.5) / f64::from(self.width) - 1.0;
        let ndc_y = 1.0 - 2.0 * (f64::from(j) + 0.5) / f64::from(self.height);
        self.origin + self.forward + self.plane_right * ndc_x + self.plane_up * ndc_y
    }
}
