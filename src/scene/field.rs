use glam::DVec3;

use crate::foundation::core::RenderParams;

/// Outcome of marching one ray.
///
/// `distance` is the total distance travelled along the ray when the march
/// terminated and is always >= 0; `point` is where the march stopped. At most
/// one of `hit` / `escaped` is meaningful: a surface was found, or the ray left
/// the scene (diverged past the far limit or exhausted its step budget).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RaySample {
    pub distance: f64,
    pub point: DVec3,
    pub hit: bool,
    pub escaped: bool,
}

/// The renderable volume: a march strategy plus a color model.
///
/// The render loops are written against this trait so they can be driven by the
/// [`Mandelbox`](crate::Mandelbox) in production and by deterministic stub
/// scenes in tests. Implementations must be pure with respect to their inputs;
/// both methods are invoked concurrently from rayon workers.
pub trait Scene: Sync {
    /// Advance along `dir` (pre-normalized) from `origin` until the surface is
    /// within `eps`, the ray escapes, or the step budget runs out.
    fn ray_march(&self, params: &RenderParams, origin: DVec3, dir: DVec3, eps: f64) -> RaySample;

    /// Map a march result to an RGB color in `[0,1]^3`.
    fn shade(&self, sample: &RaySample, params: &RenderParams, origin: DVec3, dir: DVec3) -> DVec3;
}
