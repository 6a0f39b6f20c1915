use glam::DVec3;

use crate::{
    foundation::core::RenderParams,
    scene::field::{RaySample, Scene},
};

/// Mandelbox distance-estimator parameters.
///
/// The classic negative-scale box (`scale = -1.5`) is the default. `max_steps`
/// and `max_distance` bound the sphere-tracing loop; rays that exceed either are
/// reported as escaped.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MandelboxParams {
    pub scale: f64,
    pub iterations: u32,
    pub max_steps: u32,
    pub max_distance: f64,
}

impl Default for MandelboxParams {
    fn default() -> Self {
        Self {
            scale: -1.5,
            iterations: 13,
            max_steps: 500,
            max_distance: 50.0,
        }
    }
}

/// The Mandelbox fractal as a renderable [`Scene`]: boxFold/sphereFold distance
/// estimate, sphere-traced march, normal-based Lambert shading with depth fog.
#[derive(Clone, Copy, Debug)]
pub struct Mandelbox {
    params: MandelboxParams,
}

const FOLDING_LIMIT: f64 = 1.0;
const MIN_RADIUS2: f64 = 0.25;
const FIXED_RADIUS2: f64 = 1.0;

const LIGHT_DIR: DVec3 = DVec3::new(-0.5, 0.8, -0.3);
const SURFACE_TINT: DVec3 = DVec3::new(0.85, 0.74, 0.55);
const FOG_COLOR: DVec3 = DVec3::new(0.04, 0.05, 0.08);
const AMBIENT: f64 = 0.18;

impl Mandelbox {
    pub fn new(params: MandelboxParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MandelboxParams {
        &self.params
    }

    /// Distance estimate to the fractal surface at `p`.
    pub fn estimate(&self, p: DVec3) -> f64 {
        let mut z = p;
        let mut dr = 1.0;
        for _ in 0..self.params.iterations {
            // boxFold
            z = z.clamp(DVec3::splat(-FOLDING_LIMIT), DVec3::splat(FOLDING_LIMIT)) * 2.0 - z;

            // sphereFold
            let r2 = z.length_squared();
            if r2 < MIN_RADIUS2 {
                let t = FIXED_RADIUS2 / MIN_RADIUS2;
                z *= t;
                dr *= t;
            } else if r2 < FIXED_RADIUS2 {
                let t = FIXED_RADIUS2 / r2;
                z *= t;
                dr *= t;
            }

            z = z * self.params.scale + p;
            dr = dr * self.params.scale.abs() + 1.0;
        }
        z.length() / dr.abs()
    }

    /// Central-difference surface normal of the distance field.
    fn normal_at(&self, p: DVec3, eps: f64) -> DVec3 {
        let h = eps.max(1e-9);
        let dx = self.estimate(p + DVec3::X * h) - self.estimate(p - DVec3::X * h);
        let dy = self.estimate(p + DVec3::Y * h) - self.estimate(p - DVec3::Y * h);
        let dz = self.estimate(p + DVec3::Z * h) - self.estimate(p - DVec3::Z * h);
        DVec3::new(dx, dy, dz).normalize_or(DVec3::Y)
    }
}

impl Scene for Mandelbox {
    fn ray_march(&self, _params: &RenderParams, origin: DVec3, dir: DVec3, eps: f64) -> RaySample {
        let mut t = 0.0;
        let mut hit = false;
        let mut escaped = false;

        for _ in 0..self.params.max_steps {
            let d = self.estimate(origin + dir * t);
            if d < eps {
                hit = true;
                break;
            }
            t += d;
            if t > self.params.max_distance {
                escaped = true;
                break;
            }
        }
        if !hit && !escaped {
            // Step budget exhausted without converging; treat like a divergence.
            escaped = true;
        }

        RaySample {
            distance: t,
            point: origin + dir * t,
            hit,
            escaped,
        }
    }

    fn shade(&self, sample: &RaySample, params: &RenderParams, _origin: DVec3, dir: DVec3) -> DVec3 {
        if !sample.hit {
            return FOG_COLOR;
        }

        let normal = self.normal_at(sample.point, params.eps());
        let light = LIGHT_DIR.normalize();
        let diffuse = normal.dot(light).max(0.0);
        let facing = normal.dot(-dir).max(0.0);
        let lit = SURFACE_TINT * (AMBIENT + (1.0 - AMBIENT) * diffuse) * (0.4 + 0.6 * facing);

        // Fade distant hits into the background.
        let fog = (sample.distance / self.params.max_distance).clamp(0.0, 1.0);
        lit.lerp(FOG_COLOR, fog).clamp(DVec3::ZERO, DVec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Mandelbox {
        Mandelbox::new(MandelboxParams::default())
    }

    #[test]
    fn estimate_is_positive_outside_the_set() {
        let d = scene().estimate(DVec3::new(20.0, 0.0, 0.0));
        assert!(d > 0.0);
    }

    #[test]
    fn estimate_is_symmetric_under_negation() {
        let s = scene();
        let p = DVec3::new(1.3, -0.7, 2.1);
        assert!((s.estimate(p) - s.estimate(-p)).abs() < 1e-12);
    }

    #[test]
    fn ray_pointed_away_escapes() {
        let s = scene();
        let params = RenderParams::new(8, 8, -4.0).unwrap();
        let sample = s.ray_march(&params, DVec3::new(30.0, 0.0, 0.0), DVec3::X, params.eps());
        assert!(sample.escaped);
        assert!(!sample.hit);
        assert!(sample.distance > 0.0);
    }

    #[test]
    fn ray_toward_the_set_hits() {
        let s = scene();
        let params = RenderParams::new(8, 8, -4.0).unwrap();
        let sample = s.ray_march(&params, DVec3::new(10.0, 0.0, 0.0), -DVec3::X, params.eps());
        assert!(sample.hit);
        assert!(sample.distance > 0.0 && sample.distance < 10.0);
    }

    #[test]
    fn shade_stays_in_unit_cube() {
        let s = scene();
        let params = RenderParams::new(8, 8, -4.0).unwrap();
        let sample = s.ray_march(&params, DVec3::new(10.0, 0.0, 0.0), -DVec3::X, params.eps());
        let c = s.shade(&sample, &params, DVec3::new(10.0, 0.0, 0.0), -DVec3::X);
        for v in [c.x, c.y, c.z] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
