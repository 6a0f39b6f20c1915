use rayon::prelude::*;

use crate::{
    camera::rig::{CameraBasis, CameraParams},
    foundation::{core::RenderParams, error::FlightResult},
    render::sample::sample_pixel,
    scene::field::{RaySample, Scene},
};

/// What the directional probes report: travel distance plus the two march
/// outcome flags. Probe rays never get shaded.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProbeSample {
    pub distance: f64,
    pub hit: bool,
    pub escaped: bool,
}

/// Distance statistics over one sampled frame.
///
/// `farthest` / `nearest` are the extreme march results over every pixel.
/// `None` means no pixel beat the legacy sentinel threshold: a farthest
/// candidate needs `distance > 0`, a nearest candidate `distance < 100`.
/// The original initialized `max.distance = 0` / `min.distance = 100` and let
/// those sentinels leak into the planner on an all-degenerate frame; here the
/// "no usable sample" case is explicit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub farthest: Option<RaySample>,
    pub nearest: Option<RaySample>,
    pub probes: [ProbeSample; 5],
}

const FARTHEST_FLOOR: f64 = 0.0;
const NEAREST_CEILING: f64 = 100.0;

/// Index into [`FrameStats::probes`] for the center probe the planner's speed
/// controller reads.
pub const PROBE_CENTER: usize = 0;

/// The five probe pixel coordinates: center, then quarter offsets left, right,
/// down and up of center. A pure function of the image dimensions (integer
/// division, matching the original's quarter-point table).
pub fn probe_coords(width: u32, height: u32) -> [(u32, u32); 5] {
    let hw = width / 2;
    let hh = height / 2;
    let qw = width / 4;
    let qh = height / 4;
    [(hw, hh), (qw, hh), (3 * qw, hh), (hw, 3 * qh), (hw, qh)]
}

/// Sample every pixel of the frame, tracking only distance statistics.
///
/// Phase A reduces per-pixel march results to the farthest/nearest samples:
/// each rayon task folds its rows locally and the partial results are merged
/// afterwards, so no lock guards the comparisons. Ties on distance are broken
/// toward the lowest linear pixel index, which makes the result independent of
/// thread scheduling. Phase B marches the five probe rays into disjoint slots.
#[tracing::instrument(skip(scene, camera, params), fields(w = params.width, h = params.height))]
pub fn sample_stats(
    scene: &dyn Scene,
    camera: &CameraParams,
    params: &RenderParams,
) -> FlightResult<FrameStats> {
    params.validate()?;
    let basis = CameraBasis::new(camera, params);
    let eps = params.eps();

    let agg = (0..params.height)
        .into_par_iter()
        .map(|j| {
            let mut agg = Extremes::default();
            for i in 0..params.width {
                let idx = j as usize * params.width as usize + i as usize;
                let sample = sample_pixel(scene, params, &basis, eps, i, j);
                agg.observe(idx, sample);
            }
            agg
        })
        .reduce(Extremes::default, Extremes::merge);

    let probes = probe_coords(params.width, params.height).map(|(i, j)| {
        let sample = sample_pixel(scene, params, &basis, eps, i, j);
        ProbeSample {
            distance: sample.distance,
            hit: sample.hit,
            escaped: sample.escaped,
        }
    });

    Ok(FrameStats {
        farthest: agg.farthest.map(|(_, s)| s),
        nearest: agg.nearest.map(|(_, s)| s),
        probes,
    })
}

/// Partial max/min reduction state. Candidates carry their linear pixel index
/// for the deterministic tie-break.
#[derive(Clone, Copy, Debug, Default)]
struct Extremes {
    farthest: Option<(usize, RaySample)>,
    nearest: Option<(usize, RaySample)>,
}

impl Extremes {
    fn observe(&mut self, idx: usize, sample: RaySample) {
        if sample.distance > FARTHEST_FLOOR && beats_farthest(self.farthest, idx, sample.distance) {
            self.farthest = Some((idx, sample));
        }
        if sample.distance < NEAREST_CEILING && beats_nearest(self.nearest, idx, sample.distance) {
            self.nearest = Some((idx, sample));
        }
    }

    fn merge(self, other: Self) -> Self {
        let mut out = self;
        if let Some((idx, s)) = other.farthest
            && beats_farthest(out.farthest, idx, s.distance)
        {
            out.farthest = Some((idx, s));
        }
        if let Some((idx, s)) = other.nearest
            && beats_nearest(out.nearest, idx, s.distance)
        {
            out.nearest = Some((idx, s));
        }
        out
    }
}

fn beats_farthest(current: Option<(usize, RaySample)>, idx: usize, distance: f64) -> bool {
    match current {
        None => true,
        Some((cur_idx, cur)) => {
            distance > cur.distance || (distance == cur.distance && idx < cur_idx)
        }
    }
}

fn beats_nearest(current: Option<(usize, RaySample)>, idx: usize, distance: f64) -> bool {
    match current {
        None => true,
        Some((cur_idx, cur)) => {
            distance < cur.distance || (distance == cur.distance && idx < cur_idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn sample(distance: f64) -> RaySample {
        RaySample {
            distance,
            point: DVec3::ZERO,
            hit: true,
            escaped: false,
        }
    }

    #[test]
    fn probe_coords_are_quarter_points() {
        assert_eq!(
            probe_coords(25, 25),
            [(12, 12), (6, 12), (18, 12), (12, 18), (12, 6)]
        );
        // Integer division: quarter offsets collapse to 0 on tiny frames.
        assert_eq!(probe_coords(1, 1), [(0, 0), (0, 0), (0, 0), (0, 0), (0, 0)]);
    }

    #[test]
    fn merge_is_deterministic_on_ties() {
        let mut a = Extremes::default();
        a.observe(7, sample(2.0));
        let mut b = Extremes::default();
        b.observe(3, sample(2.0));

        // Lowest pixel index wins regardless of merge order.
        assert_eq!(a.merge(b).farthest.unwrap().0, 3);
        assert_eq!(b.merge(a).farthest.unwrap().0, 3);
        assert_eq!(a.merge(b).nearest.unwrap().0, 3);
    }

    #[test]
    fn sentinel_thresholds_gate_candidates() {
        let mut agg = Extremes::default();
        agg.observe(0, sample(0.0));
        assert!(agg.farthest.is_none());
        assert!(agg.nearest.is_some());

        let mut agg = Extremes::default();
        agg.observe(0, sample(150.0));
        assert!(agg.farthest.is_some());
        assert!(agg.nearest.is_none());
    }
}
