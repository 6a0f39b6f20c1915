use std::time::Instant;

use glam::DVec3;

use crate::{
    camera::rig::CameraParams,
    foundation::{
        core::RenderParams,
        error::{FlightError, FlightResult},
    },
    render::stats::{PROBE_CENTER, sample_stats},
    scene::field::Scene,
};

/// Planner knobs. Sampling runs at a fixed small resolution with a wide field
/// of view so each steering decision stays cheap.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of poses to produce.
    pub frames: usize,
    /// Base travel distance per frame, before speed smoothing.
    pub camera_speed: f64,
    /// Steering filter gain. Higher values turn faster but jitter more.
    pub max_turn_speed: f64,
    pub sample_width: u32,
    pub sample_height: u32,
    pub sample_fov: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            frames: 60,
            camera_speed: 0.02,
            max_turn_speed: 0.05,
            sample_width: 25,
            sample_height: 25,
            sample_fov: 1.0,
        }
    }
}

// Speed controller: accelerate while the center probe sees open space,
// otherwise brake hard.
const OPEN_DISTANCE: f64 = 0.1;
const ACCELERATE: f64 = 1.1;
const DECELERATE: f64 = 0.5;
const SPEED_MIN: f64 = 0.01;
const SPEED_MAX: f64 = 1.0;

// Steering filter.
const ERROR_GAIN: f64 = 10.0;
const ERROR_DEAD_ZONE: f64 = 0.01;

// Degeneracy policy.
const REVERSE_DISTANCE: f64 = 1e-4;
const BUMP_DISTANCE: f64 = 1e-3;
const BUMP_SCALE: f64 = 10.0;

// The camera always looks one unit past its travel step.
const LOOK_AHEAD: f64 = 1.0;

/// Greedy, distance-driven camera flight controller.
///
/// Each step samples the scene at the planner's reduced resolution, steers
/// toward the farthest visible point through a rate-limited filter, and nudges
/// away from the nearest surface. Frames are strictly sequential: pose `k+1`
/// starts from pose `k`'s outcome, so only the sampling inside a step is
/// parallel.
pub struct PathPlanner<'a> {
    scene: &'a dyn Scene,
    camera: CameraParams,
    params: RenderParams,
    cfg: PlannerConfig,
    direction: DVec3,
    smooth_speed: f64,
}

impl<'a> PathPlanner<'a> {
    /// `base` contributes only its `detail`; width/height/fov are overridden by
    /// the planner's sampling resolution.
    pub fn new(
        scene: &'a dyn Scene,
        camera: CameraParams,
        base: &RenderParams,
        cfg: PlannerConfig,
    ) -> FlightResult<Self> {
        if !cfg.camera_speed.is_finite() || cfg.camera_speed < 0.0 {
            return Err(FlightError::validation(
                "planner camera_speed must be finite and >= 0",
            ));
        }
        if !cfg.max_turn_speed.is_finite() || cfg.max_turn_speed < 0.0 {
            return Err(FlightError::validation(
                "planner max_turn_speed must be finite and >= 0",
            ));
        }
        let params = RenderParams::new(cfg.sample_width, cfg.sample_height, base.detail)?;
        let mut camera = camera;
        camera.fov = cfg.sample_fov;
        let direction = camera.look_dir();

        Ok(Self {
            scene,
            camera,
            params,
            cfg,
            direction,
            smooth_speed: 1.0,
        })
    }

    pub fn camera(&self) -> &CameraParams {
        &self.camera
    }

    /// Smoothed speed factor, always in `[0.01, 1]`.
    pub fn smooth_speed(&self) -> f64 {
        self.smooth_speed
    }

    /// Current unit look direction.
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Advance the camera by one frame and return the resulting pose.
    pub fn step(&mut self) -> FlightResult<CameraParams> {
        let stats = sample_stats(self.scene, &self.camera, &self.params)?;

        // Speed control from the center probe.
        let ahead = stats.probes[PROBE_CENTER].distance;
        self.smooth_speed *= if ahead > OPEN_DISTANCE {
            ACCELERATE
        } else {
            DECELERATE
        };
        self.smooth_speed = self.smooth_speed.clamp(SPEED_MIN, SPEED_MAX);
        let move_rate = self.cfg.camera_speed * self.smooth_speed;

        match stats.farthest {
            Some(far) => {
                // Pursue the farthest visible point, rate-limited so the
                // camera never snaps.
                let candidate = (far.point - self.camera.pos).normalize_or(self.direction);
                let mut error =
                    (ERROR_GAIN * (self.direction - candidate).length() / far.distance)
                        .clamp(0.0, 1.0);
                if error < ERROR_DEAD_ZONE {
                    error = 0.0;
                }
                let blend = self.cfg.max_turn_speed * error;
                self.direction = self
                    .direction
                    .lerp(candidate, blend)
                    .normalize_or(self.direction);

                // Camera against (or inside) geometry: back straight out.
                if far.distance < REVERSE_DISTANCE {
                    self.direction = -self.direction;
                }
            }
            None => {
                // Every ray came back degenerate, so there is nothing to steer
                // toward; reverse and let the next frame look again.
                self.direction = -self.direction;
            }
        }

        let (bump, bump_factor) = match stats.nearest {
            Some(near) if near.distance < BUMP_DISTANCE => (
                (self.camera.pos - near.point).normalize_or(DVec3::ZERO),
                near.distance / BUMP_SCALE,
            ),
            _ => (DVec3::ZERO, 0.0),
        };

        self.camera.pos += self.direction * move_rate + bump * bump_factor;
        self.camera.target = self.camera.pos + self.direction * (move_rate + LOOK_AHEAD);
        Ok(self.camera)
    }

    /// Run exactly `cfg.frames` steps and collect the poses.
    pub fn plan(mut self) -> FlightResult<Vec<CameraParams>> {
        let total = self.cfg.frames;
        let mut poses = Vec::with_capacity(total);
        let start = Instant::now();
        for frame in 0..total {
            poses.push(self.step()?);
            tracing::debug!(
                frame = frame + 1,
                total,
                smooth_speed = self.smooth_speed,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "planned camera pose"
            );
        }
        Ok(poses)
    }
}

/// One-shot convenience over [`PathPlanner`].
#[tracing::instrument(skip(scene, camera, base), fields(frames = cfg.frames))]
pub fn plan_path(
    scene: &dyn Scene,
    camera: CameraParams,
    base: &RenderParams,
    cfg: PlannerConfig,
) -> FlightResult<Vec<CameraParams>> {
    PathPlanner::new(scene, camera, base, cfg)?.plan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::field::RaySample;

    /// Every ray travels the same distance and hits.
    struct UniformScene {
        distance: f64,
    }

    impl Scene for UniformScene {
        fn ray_march(
            &self,
            _params: &RenderParams,
            origin: DVec3,
            dir: DVec3,
            _eps: f64,
        ) -> RaySample {
            RaySample {
                distance: self.distance,
                point: origin + dir * self.distance,
                hit: true,
                escaped: false,
            }
        }

        fn shade(
            &self,
            _sample: &RaySample,
            _params: &RenderParams,
            _origin: DVec3,
            _dir: DVec3,
        ) -> DVec3 {
            DVec3::ZERO
        }
    }

    fn base_params() -> RenderParams {
        RenderParams::new(640, 480, -2.0).unwrap()
    }

    fn start_camera() -> CameraParams {
        CameraParams::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0), 0.4)
    }

    #[test]
    fn open_space_accelerates_and_caps_at_one() {
        let scene = UniformScene { distance: 5.0 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        for _ in 0..10 {
            planner.step().unwrap();
            assert!((SPEED_MIN..=SPEED_MAX).contains(&planner.smooth_speed()));
        }
        assert_eq!(planner.smooth_speed(), SPEED_MAX);
    }

    #[test]
    fn blocked_space_decelerates_to_floor() {
        let scene = UniformScene { distance: 0.05 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        for _ in 0..12 {
            planner.step().unwrap();
        }
        assert_eq!(planner.smooth_speed(), SPEED_MIN);
    }

    #[test]
    fn direction_stays_unit_after_every_step() {
        let scene = UniformScene { distance: 2.5 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        for _ in 0..8 {
            planner.step().unwrap();
            assert!((planner.direction().length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn all_degenerate_frame_reverses_and_still_advances() {
        // Every ray reports zero travel, so no sample beats the farthest
        // sentinel and the planner has nothing to steer toward.
        let scene = UniformScene { distance: 0.0 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        let before_dir = planner.direction();
        let before_pos = planner.camera().pos;

        let pose = planner.step().unwrap();

        // Reversed outright, with no steering blend applied first.
        assert!((planner.direction() + before_dir).length() < 1e-12);
        // The blocked center probe halves the speed; the pose still advances
        // by the full move rate along the reversed direction.
        let move_rate = planner.cfg.camera_speed * planner.smooth_speed();
        assert_eq!(planner.smooth_speed(), 0.5);
        let expected = before_pos + planner.direction() * move_rate;
        assert!((pose.pos - expected).length() < 1e-12);
    }

    #[test]
    fn degenerate_far_distance_reverses_direction() {
        let scene = UniformScene { distance: 5e-5 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        let before = planner.direction();
        planner.step().unwrap();
        // The steering blend barely moves the vector before the reversal.
        assert!(planner.direction().dot(before) < 0.0);
    }

    #[test]
    fn look_ahead_is_one_unit_past_the_travel_step() {
        let scene = UniformScene { distance: 5.0 };
        let mut planner =
            PathPlanner::new(&scene, start_camera(), &base_params(), PlannerConfig::default())
                .unwrap();
        let pose = planner.step().unwrap();
        let move_rate = planner.cfg.camera_speed * planner.smooth_speed();
        let look = (pose.target - pose.pos).length();
        assert!((look - (move_rate + LOOK_AHEAD)).abs() < 1e-9);
    }

    #[test]
    fn negative_camera_speed_rejected() {
        let scene = UniformScene { distance: 1.0 };
        let cfg = PlannerConfig {
            camera_speed: -1.0,
            ..PlannerConfig::default()
        };
        assert!(PathPlanner::new(&scene, start_camera(), &base_params(), cfg).is_err());
    }

    #[test]
    fn zero_frames_plans_nothing() {
        let scene = UniformScene { distance: 1.0 };
        let cfg = PlannerConfig {
            frames: 0,
            ..PlannerConfig::default()
        };
        let poses = plan_path(&scene, start_camera(), &base_params(), cfg).unwrap();
        assert!(poses.is_empty());
    }

    #[test]
    fn plan_emits_exactly_the_requested_pose_count() {
        let scene = UniformScene { distance: 1.0 };
        let cfg = PlannerConfig {
            frames: 7,
            ..PlannerConfig::default()
        };
        let poses = plan_path(&scene, start_camera(), &base_params(), cfg).unwrap();
        assert_eq!(poses.len(), 7);
    }
}
