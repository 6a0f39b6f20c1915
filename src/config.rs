use crate::{
    camera::rig::CameraParams,
    foundation::{core::RenderParams, error::FlightResult},
    path::planner::PlannerConfig,
    scene::mandelbox::MandelboxParams,
};

/// Top-level job description, read from JSON by the CLI.
///
/// Bundles the camera pose, render dimensions, scene parameters and planner
/// knobs so a frame render and a flight share one input file.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlightConfig {
    pub camera: CameraParams,
    pub render: RenderParams,
    #[serde(default)]
    pub scene: MandelboxParams,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl FlightConfig {
    pub fn validate(&self) -> FlightResult<()> {
        self.render.validate()
    }
}
