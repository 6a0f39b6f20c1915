use crate::foundation::error::{FlightError, FlightResult};

pub use glam::DVec3;

/// Per-render configuration: output dimensions plus the ray-march tolerance
/// exponent.
///
/// `detail` is an exponent, typically negative: the march terminates when the
/// distance estimate drops below `eps = 10^detail`. Path planning overrides the
/// dimensions to a small fixed sampling resolution (see
/// [`PlannerConfig`](crate::PlannerConfig)).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    pub detail: f64,
}

impl RenderParams {
    pub fn new(width: u32, height: u32, detail: f64) -> FlightResult<Self> {
        let params = Self {
            width,
            height,
            detail,
        };
        params.validate()?;
        Ok(params)
    }

    /// March termination tolerance, `10^detail`.
    pub fn eps(&self) -> f64 {
        10f64.powf(self.detail)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn validate(&self) -> FlightResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlightError::validation(
                "render width/height must be > 0 pixels",
            ));
        }
        let eps = self.eps();
        if !eps.is_finite() || eps <= 0.0 {
            return Err(FlightError::validation(
                "render detail must give a finite eps > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eps_is_ten_to_the_detail() {
        let p = RenderParams::new(4, 4, -3.0).unwrap();
        assert!((p.eps() - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(RenderParams::new(0, 4, -2.0).is_err());
        assert!(RenderParams::new(4, 0, -2.0).is_err());
    }

    #[test]
    fn non_finite_eps_rejected() {
        assert!(RenderParams::new(4, 4, f64::NAN).is_err());
        assert!(RenderParams::new(4, 4, 5000.0).is_err());
    }
}
