pub type FlightResult<T> = Result<T, FlightError>;

#[derive(thiserror::Error, Debug)]
pub enum FlightError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("sampling error: {0}")]
    Sampling(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlightError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn sampling(msg: impl Into<String>) -> Self {
        Self::Sampling(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FlightError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            FlightError::sampling("x")
                .to_string()
                .contains("sampling error:")
        );
        assert!(
            FlightError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FlightError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
