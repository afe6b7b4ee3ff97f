use serde::{Deserialize, Serialize};

/// Common error type for FK analysis.
///
/// Every variant is raised before any numerical work starts; a failed call
/// never produces partial results.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FkError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("input validation error: {0}")]
    InputValidation(String),
    #[error("band upper bound {band_high} Hz is at or above the nyquist frequency {nyquist} Hz")]
    NyquistViolation { band_high: f64, nyquist: f64 },
}

pub type FkResult<T> = Result<T, FkError>;

/// Non-fatal conditions attached to an individual band result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FkWarning {
    /// No frequency bin of the padded spectrum falls inside the band.
    EmptyBand { low: f64, high: f64 },
}

impl std::fmt::Display for FkWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FkWarning::EmptyBand { low, high } => {
                write!(f, "no frequency bins between {} and {} Hz", low, high)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_category() {
        let err = FkError::NyquistViolation {
            band_high: 0.6,
            nyquist: 0.5,
        };
        assert!(err.to_string().contains("nyquist"));
        assert!(FkError::Configuration("bad grid".into())
            .to_string()
            .starts_with("configuration error"));
    }

    #[test]
    fn empty_band_warning_names_band_edges() {
        let warning = FkWarning::EmptyBand {
            low: 0.1,
            high: 0.2,
        };
        assert_eq!(warning.to_string(), "no frequency bins between 0.1 and 0.2 Hz");
    }
}
