//! Error types for calnn-core.

use thiserror::Error;

/// Result type alias for calnn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for calnn operations.
///
/// The clustering pass itself never fails; these variants cover
/// configuration that cannot describe a meaningful pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Minimum cluster value is NaN or infinite.
    #[error("invalid minimum cluster value: {0}")]
    InvalidMinValue(f64),

    /// Grid segmentation without any layer.
    #[error("grid segmentation needs at least one layer")]
    NoLayers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::InvalidMinValue(f64::INFINITY).to_string(),
            "invalid minimum cluster value: inf"
        );
        assert_eq!(
            Error::NoLayers.to_string(),
            "grid segmentation needs at least one layer"
        );
    }
}
