//! Configuration errors raised before a generation run allocates its grid.

/// Malformed generation parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Corner seeds must be exactly four values (TL, TR, BL, BR)
    SeedCount { found: usize },
    /// Grid side would be 2^requested + 1, beyond what we allow to allocate
    IterationCountTooLarge { requested: u32, max: u32 },
    /// Variation is an amplitude and cannot be negative
    NegativeVariation(f32),
    /// Variation large enough to overflow the random offset range
    VariationTooLarge { requested: f32, max: f32 },
    /// Smoothness below zero makes the variation grow without bound
    NegativeSmoothness(f32),
    /// A numeric field is NaN or infinite
    NonFinite { field: &'static str },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::SeedCount { found } => {
                write!(f, "Expected exactly 4 corner seeds, got {}", found)
            }
            ConfigError::IterationCountTooLarge { requested, max } => {
                write!(f, "Iteration count {} exceeds maximum of {}", requested, max)
            }
            ConfigError::NegativeVariation(v) => {
                write!(f, "Variation must be non-negative, got {}", v)
            }
            ConfigError::VariationTooLarge { requested, max } => {
                write!(f, "Variation {} exceeds maximum of {}", requested, max)
            }
            ConfigError::NegativeSmoothness(s) => {
                write!(f, "Smoothness must be non-negative, got {}", s)
            }
            ConfigError::NonFinite { field } => write!(f, "Parameter '{}' must be finite", field),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ConfigError::SeedCount { found: 3 }.to_string(),
            "Expected exactly 4 corner seeds, got 3"
        );
        assert_eq!(
            ConfigError::NonFinite { field: "smoothness" }.to_string(),
            "Parameter 'smoothness' must be finite"
        );
        assert_eq!(
            ConfigError::NegativeSmoothness(-2.0).to_string(),
            "Smoothness must be non-negative, got -2"
        );
    }
}
