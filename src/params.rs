//! Diamond-square generation parameters and presets

use crate::error::ConfigError;

/// Largest accepted iteration count. 2^14 + 1 = 16385 cells per side.
pub const MAX_ITERATIONS: u32 = 14;

/// Largest accepted variation. Keeps the offset range 2 * variation and the
/// midpoint sums well inside f32.
pub const MAX_VARIATION: f32 = 1.0e30;

/// Terrain character preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TerrainPreset {
    /// Low variation, fast decay - gentle plains
    Flat,
    /// Balanced hills
    #[default]
    Rolling,
    /// High variation, slow decay - jagged mountains
    Rugged,
    /// Deep outside height pulls every edge down into sea
    Island,
}

impl TerrainPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Flat, Self::Rolling, Self::Rugged, Self::Island]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Flat => "Gentle plains",
            Self::Rolling => "Balanced hills",
            Self::Rugged => "Jagged mountains",
            Self::Island => "Landmass falling off toward the map edges",
        }
    }

    pub fn params(&self) -> DiamondSquareParams {
        let base = DiamondSquareParams::default();
        match self {
            Self::Flat => DiamondSquareParams {
                variation: 0.15,
                smoothness: 2.0,
                outside_height: 0.5,
                ..base
            },
            Self::Rolling => base,
            Self::Rugged => DiamondSquareParams {
                variation: 2.0,
                smoothness: 0.6,
                ..base
            },
            Self::Island => DiamondSquareParams {
                seeds: vec![0.0; 4],
                variation: 1.5,
                smoothness: 1.0,
                outside_height: -2.0,
                ..base
            },
        }
    }
}

impl std::fmt::Display for TerrainPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Rolling => write!(f, "rolling"),
            Self::Rugged => write!(f, "rugged"),
            Self::Island => write!(f, "island"),
        }
    }
}

/// Inputs for one diamond-square run. Immutable for the duration of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct DiamondSquareParams {
    /// Grid side length is 2^iteration_count + 1
    pub iteration_count: u32,

    /// Corner elevations ordered top-left, top-right, bottom-left, bottom-right
    pub seeds: Vec<f32>,

    /// Initial amplitude of the random offset added to every midpoint
    pub variation: f32,

    /// Variation is multiplied by 2^-smoothness after each iteration.
    /// Higher values = smoother terrain
    pub smoothness: f32,

    /// Elevation assumed for square-step neighbours that fall outside the grid.
    /// This alone decides how terrain behaves at the map edges
    pub outside_height: f32,

    /// Multiplier applied after normalizing to [0, 1]
    pub height_scaling: f32,
}

impl Default for DiamondSquareParams {
    fn default() -> Self {
        Self {
            iteration_count: 7,
            seeds: vec![0.5; 4],
            variation: 1.0,
            smoothness: 1.0,
            outside_height: 0.0,
            height_scaling: 1.0,
        }
    }
}

impl DiamondSquareParams {
    pub fn builder() -> DiamondSquareParamsBuilder {
        DiamondSquareParamsBuilder::default()
    }

    /// Side length of the finished grid.
    pub fn resolution(&self) -> usize {
        (1usize << self.iteration_count) + 1
    }

    /// Check the record before any grid is allocated for it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seeds.len() != 4 {
            return Err(ConfigError::SeedCount { found: self.seeds.len() });
        }
        if self.iteration_count > MAX_ITERATIONS {
            return Err(ConfigError::IterationCountTooLarge {
                requested: self.iteration_count,
                max: MAX_ITERATIONS,
            });
        }
        if self.seeds.iter().any(|s| !s.is_finite()) {
            return Err(ConfigError::NonFinite { field: "seeds" });
        }

        let fields = [
            ("variation", self.variation),
            ("smoothness", self.smoothness),
            ("outside_height", self.outside_height),
            ("height_scaling", self.height_scaling),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        if self.variation < 0.0 {
            return Err(ConfigError::NegativeVariation(self.variation));
        }
        if self.variation > MAX_VARIATION {
            return Err(ConfigError::VariationTooLarge {
                requested: self.variation,
                max: MAX_VARIATION,
            });
        }
        // Negative smoothness would grow the variation every iteration
        if self.smoothness < 0.0 {
            return Err(ConfigError::NegativeSmoothness(self.smoothness));
        }

        Ok(())
    }
}

/// Builder starting from the default parameter record
#[derive(Default)]
pub struct DiamondSquareParamsBuilder {
    params: DiamondSquareParams,
}

impl DiamondSquareParamsBuilder {
    pub fn from_preset(preset: TerrainPreset) -> Self {
        Self { params: preset.params() }
    }

    pub fn iteration_count(mut self, count: u32) -> Self {
        self.params.iteration_count = count;
        self
    }

    pub fn seeds(mut self, seeds: impl Into<Vec<f32>>) -> Self {
        self.params.seeds = seeds.into();
        self
    }

    pub fn variation(mut self, variation: f32) -> Self {
        self.params.variation = variation;
        self
    }

    pub fn smoothness(mut self, smoothness: f32) -> Self {
        self.params.smoothness = smoothness;
        self
    }

    pub fn outside_height(mut self, height: f32) -> Self {
        self.params.outside_height = height;
        self
    }

    pub fn height_scaling(mut self, scaling: f32) -> Self {
        self.params.height_scaling = scaling;
        self
    }

    pub fn build(self) -> DiamondSquareParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = DiamondSquareParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.resolution(), 129);
    }

    #[test]
    fn test_every_preset_is_valid() {
        for preset in TerrainPreset::all() {
            assert!(preset.params().validate().is_ok(), "{} preset invalid", preset);
            assert!(!preset.description().is_empty());
        }
        assert_eq!(TerrainPreset::default().params(), DiamondSquareParams::default());
    }

    #[test]
    fn test_builder_from_preset_keeps_unset_fields() {
        let params = DiamondSquareParamsBuilder::from_preset(TerrainPreset::Island)
            .iteration_count(5)
            .variation(0.25)
            .build();
        let island = TerrainPreset::Island.params();

        assert_eq!(params.iteration_count, 5);
        assert_eq!(params.variation, 0.25);
        assert_eq!(params.seeds, island.seeds);
        assert_eq!(params.outside_height, island.outside_height);
        assert_eq!(params.smoothness, island.smoothness);
    }

    #[test]
    fn test_wrong_seed_count() {
        let params = DiamondSquareParams::builder().seeds(vec![1.0, 2.0, 3.0]).build();
        assert_eq!(params.validate(), Err(ConfigError::SeedCount { found: 3 }));

        let params = DiamondSquareParams::builder().seeds(vec![0.0; 5]).build();
        assert_eq!(params.validate(), Err(ConfigError::SeedCount { found: 5 }));
    }

    #[test]
    fn test_iteration_count_limit() {
        let params = DiamondSquareParams::builder().iteration_count(MAX_ITERATIONS).build();
        assert!(params.validate().is_ok());

        let params = DiamondSquareParams::builder().iteration_count(MAX_ITERATIONS + 1).build();
        assert!(matches!(
            params.validate(),
            Err(ConfigError::IterationCountTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_floats() {
        let params = DiamondSquareParams::builder().variation(-0.5).build();
        assert_eq!(params.validate(), Err(ConfigError::NegativeVariation(-0.5)));

        let params = DiamondSquareParams::builder().smoothness(-200.0).build();
        assert_eq!(params.validate(), Err(ConfigError::NegativeSmoothness(-200.0)));

        let params = DiamondSquareParams::builder().variation(3.0e38).build();
        assert!(matches!(
            params.validate(),
            Err(ConfigError::VariationTooLarge { .. })
        ));
        let params = DiamondSquareParams::builder().variation(MAX_VARIATION).build();
        assert!(params.validate().is_ok());

        let params = DiamondSquareParams::builder().smoothness(f32::NAN).build();
        assert_eq!(params.validate(), Err(ConfigError::NonFinite { field: "smoothness" }));

        let params = DiamondSquareParams::builder()
            .seeds([0.0, f32::INFINITY, 0.0, 0.0])
            .build();
        assert_eq!(params.validate(), Err(ConfigError::NonFinite { field: "seeds" }));
    }

    #[test]
    fn test_resolution_is_power_of_two_plus_one() {
        for n in 0..=10 {
            let params = DiamondSquareParams::builder().iteration_count(n).build();
            assert_eq!(params.resolution(), 2usize.pow(n) + 1);
        }
    }
}
