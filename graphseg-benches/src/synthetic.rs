//! Seeded synthetic images for benchmarking.
//!
//! Images are tiled into rectangular regions of random colour with uniform
//! per-pixel noise on top, which gives the segmenter both flat areas to merge
//! and sharp seams to preserve.

use graphseg_core::{FeatureGrid, SegmentationError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors raised while generating a synthetic image.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// The tile edge length was zero.
    #[error("tile size must be greater than zero")]
    ZeroTile,
    /// The noise amplitude was negative or non-finite.
    #[error("noise amplitude must be finite and non-negative (got {0})")]
    InvalidNoise(f32),
    /// A core type rejected the generated data.
    #[error(transparent)]
    Core(#[from] SegmentationError),
}

/// Configuration for synthetic image generation.
#[derive(Clone, Debug)]
pub struct SyntheticImageConfig {
    /// Image height.
    pub rows: usize,
    /// Image width.
    pub cols: usize,
    /// Edge length of each constant-colour tile.
    pub tile: usize,
    /// Maximum absolute noise added to every channel.
    pub noise: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates a three-channel tiled image.
///
/// # Errors
/// Returns [`SyntheticError`] for a zero tile size, invalid noise or empty
/// dimensions.
///
/// # Examples
/// ```
/// use graphseg_benches::synthetic::{SyntheticImageConfig, generate};
///
/// let config = SyntheticImageConfig { rows: 8, cols: 6, tile: 3, noise: 2.0, seed: 7 };
/// let grid = generate(&config)?;
/// assert_eq!(grid.shape().len(), 48);
/// assert_eq!(grid.channels(), 3);
/// # Ok::<(), graphseg_benches::synthetic::SyntheticError>(())
/// ```
pub fn generate(config: &SyntheticImageConfig) -> Result<FeatureGrid, SyntheticError> {
    if config.tile == 0 {
        return Err(SyntheticError::ZeroTile);
    }
    if !config.noise.is_finite() || config.noise < 0.0 {
        return Err(SyntheticError::InvalidNoise(config.noise));
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let tiles_across = config.cols.div_ceil(config.tile);
    let tiles_down = config.rows.div_ceil(config.tile);
    let palette: Vec<[f32; 3]> = (0..tiles_across * tiles_down)
        .map(|_| [0; 3].map(|_: i32| rng.gen_range(0.0f32..=255.0)))
        .collect();

    let grid = FeatureGrid::from_fn(config.rows, config.cols, 3, |pixel| {
        let tile = (pixel.row / config.tile) * tiles_across + pixel.col / config.tile;
        palette
            .get(tile)
            .copied()
            .unwrap_or_default()
            .iter()
            .map(|&base| {
                let jitter = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..=config.noise)
                } else {
                    0.0
                };
                (base + jitter).clamp(0.0, 255.0)
            })
            .collect()
    })?;
    Ok(grid)
}
