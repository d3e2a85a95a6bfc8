//! Separable Gaussian pre-smoothing applied before edge weights are computed.
//!
//! Smoothing suppresses sensor noise that would otherwise fragment flat
//! regions. Statistics on the finished segmentation are always taken from the
//! unsmoothed grid.

use std::borrow::Cow;

use crate::{Result, error::SegmentationError, grid::FeatureGrid};

/// Mask half-width in standard deviations.
const MASK_WIDTH: f32 = 4.0;

/// Returns `grid` blurred channel-wise with a Gaussian of deviation `sigma`.
///
/// `sigma == 0` borrows the input unchanged. Borders clamp to the nearest
/// edge pixel, so the mask never reaches further than the longer grid side;
/// wider masks are truncated there and renormalised.
///
/// # Errors
/// Returns [`SegmentationError::InvalidSigma`] when `sigma` is negative or
/// non-finite.
pub fn smooth(grid: &FeatureGrid, sigma: f32) -> Result<Cow<'_, FeatureGrid>> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SegmentationError::InvalidSigma { got: sigma });
    }
    if sigma == 0.0 {
        return Ok(Cow::Borrowed(grid));
    }

    let shape = grid.shape();
    let channels = grid.channels();
    let (rows, cols) = (shape.rows(), shape.cols());
    let mask = gaussian_mask(sigma, rows.max(cols));

    let horizontal = convolve(grid.as_slice(), &mask, channels, rows, cols, Axis::Columns);
    let both = convolve(&horizontal, &mask, channels, rows, cols, Axis::Rows);
    Ok(Cow::Owned(FeatureGrid::from_parts_unchecked(
        shape, channels, both,
    )))
}

/// Builds the one-sided mask, at most `extent` taps long.
fn gaussian_mask(sigma: f32, extent: usize) -> Vec<f32> {
    let reach = (sigma * MASK_WIDTH).ceil();
    let len = if reach < extent as f32 {
        reach as usize + 1
    } else {
        extent
    };
    let mut mask: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 / sigma;
            (-0.5 * x * x).exp()
        })
        .collect();
    let tail: f32 = mask.iter().skip(1).sum();
    let total = 2.0 * tail + mask[0];
    for weight in &mut mask {
        *weight /= total;
    }
    mask
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

fn convolve(
    src: &[f32],
    mask: &[f32],
    channels: usize,
    rows: usize,
    cols: usize,
    axis: Axis,
) -> Vec<f32> {
    let mut out = vec![0.0; src.len()];
    let value = |row: usize, col: usize, channel: usize| src[(row * cols + col) * channels + channel];

    for row in 0..rows {
        for col in 0..cols {
            for channel in 0..channels {
                let mut sum = mask[0] * value(row, col, channel);
                for (offset, &weight) in mask.iter().enumerate().skip(1) {
                    let (before, after) = match axis {
                        Axis::Columns => (
                            value(row, col.saturating_sub(offset), channel),
                            value(row, (col + offset).min(cols - 1), channel),
                        ),
                        Axis::Rows => (
                            value(row.saturating_sub(offset), col, channel),
                            value((row + offset).min(rows - 1), col, channel),
                        ),
                    };
                    sum += weight * (before + after);
                }
                out[(row * cols + col) * channels + channel] = sum;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn mask_is_normalised() {
        let mask = gaussian_mask(0.8, 64);
        assert_eq!(mask.len(), 5);
        let total = 2.0 * mask.iter().skip(1).sum::<f32>() + mask[0];
        assert!((total - 1.0).abs() < 1e-6);
        assert!(mask.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[rstest]
    #[case(4.0, 3)]
    #[case(1e30, 3)]
    #[case(f32::MAX, 1)]
    fn mask_is_capped_at_grid_extent(#[case] sigma: f32, #[case] extent: usize) {
        let mask = gaussian_mask(sigma, extent);
        assert_eq!(mask.len(), extent);
        let total = 2.0 * mask.iter().skip(1).sum::<f32>() + mask[0];
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[rstest]
    #[case(1e30)]
    #[case(f32::MAX)]
    fn huge_sigma_averages_towards_the_mean(#[case] sigma: f32) {
        let grid = FeatureGrid::new(1, 2, 1, vec![0.0, 10.0]).expect("grid is valid");
        let smoothed = smooth(&grid, sigma).expect("finite sigma is accepted");
        assert_eq!(smoothed.as_slice().len(), 2);
        assert!(smoothed.as_slice().iter().all(|v| (0.0..=10.0).contains(v)));
    }

    #[test]
    fn zero_sigma_borrows_input() {
        let grid = FeatureGrid::new(1, 3, 1, vec![0.0, 9.0, 0.0]).expect("grid is valid");
        let smoothed = smooth(&grid, 0.0).expect("sigma 0 is valid");
        assert!(matches!(smoothed, Cow::Borrowed(_)));
    }

    #[rstest]
    #[case(-0.5)]
    #[case(f32::NAN)]
    fn rejects_invalid_sigma(#[case] sigma: f32) {
        let grid = FeatureGrid::new(1, 1, 1, vec![0.0]).expect("grid is valid");
        let err = smooth(&grid, sigma).expect_err("sigma must be rejected");
        assert!(matches!(err, SegmentationError::InvalidSigma { .. }));
    }

    #[test]
    fn constant_grid_is_unchanged() {
        let grid = FeatureGrid::new(3, 4, 2, vec![7.0; 24]).expect("grid is valid");
        let smoothed = smooth(&grid, 1.5).expect("smoothing succeeds");
        for &value in smoothed.as_slice() {
            assert!((value - 7.0).abs() < 1e-4);
        }
    }

    #[test]
    fn impulse_spreads_symmetrically() {
        let mut data = vec![0.0; 25];
        data[12] = 100.0;
        let grid = FeatureGrid::new(5, 5, 1, data).expect("grid is valid");
        let smoothed = smooth(&grid, 0.8).expect("smoothing succeeds");
        let at = |row: usize, col: usize| smoothed.as_slice()[row * 5 + col];
        assert!(at(2, 2) < 100.0);
        assert!((at(2, 1) - at(2, 3)).abs() < 1e-5);
        assert!((at(1, 2) - at(3, 2)).abs() < 1e-5);
        assert!(at(2, 1) > at(2, 0));
    }
}
