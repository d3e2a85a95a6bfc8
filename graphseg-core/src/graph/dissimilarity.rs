//! Pluggable dissimilarity policies used to weight grid edges.
//!
//! The relative weighting of colour and depth is a policy decision, so the
//! graph builder accepts any [`Dissimilarity`] implementation. Closures with
//! the signature `Fn(&[f32], &[f32]) -> f32` qualify as well.

use crate::{Result, error::SegmentationError};

/// Computes a non-negative dissimilarity between two feature vectors of equal
/// length.
pub trait Dissimilarity: Sync {
    /// Returns the dissimilarity between `left` and `right`.
    fn dissimilarity(&self, left: &[f32], right: &[f32]) -> f32;

    /// Checks that the policy can handle feature vectors with `channels`
    /// values.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ChannelMismatch`] when the policy is tied
    /// to a different channel count.
    fn validate(&self, _channels: usize) -> Result<()> {
        Ok(())
    }
}

impl<F> Dissimilarity for F
where
    F: Fn(&[f32], &[f32]) -> f32 + Sync,
{
    fn dissimilarity(&self, left: &[f32], right: &[f32]) -> f32 {
        self(left, right)
    }
}

/// Plain Euclidean distance over every channel.
///
/// # Examples
/// ```
/// use graphseg_core::{Dissimilarity, Euclidean};
///
/// let d = Euclidean.dissimilarity(&[0.0, 3.0], &[4.0, 0.0]);
/// assert_eq!(d, 5.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Dissimilarity for Euclidean {
    fn dissimilarity(&self, left: &[f32], right: &[f32]) -> f32 {
        let mut sum = 0.0f64;
        for (&l, &r) in left.iter().zip(right) {
            let diff = f64::from(l) - f64::from(r);
            sum += diff * diff;
        }
        sum.sqrt() as f32
    }
}

/// Euclidean distance with a non-negative weight per channel.
///
/// Each squared channel difference is scaled by its weight before summing.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedEuclidean {
    weights: Vec<f32>,
}

impl WeightedEuclidean {
    /// Creates a policy with one weight per channel.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ZeroChannels`] for an empty weight list and
    /// [`SegmentationError::InvalidWeight`] for negative or non-finite weights.
    pub fn new(weights: Vec<f32>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SegmentationError::ZeroChannels);
        }
        if let Some((channel, &got)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SegmentationError::InvalidWeight { channel, got });
        }
        Ok(Self { weights })
    }

    /// Weights three colour channels with `color_weight` and a trailing depth
    /// channel with `depth_weight`.
    ///
    /// # Examples
    /// ```
    /// use graphseg_core::{Dissimilarity, WeightedEuclidean};
    ///
    /// let policy = WeightedEuclidean::color_depth(1.0, 4.0)?;
    /// let d = policy.dissimilarity(&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.0, 1.5]);
    /// assert_eq!(d, 3.0);
    /// # Ok::<(), graphseg_core::SegmentationError>(())
    /// ```
    ///
    /// # Errors
    /// Same conditions as [`Self::new`].
    pub fn color_depth(color_weight: f32, depth_weight: f32) -> Result<Self> {
        Self::new(vec![color_weight, color_weight, color_weight, depth_weight])
    }

    /// Per-channel weights.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl Dissimilarity for WeightedEuclidean {
    fn dissimilarity(&self, left: &[f32], right: &[f32]) -> f32 {
        let mut sum = 0.0f64;
        for ((&l, &r), &w) in left.iter().zip(right).zip(&self.weights) {
            let diff = f64::from(l) - f64::from(r);
            sum += f64::from(w) * diff * diff;
        }
        sum.sqrt() as f32
    }

    fn validate(&self, channels: usize) -> Result<()> {
        if channels == self.weights.len() {
            Ok(())
        } else {
            Err(SegmentationError::ChannelMismatch {
                expected: self.weights.len(),
                actual: channels,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0], 7.071_068)]
    #[case(&[5.0], &[5.0], 0.0)]
    fn euclidean_matches_reference(#[case] left: &[f32], #[case] right: &[f32], #[case] expected: f32) {
        assert!((Euclidean.dissimilarity(left, right) - expected).abs() < 1e-5);
    }

    #[test]
    fn euclidean_is_symmetric() {
        let a = [10.0, 20.0, 30.0];
        let b = [11.0, 18.0, 35.0];
        assert_eq!(Euclidean.dissimilarity(&a, &b), Euclidean.dissimilarity(&b, &a));
    }

    #[test]
    fn zero_weight_ignores_channel() {
        let policy = WeightedEuclidean::color_depth(1.0, 0.0).expect("weights are valid");
        let d = policy.dissimilarity(&[1.0, 1.0, 1.0, 0.0], &[1.0, 1.0, 1.0, 900.0]);
        assert_eq!(d, 0.0);
    }

    #[rstest]
    #[case(vec![1.0, -0.5], 1, -0.5)]
    #[case(vec![f32::INFINITY], 0, f32::INFINITY)]
    fn weighted_rejects_invalid_weights(
        #[case] weights: Vec<f32>,
        #[case] channel: usize,
        #[case] got: f32,
    ) {
        let err = WeightedEuclidean::new(weights).expect_err("weights must be rejected");
        assert_eq!(err, SegmentationError::InvalidWeight { channel, got });
    }

    #[test]
    fn weighted_validates_channel_count() {
        let policy = WeightedEuclidean::color_depth(1.0, 1.0).expect("weights are valid");
        assert!(policy.validate(4).is_ok());
        assert_eq!(
            policy.validate(3),
            Err(SegmentationError::ChannelMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn closures_act_as_policies() {
        let manhattan = |left: &[f32], right: &[f32]| -> f32 {
            left.iter().zip(right).map(|(l, r)| (l - r).abs()).sum()
        };
        assert_eq!(manhattan.dissimilarity(&[0.0, 0.0], &[1.0, 2.0]), 3.0);
    }
}
