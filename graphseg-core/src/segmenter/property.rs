//! Property-based tests for the segmentation passes.
//!
//! Random grids are segmented with random parameters and the output is
//! checked for partition completeness, dense labelling, the minimum size
//! guarantee, spatial connectivity of every segment and bit-for-bit
//! determinism across repeated runs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use test_strategy::Arbitrary;

use crate::{
    graph::Connectivity,
    grid::{FeatureGrid, Pixel},
    result::{LabelGrid, SegmentId, SegmentationResult},
    test_utils::suite_proptest_config,
};

use super::SegmenterBuilder;

/// Pixel value layout of a generated grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum Texture {
    /// Few distinct levels, so many edge weights tie.
    Quantised,
    /// Vertical bands with small noise.
    Banded,
    /// Independent uniform values.
    Noisy,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum Neighbourhood {
    Four,
    Eight,
}

impl From<Neighbourhood> for Connectivity {
    fn from(value: Neighbourhood) -> Self {
        match value {
            Neighbourhood::Four => Self::Four,
            Neighbourhood::Eight => Self::Eight,
        }
    }
}

#[derive(Clone, Debug)]
struct SegmentationFixture {
    grid: FeatureGrid,
    granularity: f32,
    min_size: usize,
    connectivity: Connectivity,
    texture: Texture,
}

fn generate_grid(texture: Texture, rng: &mut SmallRng) -> FeatureGrid {
    let rows = rng.gen_range(1..=12);
    let cols = rng.gen_range(1..=12);
    let channels = rng.gen_range(1..=3);
    let bands = rng.gen_range(1..=4);
    FeatureGrid::from_fn(rows, cols, channels, |pixel| {
        (0..channels)
            .map(|_| match texture {
                Texture::Quantised => f32::from(rng.gen_range(0u8..4)) * 60.0,
                Texture::Banded => {
                    let band = (pixel.col * bands / cols) as f32;
                    band * 80.0 + rng.gen_range(0.0f32..4.0)
                }
                Texture::Noisy => rng.gen_range(0.0f32..255.0),
            })
            .collect()
    })
    .expect("generated grid is valid")
}

fn fixture_strategy() -> impl Strategy<Value = SegmentationFixture> {
    (
        any::<Texture>(),
        any::<Neighbourhood>(),
        any::<u64>(),
        0.0f32..1_500.0,
        0usize..=24,
    )
        .prop_map(|(texture, neighbourhood, seed, granularity, min_size)| {
            let mut rng = SmallRng::seed_from_u64(seed);
            SegmentationFixture {
                grid: generate_grid(texture, &mut rng),
                granularity,
                min_size,
                connectivity: neighbourhood.into(),
                texture,
            }
        })
}

fn label(fixture: &SegmentationFixture) -> Result<LabelGrid, TestCaseError> {
    SegmenterBuilder::new()
        .with_granularity(fixture.granularity)
        .with_min_segment_size(fixture.min_size)
        .with_connectivity(fixture.connectivity)
        .build()
        .and_then(|segmenter| segmenter.label_grid(&fixture.grid))
        .map_err(|err| TestCaseError::fail(format!("segmentation failed: {err} ({fixture:?})")))
}

fn run_partition_property(fixture: &SegmentationFixture) -> TestCaseResult {
    let labels = label(fixture)?;
    let shape = fixture.grid.shape();
    prop_assert_eq!(labels.as_slice().len(), shape.len());

    let mut next = 0u64;
    for &id in labels.as_slice() {
        prop_assert!(id.get() <= next, "label {} skips ahead of {}", id, next);
        if id.get() == next {
            next += 1;
        }
    }
    prop_assert_eq!(next as usize, labels.segment_count());

    let result = SegmentationResult::from_label_grid(&fixture.grid, labels)
        .map_err(|err| TestCaseError::fail(format!("result construction failed: {err}")))?;
    let mut covered = vec![false; shape.len()];
    for id in result.segment_ids() {
        let pixels = result
            .pixels_of(id)
            .map_err(|err| TestCaseError::fail(format!("listed segment missing: {err}")))?;
        for &pixel in pixels {
            prop_assert!(shape.contains(pixel), "pixel {} outside the grid", pixel);
            let index = shape.index_of(pixel);
            prop_assert!(!covered[index], "pixel {} belongs to two segments", pixel);
            covered[index] = true;
        }
    }
    prop_assert!(covered.iter().all(|&seen| seen), "some pixel has no segment");
    Ok(())
}

fn run_min_size_property(fixture: &SegmentationFixture) -> TestCaseResult {
    let labels = label(fixture)?;
    let mut sizes: BTreeMap<SegmentId, usize> = BTreeMap::new();
    for &id in labels.as_slice() {
        *sizes.entry(id).or_default() += 1;
    }
    if sizes.len() > 1 {
        for (id, size) in sizes {
            prop_assert!(
                size >= fixture.min_size,
                "segment {} has {} pixels, below the minimum {} ({:?})",
                id,
                size,
                fixture.min_size,
                fixture.texture
            );
        }
    }
    Ok(())
}

fn run_connectivity_property(fixture: &SegmentationFixture) -> TestCaseResult {
    let labels = label(fixture)?;
    let shape = fixture.grid.shape();
    let mut seen = vec![false; shape.len()];
    let mut visited_segments = BTreeSet::new();

    for start in shape.pixels() {
        let start_index = shape.index_of(start);
        if seen[start_index] {
            continue;
        }
        let id = labels.as_slice()[start_index];
        prop_assert!(
            visited_segments.insert(id),
            "segment {} is split into several regions",
            id
        );

        let mut queue = VecDeque::from([start]);
        seen[start_index] = true;
        while let Some(pixel) = queue.pop_front() {
            for neighbour in neighbours(pixel, fixture.connectivity) {
                if !shape.contains(neighbour) {
                    continue;
                }
                let index = shape.index_of(neighbour);
                if !seen[index] && labels.as_slice()[index] == id {
                    seen[index] = true;
                    queue.push_back(neighbour);
                }
            }
        }
    }
    Ok(())
}

fn neighbours(pixel: Pixel, connectivity: Connectivity) -> Vec<Pixel> {
    let offsets: &[(isize, isize)] = match connectivity {
        Connectivity::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
        Connectivity::Eight => &[
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ],
    };
    offsets
        .iter()
        .filter_map(|&(dr, dc)| {
            let row = pixel.row.checked_add_signed(dr)?;
            let col = pixel.col.checked_add_signed(dc)?;
            Some(Pixel::new(row, col))
        })
        .collect()
}

fn run_determinism_property(fixture: &SegmentationFixture) -> TestCaseResult {
    let first = label(fixture)?;
    for _ in 0..3 {
        prop_assert_eq!(&label(fixture)?, &first);
    }
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn segmentation_partitions_every_pixel(fixture in fixture_strategy()) {
        run_partition_property(&fixture)?;
    }

    #[test]
    fn segments_respect_minimum_size(fixture in fixture_strategy()) {
        run_min_size_property(&fixture)?;
    }

    #[test]
    fn segments_are_spatially_connected(fixture in fixture_strategy()) {
        run_connectivity_property(&fixture)?;
    }

    #[test]
    fn segmentation_is_deterministic(fixture in fixture_strategy()) {
        run_determinism_property(&fixture)?;
    }
}

#[test]
fn banded_fixture_produces_valid_partition() {
    let mut rng = SmallRng::seed_from_u64(42);
    let fixture = SegmentationFixture {
        grid: generate_grid(Texture::Banded, &mut rng),
        granularity: 300.0,
        min_size: 4,
        connectivity: Connectivity::Eight,
        texture: Texture::Banded,
    };
    run_partition_property(&fixture).expect("partition property holds");
    run_min_size_property(&fixture).expect("min-size property holds");
    run_connectivity_property(&fixture).expect("connectivity property holds");
}
