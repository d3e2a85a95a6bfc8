//! Display colours for segment overlays.
//!
//! Colours are a pure function of the segment id: hues advance by the golden
//! ratio conjugate so consecutive ids land far apart on the colour wheel. The
//! caller owns the [`SegmentPalette`] cache, so separate pipelines never share
//! state and repeated renders reuse earlier lookups.

use std::collections::HashMap;

use super::labels::SegmentId;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;
const SATURATION: f64 = 0.65;
const VALUE: f64 = 0.95;

/// An 8-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rgb(pub [u8; 3]);

/// Caller-owned cache of segment display colours.
///
/// # Examples
/// ```
/// use graphseg_core::{SegmentId, SegmentPalette};
///
/// let mut palette = SegmentPalette::new();
/// let first = palette.color_for(SegmentId::new(0));
/// let second = palette.color_for(SegmentId::new(1));
/// assert_ne!(first, second);
/// assert_eq!(palette.color_for(SegmentId::new(0)), first);
/// assert_eq!(palette.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SegmentPalette {
    colors: HashMap<SegmentId, Rgb>,
}

impl SegmentPalette {
    /// Creates an empty palette.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the colour for `id`, computing and caching it on first use.
    pub fn color_for(&mut self, id: SegmentId) -> Rgb {
        *self.colors.entry(id).or_insert_with(|| color_from_id(id))
    }

    /// Returns the cached colour for `id`, if any.
    #[must_use]
    pub fn get(&self, id: SegmentId) -> Option<Rgb> {
        self.colors.get(&id).copied()
    }

    /// Number of cached colours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn color_from_id(id: SegmentId) -> Rgb {
    let hue = (id.get() as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    hsv_to_rgb(hue, SATURATION, VALUE)
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let scaled = hue * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u8 % 6 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Rgb([to_byte(r), to_byte(g), to_byte(b)])
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}
