//! Benchmark parameter labels.

use std::fmt;

use graphseg_core::Connectivity;

/// Parameters identifying one benchmark input.
#[derive(Clone, Copy, Debug)]
pub struct ImageBenchParams {
    /// Image height.
    pub rows: usize,
    /// Image width.
    pub cols: usize,
    /// Neighbourhood used for the graph.
    pub connectivity: Connectivity,
}

impl fmt::Display for ImageBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neighbours = match self.connectivity {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        };
        write!(f, "{}x{},c{neighbours}", self.cols, self.rows)
    }
}
