//! Command implementations and argument parsing for the graphseg CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use graphseg_core::{
    Centroid, Connectivity, DEFAULT_GRANULARITY, DEFAULT_MIN_SEGMENT_SIZE, Euclidean,
    FeatureGrid, Rgb, SegmentId, SegmentPalette, SegmentQueryError, SegmentationError,
    SegmentationResult, SegmenterBuilder, WeightedEuclidean,
};
use image::ExtendedColorType;
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Smoothing deviation used by the command line unless overridden.
const DEFAULT_SIGMA: f32 = 0.8;
/// Boundary colour painted by `--boundaries`.
const BOUNDARY_COLOUR: Rgb = Rgb([255, 255, 255]);

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "graphseg", about = "Segment images with graph-based merging.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Segment an image and print per-segment statistics.
    Segment(SegmentCommand),
}

/// Options accepted by the `segment` command.
#[derive(Debug, Args, Clone)]
pub struct SegmentCommand {
    /// Colour image to segment.
    pub image: PathBuf,

    /// Greyscale depth map with the same dimensions as the image.
    #[arg(long)]
    pub depth: Option<PathBuf>,

    /// Weight of the depth channel relative to each colour channel.
    #[arg(long = "depth-weight", default_value_t = 1.0, requires = "depth")]
    pub depth_weight: f32,

    /// Granularity constant; larger values favour larger segments.
    #[arg(long = "k", default_value_t = DEFAULT_GRANULARITY)]
    pub granularity: f32,

    /// Minimum number of pixels per segment.
    #[arg(
        long = "min-size",
        default_value_t = DEFAULT_MIN_SEGMENT_SIZE,
        value_parser = clap::value_parser!(usize),
    )]
    pub min_size: usize,

    /// Gaussian pre-smoothing deviation; `0` disables smoothing.
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    pub sigma: f32,

    /// Pixel neighbourhood used to build the graph.
    #[arg(long, value_enum, default_value_t = ConnectivityArg::Eight)]
    pub connectivity: ConnectivityArg,

    /// Writes a colour overlay of the segments to this path.
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Paints segment boundaries white in the overlay.
    #[arg(long, requires = "overlay")]
    pub boundaries: bool,
}

/// Command-line spelling of [`Connectivity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectivityArg {
    /// Horizontal and vertical neighbours.
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    Eight,
}

impl From<ConnectivityArg> for Connectivity {
    fn from(value: ConnectivityArg) -> Self {
        match value {
            ConnectivityArg::Four => Self::Four,
            ConnectivityArg::Eight => Self::Eight,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input image could not be opened or decoded.
    #[error("failed to read image `{path}`: {source}")]
    ReadImage {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying decoding or I/O error.
        #[source]
        source: image::ImageError,
    },
    /// The overlay could not be encoded or written.
    #[error("failed to write overlay `{path}`: {source}")]
    WriteOverlay {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoding or I/O error.
        #[source]
        source: image::ImageError,
    },
    /// The depth map and the colour image differ in size.
    #[error("depth map is {depth_width}x{depth_height} but the image is {width}x{height}")]
    DepthShape {
        /// Colour image width.
        width: u32,
        /// Colour image height.
        height: u32,
        /// Depth map width.
        depth_width: u32,
        /// Depth map height.
        depth_height: u32,
    },
    /// Segmentation rejected its input or configuration.
    #[error(transparent)]
    Core(#[from] SegmentationError),
    /// A per-segment statistic could not be computed.
    #[error(transparent)]
    Query(#[from] SegmentQueryError),
}

/// Statistics reported for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    /// Segment identifier.
    pub id: SegmentId,
    /// Number of member pixels.
    pub size: usize,
    /// Mean feature vector (colour, then depth when supplied).
    pub average: Vec<f32>,
    /// Mean member coordinate.
    pub centroid: Centroid,
}

/// Summarises the outcome of the `segment` command.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationSummary {
    /// Path of the segmented image.
    pub image: PathBuf,
    /// Image height in pixels.
    pub rows: usize,
    /// Image width in pixels.
    pub cols: usize,
    /// One report per segment in ascending id order.
    pub segments: Vec<SegmentReport>,
    /// Where the overlay was written, if requested.
    pub overlay: Option<PathBuf>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, segmentation or overlay output fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use graphseg_cli::cli::{Cli, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let path = dir.path().join("flat.png");
/// image::RgbImage::from_pixel(4, 3, image::Rgb([40, 90, 200])).save(&path)?;
///
/// let image = path.to_str().ok_or("temporary path is not UTF-8")?;
/// let cli = Cli::try_parse_from(["graphseg", "segment", image, "--min-size", "1"])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.segments.len(), 1);
/// assert_eq!(summary.segments[0].size, 12);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<SegmentationSummary, CliError> {
    match cli.command {
        Command::Segment(segment) => {
            Span::current().record("command", field::display("segment"));
            run_command(segment)
        }
    }
}

#[instrument(
    name = "cli.segment",
    err,
    skip(command),
    fields(
        image = %command.image.display(),
        k = command.granularity,
        min_size = command.min_size,
        sigma = command.sigma,
        depth = command.depth.is_some(),
        segments = field::Empty,
    ),
)]
pub(super) fn run_command(command: SegmentCommand) -> Result<SegmentationSummary, CliError> {
    let segmenter = SegmenterBuilder::new()
        .with_granularity(command.granularity)
        .with_min_segment_size(command.min_size)
        .with_sigma(command.sigma)
        .with_connectivity(command.connectivity.into())
        .build()?;

    let (grid, width, height) = load_grid(&command.image, command.depth.as_deref())?;
    let result = if command.depth.is_some() {
        let policy = WeightedEuclidean::color_depth(1.0, command.depth_weight)?;
        segmenter.segment_with(&grid, &policy)?
    } else {
        segmenter.segment_with(&grid, &Euclidean)?
    };
    Span::current().record("segments", result.segment_count());

    if let Some(path) = &command.overlay {
        write_overlay(&result, path, width, height, command.boundaries)?;
    }

    let segments = report_segments(&result)?;
    info!(segments = segments.len(), "segment command completed");
    Ok(SegmentationSummary {
        image: command.image,
        rows: grid.shape().rows(),
        cols: grid.shape().cols(),
        segments,
        overlay: command.overlay,
    })
}

/// Loads the colour image, appending the depth map as a fourth channel when
/// one is given. Depth samples are scaled to the 0..=255 range of the colour
/// channels.
#[instrument(name = "cli.load_image", err, fields(width = field::Empty, height = field::Empty))]
pub(super) fn load_grid(
    image_path: &Path,
    depth_path: Option<&Path>,
) -> Result<(FeatureGrid, u32, u32), CliError> {
    let rgb = open_image(image_path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let span = Span::current();
    span.record("width", width);
    span.record("height", height);

    let grid = FeatureGrid::from_rgb8(height as usize, width as usize, rgb.as_raw())?;
    let Some(depth_path) = depth_path else {
        return Ok((grid, width, height));
    };

    let depth = open_image(depth_path)?.to_luma32f();
    let (depth_width, depth_height) = depth.dimensions();
    if (depth_width, depth_height) != (width, height) {
        return Err(CliError::DepthShape {
            width,
            height,
            depth_width,
            depth_height,
        });
    }
    let scaled: Vec<f32> = depth.as_raw().iter().map(|d| d * 255.0).collect();
    Ok((grid.with_depth(&scaled)?, width, height))
}

fn open_image(path: &Path) -> Result<image::DynamicImage, CliError> {
    image::open(path).map_err(|source| CliError::ReadImage {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(name = "cli.write_overlay", err, skip(result, path), fields(path = %path.display()))]
fn write_overlay(
    result: &SegmentationResult<'_>,
    path: &Path,
    width: u32,
    height: u32,
    boundaries: bool,
) -> Result<(), CliError> {
    let mut palette = SegmentPalette::new();
    let overlay = if boundaries {
        result.overlay_with_boundaries(&mut palette, BOUNDARY_COLOUR)
    } else {
        result.overlay(&mut palette)
    };
    image::save_buffer(path, &overlay.to_rgb8(), width, height, ExtendedColorType::Rgb8).map_err(
        |source| CliError::WriteOverlay {
            path: path.to_path_buf(),
            source,
        },
    )
}

fn report_segments(result: &SegmentationResult<'_>) -> Result<Vec<SegmentReport>, CliError> {
    result
        .segment_ids()
        .map(|id| {
            let summary = result.summary(id)?;
            Ok(SegmentReport {
                id,
                size: summary.size(),
                average: summary.average().to_vec(),
                centroid: summary.centroid(),
            })
        })
        .collect()
}

/// Renders `summary` to `writer` as tab-separated text: a header, then one
/// line per segment with its id, size, centroid and mean features.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use graphseg_cli::cli::{SegmentReport, SegmentationSummary, render_summary};
/// # use graphseg_core::{Centroid, SegmentId};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = SegmentationSummary {
///     image: "demo.png".into(),
///     rows: 1,
///     cols: 2,
///     segments: vec![SegmentReport {
///         id: SegmentId::new(0),
///         size: 2,
///         average: vec![10.0, 20.0, 30.0],
///         centroid: Centroid { row: 0.0, col: 0.5 },
///     }],
///     overlay: None,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.ends_with("0\t2\t0.00,0.50\t10.0,20.0,30.0\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &SegmentationSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "image: {}", summary.image.display())?;
    writeln!(writer, "size: {}x{}", summary.cols, summary.rows)?;
    if let Some(path) = &summary.overlay {
        writeln!(writer, "overlay: {}", path.display())?;
    }
    writeln!(writer, "segments: {}", summary.segments.len())?;
    for segment in &summary.segments {
        let average = segment
            .average
            .iter()
            .map(|value| format!("{value:.1}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            writer,
            "{}\t{}\t{:.2},{:.2}\t{average}",
            segment.id, segment.size, segment.centroid.row, segment.centroid.col
        )?;
    }
    Ok(())
}
