//!
//! Command-line driver for RNAScope spot quantification.
#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};
use thiserror::Error;

use rnascope_algorithms::{
    to_grayscale, AcquisitionPlan, AcquisitionSession, Rect, SpotConfig, SubmitOutcome,
};
use rnascope_core::AnalysisResult;
use rnascope_io::{load_stack, ReportWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    RnascopeIo(#[from] rnascope_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] rnascope_core::Error),

    #[error("ROI file error: {0}")]
    RoiFile(#[from] serde_json::Error),

    #[error("ROI file has no entry for region '{region}' of image '{image}'")]
    MissingRegion { image: String, region: String },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// RNAScope spot quantification for multi-channel montage images.
#[derive(Parser)]
#[command(name = "rnascope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantify spots in pre-delineated ROIs of both montage images
    Quantify {
        /// Path to the hippocampus montage TIFF
        #[arg(long)]
        hippocampus: PathBuf,

        /// Path to the thalamus montage TIFF
        #[arg(long)]
        thalamus: PathBuf,

        /// JSON file mapping image -> region -> [left, top, width, height]
        #[arg(long)]
        rois: PathBuf,

        /// Output CSV path
        #[arg(short, long, default_value = "rnascope_results.csv")]
        output: PathBuf,

        /// Physical pixel spacing in microns per pixel
        #[arg(long, default_value = "0.4475")]
        pixel_spacing: f64,

        /// Images carry no depth axis (fail instead of projecting)
        #[arg(long)]
        max_projected: bool,

        /// Absolute intensity floor for spot detection
        #[arg(long, default_value = "100.0")]
        threshold: f64,

        /// Minimum separation between accepted spots (pixels)
        #[arg(long, default_value = "2")]
        min_distance: usize,

        /// Omit the SpotsPerSquareMicron column
        #[arg(long)]
        no_density: bool,
    },

    /// Show information about a montage TIFF
    Info {
        /// Input TIFF file
        input: PathBuf,

        /// Image carries no depth axis (fail instead of projecting)
        #[arg(long)]
        max_projected: bool,
    },

    /// Export a display-normalized channel as 8-bit grayscale PNG
    Preview {
        /// Input TIFF file
        input: PathBuf,

        /// Channel index (0 = reference, 1 = GOB, 2 = GOA)
        #[arg(short, long, default_value = "0")]
        channel: usize,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Image carries no depth axis (fail instead of projecting)
        #[arg(long)]
        max_projected: bool,
    },
}

/// ROI plan file contents: image label -> region name -> rectangle.
type RoiPlanFile = HashMap<String, HashMap<String, [usize; 4]>>;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Quantify {
            hippocampus,
            thalamus,
            rois,
            output,
            pixel_spacing,
            max_projected,
            threshold,
            min_distance,
            no_density,
        } => {
            let results = run_quantify(
                &hippocampus,
                &thalamus,
                &rois,
                pixel_spacing,
                max_projected,
                SpotConfig::new()
                    .with_threshold(threshold)
                    .with_min_distance(min_distance),
            )?;

            let mut writer = ReportWriter::create(&output)?;
            if no_density {
                writer = writer.without_density();
            }
            writer.write_results(&results)?;
            info!("wrote {} rows to {}", results.len(), output.display());
            println!("Results saved to {}", output.display());
        }

        Commands::Info {
            input,
            max_projected,
        } => {
            let stack = load_stack(&input, max_projected)?;
            println!("File: {}", input.display());
            println!("Stack: 3 x {} x {}", stack.height(), stack.width());
            for (index, label) in [(0, "reference"), (1, "GOB"), (2, "GOA")] {
                let channel = stack.channel(index);
                let min = channel.iter().copied().fold(f64::INFINITY, f64::min);
                let max = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                println!("Channel {} ({}): min {} max {}", index, label, min, max);
            }
        }

        Commands::Preview {
            input,
            channel,
            output,
            max_projected,
        } => {
            let stack = load_stack(&input, max_projected)?;
            if channel >= 3 {
                return Err(rnascope_core::Error::InvalidInput(format!(
                    "channel index {} out of range 0..3",
                    channel
                ))
                .into());
            }
            let gray = to_grayscale(stack.channel(channel))?;
            let (height, width) = gray.dim();
            let buffer: Vec<u8> = gray.iter().copied().collect();
            let (width, height) = (
                u32::try_from(width)
                    .map_err(|_| rnascope_core::Error::InvalidInput("image too wide".into()))?,
                u32::try_from(height)
                    .map_err(|_| rnascope_core::Error::InvalidInput("image too tall".into()))?,
            );
            let image = image::GrayImage::from_raw(width, height, buffer).ok_or_else(|| {
                rnascope_core::Error::InvalidInput("grayscale buffer size mismatch".into())
            })?;
            image.save(&output)?;
            info!("wrote preview to {}", output.display());
        }
    }

    Ok(())
}

/// Loads both stacks, replays the ROI file through the acquisition
/// session in prompt order, and returns the full result set.
fn run_quantify(
    hippocampus: &Path,
    thalamus: &Path,
    rois: &Path,
    pixel_spacing: f64,
    max_projected: bool,
    spot_config: SpotConfig,
) -> Result<Vec<AnalysisResult>> {
    // Both images load before any ROI is consumed; a failure in either
    // aborts startup with no partial session.
    info!("loading hippocampus montage: {}", hippocampus.display());
    let hippocampus_stack = load_stack(hippocampus, max_projected)?;
    info!("loading thalamus montage: {}", thalamus.display());
    let thalamus_stack = load_stack(thalamus, max_projected)?;

    let roi_file: RoiPlanFile = serde_json::from_reader(File::open(rois)?)?;

    let plan = AcquisitionPlan::hippocampus_thalamus();
    let mut session = AcquisitionSession::new(
        plan,
        vec![hippocampus_stack, thalamus_stack],
        pixel_spacing,
        spot_config,
    )?;

    loop {
        let (image, region) = {
            let prompt = session
                .current_prompt()
                .ok_or_else(|| rnascope_core::Error::InvalidState("session already complete".into()))?;
            (prompt.image.to_string(), prompt.region.to_string())
        };

        let rect = roi_file
            .get(&image)
            .and_then(|regions| regions.get(&region))
            .copied()
            .ok_or_else(|| CliError::MissingRegion {
                image: image.clone(),
                region: region.clone(),
            })?;
        let [left, top, width, height] = rect;
        if width == 0 || height == 0 {
            warn!("region '{}' of '{}' has zero area", region, image);
        }

        match session.submit(Rect::new(left, top, width, height))? {
            SubmitOutcome::AwaitingRegion { .. } => {}
            SubmitOutcome::ImageAdvanced { image, .. } => {
                info!("switching to image '{}'", image);
            }
            SubmitOutcome::Complete(results) => return Ok(results),
        }
    }
}
