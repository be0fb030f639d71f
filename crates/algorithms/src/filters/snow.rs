//! Peak-extraction pipeline
//!
//! Sequences the full refinement chain over a pore-space image:
//! distance transform (or a caller-supplied field), optional Gaussian
//! smoothing, candidate detection, saddle trimming, proximity merging,
//! and a final relabel into a unique-integer marker image suitable for
//! seeding a marker-based watershed segmentation.

use ndarray::ArrayD;
use poremark_core::{Algorithm, Error, Footprint, Result};
use tracing::{debug, info};

use crate::ndimage::{distance_transform_edt, gaussian_filter, label};

use super::{find_peaks, trim_nearby_peaks, trim_saddle_points, FindPeaksParams, TrimSaddleParams};

/// Input to the pipeline: a domain mask or a pre-computed field
#[derive(Debug, Clone)]
pub enum SnowInput {
    /// Boolean domain mask, `true` = pore space; the distance transform
    /// is computed internally
    Mask(ArrayD<bool>),
    /// Pre-computed distance transform, zero at and outside the solid;
    /// faster when one is already available
    Distance(ArrayD<f64>),
}

impl SnowInput {
    fn ndim(&self) -> usize {
        match self {
            SnowInput::Mask(m) => m.ndim(),
            SnowInput::Distance(d) => d.ndim(),
        }
    }
}

/// Parameters for the pipeline
#[derive(Debug, Clone)]
pub struct SnowParams {
    /// Radius of the round structuring element in the detection stage
    pub r_max: usize,
    /// Standard deviation of the Gaussian pre-smoothing; 0 disables it,
    /// useful when the supplied field is already processed
    pub sigma: f64,
    /// Explicit detection footprint overriding the default disk/ball
    pub footprint: Option<Footprint>,
    /// Saddle-trimming window padding and iteration cap
    pub saddle: TrimSaddleParams,
}

impl Default for SnowParams {
    fn default() -> Self {
        Self {
            r_max: 4,
            sigma: 0.4,
            footprint: None,
            saddle: TrimSaddleParams::default(),
        }
    }
}

/// Result of the pipeline: the marker image and per-stage peak counts
#[derive(Debug, Clone)]
pub struct SnowExtraction {
    /// Marker image: 0 = background, 1..N = unique peak identifiers
    pub markers: ArrayD<u32>,
    /// Candidate peaks straight out of detection
    pub initial_peaks: usize,
    /// Peaks surviving saddle trimming
    pub after_saddle_trim: usize,
    /// Peaks surviving proximity merging (= markers in the output)
    pub final_peaks: usize,
}

/// Peak-extraction pipeline algorithm
#[derive(Debug, Clone, Default)]
pub struct Snow;

impl Algorithm for Snow {
    type Input = SnowInput;
    type Output = SnowExtraction;
    type Params = SnowParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Snow"
    }

    fn description(&self) -> &'static str {
        "Extract true local maxima of a pore-space distance transform as watershed markers"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        snow(&input, &params)
    }
}

/// Extract the true local maxima of the distance transform of a
/// pore-space image.
///
/// The returned markers can be fed directly to a marker-based watershed
/// segmentation. Degenerate inputs (all-solid or empty domains) yield an
/// all-zero marker image; inputs that are neither 2-d nor 3-d fail with
/// [`Error::UnsupportedDimension`].
pub fn snow(input: &SnowInput, params: &SnowParams) -> Result<SnowExtraction> {
    let ndim = input.ndim();
    if !(2..=3).contains(&ndim) {
        return Err(Error::UnsupportedDimension { ndim });
    }

    let mut dt = match input {
        SnowInput::Mask(mask) => distance_transform_edt(mask)?,
        SnowInput::Distance(field) => field.clone(),
    };

    if params.sigma > 0.0 {
        dt = gaussian_filter(&dt, params.sigma)?;
        debug!(sigma = params.sigma, "smoothed distance transform");
    }

    let detect = FindPeaksParams {
        radius: params.r_max,
        footprint: params.footprint.clone(),
    };
    let peaks = find_peaks(&dt, &detect)?;
    let initial_peaks = label(&peaks)?.count;
    info!(initial_peaks, "detected candidate peaks");

    let peaks = trim_saddle_points(&peaks, &dt, &params.saddle)?;
    let after_saddle_trim = label(&peaks)?.count;
    debug!(after_saddle_trim, "trimmed saddle points");

    let peaks = trim_nearby_peaks(&peaks, &dt)?;

    let labeled = label(&peaks)?;
    info!(final_peaks = labeled.count, "peak extraction finished");

    Ok(SnowExtraction {
        markers: labeled.labels,
        initial_peaks,
        after_saddle_trim,
        final_peaks: labeled.count,
    })
}
