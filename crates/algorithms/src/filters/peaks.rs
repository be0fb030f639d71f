//! Candidate peak detection (maximum-filter local-maximum test)
//!
//! A voxel is a candidate peak when its field value equals the maximum
//! over a round neighborhood and it lies in the pore space. Candidates
//! still include saddle artifacts and near-duplicate maxima; those are
//! handled by the trimming stages.

use ndarray::{ArrayD, Zip};
use poremark_core::{Algorithm, Error, Footprint, Result};

use crate::ndimage::{center_of_mass, label, maximum_filter};

/// Parameters for candidate peak detection
#[derive(Debug, Clone)]
pub struct FindPeaksParams {
    /// Radius of the round structuring element used by the maximum filter
    pub radius: usize,
    /// Explicit footprint overriding the default disk/ball shape
    pub footprint: Option<Footprint>,
}

impl Default for FindPeaksParams {
    fn default() -> Self {
        Self {
            radius: 4,
            footprint: None,
        }
    }
}

/// Candidate peak detection algorithm
#[derive(Debug, Clone, Default)]
pub struct FindPeaks;

impl Algorithm for FindPeaks {
    type Input = ArrayD<f64>;
    type Output = ArrayD<bool>;
    type Params = FindPeaksParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "FindPeaks"
    }

    fn description(&self) -> &'static str {
        "Local maxima of the distance transform over a round neighborhood"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        find_peaks(&input, &params)
    }
}

/// Find all local maxima of a distance-transform field.
///
/// The pore space is taken as `dt > 0`. The field fed to the maximum
/// filter is biased by +2 on solid voxels so the filter never reports a
/// pore voxel as tied with an adjacent solid voxel; the equality test
/// afterward uses the unbiased field, so the bias cannot change which
/// pore voxels qualify.
///
/// # Arguments
/// * `dt` - Distance transform of the pore space (2-d or 3-d)
/// * `params` - Neighborhood radius (default 4) or explicit footprint
pub fn find_peaks(dt: &ArrayD<f64>, params: &FindPeaksParams) -> Result<ArrayD<bool>> {
    let footprint = match &params.footprint {
        Some(fp) => {
            fp.validate()?;
            fp.clone()
        }
        None => Footprint::ball_like(dt.ndim(), params.radius)?,
    };

    let biased = dt.mapv(|v| if v > 0.0 { v } else { v + 2.0 });
    let mx = maximum_filter(&biased, &footprint)?;

    let mut peaks = ArrayD::from_elem(dt.raw_dim(), false);
    Zip::from(&mut peaks)
        .and(dt)
        .and(&mx)
        .for_each(|p, &d, &m| *p = d > 0.0 && d == m);
    Ok(peaks)
}

/// Collapse each peak blob to a single voxel at its floored centroid.
///
/// The centroid of a non-convex blob may fall on a voxel outside the
/// blob; the result is a fresh mask, not a subset of the input.
pub fn reduce_peaks_to_points(peaks: &ArrayD<bool>) -> Result<ArrayD<bool>> {
    let labeled = label(peaks)?;
    let coms = center_of_mass(&labeled);
    let ndim = peaks.ndim();

    let mut out = ArrayD::from_elem(peaks.raw_dim(), false);
    for com in coms {
        let idx: Vec<usize> = com[..ndim].iter().map(|&c| c as usize).collect();
        out[&idx[..]] = true;
    }
    Ok(out)
}
