//! Saddle-point elimination
//!
//! A candidate blob that sits on a ridge or saddle of the distance
//! transform passes the coarse local-maximum test but is not a true
//! peak. Growing the blob reveals which one it is: growth that finds
//! nothing higher confirms a peak, growth that walks away entirely
//! exposes a saddle.
//!
//! Each blob is examined inside its own padded bounding window, so the
//! cost is bounded by the blob's neighborhood rather than the whole
//! field. Blob decisions are pure reads of the label and field arrays
//! and run in parallel; writes clear only a discarded blob's own voxels.

use ndarray::{ArrayD, Slice, Zip};
use poremark_core::{Algorithm, Error, Result};
use tracing::debug;

use crate::maybe_rayon::*;
use crate::ndimage::{binary_dilation, find_objects, label, BoundingBox, Labeled};

/// Parameters for saddle-point trimming
#[derive(Debug, Clone)]
pub struct TrimSaddleParams {
    /// Padding around each blob's bounding box, in voxels.
    ///
    /// Growth must converge before reaching the padded window edge; a
    /// margin too small for the dataset resolution silently truncates
    /// growth. A debug event is emitted when a blob's dilation touches
    /// a clipped window edge.
    pub pad: usize,
    /// Iteration cap for the grow-and-test loop. Reaching the cap keeps
    /// the blob (conservative retention).
    pub max_iters: usize,
}

impl Default for TrimSaddleParams {
    fn default() -> Self {
        Self {
            pad: 10,
            max_iters: 10,
        }
    }
}

/// Saddle-point trimming algorithm
#[derive(Debug, Clone, Default)]
pub struct TrimSaddlePoints;

impl Algorithm for TrimSaddlePoints {
    type Input = (ArrayD<bool>, ArrayD<f64>);
    type Output = ArrayD<bool>;
    type Params = TrimSaddleParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "TrimSaddlePoints"
    }

    fn description(&self) -> &'static str {
        "Remove candidate peaks that lie on saddles or ridges of the distance transform"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        trim_saddle_points(&input.0, &input.1, &params)
    }
}

/// Remove candidate peaks that lie on saddles or ridges.
///
/// Per connected blob, in label order: dilate a copy of the blob one
/// voxel at a time (full connectivity) and rebuild the set of pore
/// voxels holding the maximum field value over the dilated region.
/// If that set equals the original blob, the blob is a confirmed peak;
/// if it no longer intersects the blob, the blob sat on a saddle and is
/// discarded. Ambiguous intermediate states keep dilating up to
/// `max_iters`, after which the blob is kept as-is.
pub fn trim_saddle_points(
    peaks: &ArrayD<bool>,
    dt: &ArrayD<f64>,
    params: &TrimSaddleParams,
) -> Result<ArrayD<bool>> {
    if peaks.shape() != dt.shape() {
        return Err(Error::ShapeMismatch {
            expected: dt.shape().to_vec(),
            actual: peaks.shape().to_vec(),
        });
    }

    let labeled = label(peaks)?;
    if labeled.count == 0 {
        return Ok(peaks.clone());
    }
    let boxes = find_objects(&labeled);
    let shape = peaks.shape().to_vec();

    let keep: Vec<bool> = (1..=labeled.count as u32)
        .into_par_iter()
        .map(|lbl| decide_blob(lbl, &boxes[(lbl - 1) as usize], &labeled, dt, &shape, params))
        .collect::<Result<Vec<_>>>()?;

    let mut out = peaks.clone();
    for (i, &kept) in keep.iter().enumerate() {
        if kept {
            continue;
        }
        let lbl = (i + 1) as u32;
        let bb = &boxes[i];
        let labels_w = labeled
            .labels
            .slice_each_axis(|ax| Slice::from(bb.lo[ax.axis.index()]..bb.hi[ax.axis.index()]));
        let mut out_w = out
            .slice_each_axis_mut(|ax| Slice::from(bb.lo[ax.axis.index()]..bb.hi[ax.axis.index()]));
        Zip::from(&mut out_w).and(&labels_w).for_each(|o, &l| {
            if l == lbl {
                *o = false;
            }
        });
    }
    Ok(out)
}

/// Grow one blob inside its padded window and decide its fate.
/// Returns `true` to keep the blob, `false` to discard it as a saddle.
fn decide_blob(
    lbl: u32,
    bb: &BoundingBox,
    labeled: &Labeled,
    dt: &ArrayD<f64>,
    shape: &[usize],
    params: &TrimSaddleParams,
) -> Result<bool> {
    let win = bb.padded(params.pad, shape);
    let labels_w = labeled
        .labels
        .slice_each_axis(|ax| Slice::from(win.lo[ax.axis.index()]..win.hi[ax.axis.index()]));
    let dt_w = dt
        .slice_each_axis(|ax| Slice::from(win.lo[ax.axis.index()]..win.hi[ax.axis.index()]));

    let blob: ArrayD<bool> = labels_w.map(|&l| l == lbl);
    let pore: ArrayD<bool> = dt_w.map(|&v| v > 0.0);

    let mut dilated = blob.clone();
    let mut touched_clipped_edge = false;
    let mut kept = true;

    for _ in 0..params.max_iters {
        dilated = binary_dilation(&dilated)?;
        if !touched_clipped_edge {
            touched_clipped_edge = touches_clipped_edge(&dilated, &win, shape);
        }

        // Maximum field value over the dilated region (solid is 0 there,
        // so pore restriction cannot lower it)
        let mut max_val = f64::NEG_INFINITY;
        Zip::from(&dilated).and(&dt_w).for_each(|&d, &v| {
            if d && v > max_val {
                max_val = v;
            }
        });

        // Pore voxels in the dilated region holding that maximum
        let mut trial = ArrayD::from_elem(blob.raw_dim(), false);
        Zip::from(&mut trial)
            .and(&dilated)
            .and(&pore)
            .and(&dt_w)
            .for_each(|t, &d, &p, &v| *t = d && p && v == max_val);

        if trial == blob {
            // Growth found nothing new: a self-consistent local maximum
            kept = true;
            break;
        }
        if !trial.iter().zip(blob.iter()).any(|(&t, &b)| t && b) {
            // Growth walked away entirely: the blob sat on a saddle
            kept = false;
            break;
        }
        // Ambiguous: keep dilating. Falling out of the loop keeps the
        // blob, which is the deliberate conservative policy at the cap.
    }

    if touched_clipped_edge {
        debug!(
            label = lbl,
            pad = params.pad,
            "blob growth reached its padded window edge; pad may be too small"
        );
    }
    Ok(kept)
}

/// Whether the dilated mask touches a window face that was clipped by the
/// padding margin (faces lying on the array boundary do not count; growth
/// is legitimately stopped there by the domain).
fn touches_clipped_edge(dilated: &ArrayD<bool>, win: &BoundingBox, shape: &[usize]) -> bool {
    let ndim = shape.len();
    for d in 0..ndim {
        let side = win.hi[d] - win.lo[d];
        let low_clipped = win.lo[d] > 0;
        let high_clipped = win.hi[d] < shape[d];
        if !(low_clipped || high_clipped) {
            continue;
        }
        let mut any = false;
        let lanes = dilated.lanes(ndarray::Axis(d));
        for lane in lanes {
            if (low_clipped && lane[0]) || (high_clipped && lane[side - 1]) {
                any = true;
                break;
            }
        }
        if any {
            return true;
        }
    }
    false
}
