//! N-dimensional image-processing primitives
//!
//! Building blocks for the peak-refinement pipeline, each operating on
//! dynamic-dimension ndarray arrays (2-d and 3-d are supported):
//! - **distance**: exact Euclidean distance transform of a boolean mask
//! - **gaussian**: separable Gaussian smoothing
//! - **filter**: maximum filter over an explicit footprint
//! - **morphology**: one-voxel binary dilation, full connectivity
//! - **label**: connected-component labeling, bounding boxes, centroids

mod distance;
mod filter;
mod gaussian;
mod label;
mod morphology;

pub use distance::distance_transform_edt;
pub use filter::maximum_filter;
pub use gaussian::gaussian_filter;
pub use label::{center_of_mass, find_objects, label, BoundingBox, Labeled};
pub use morphology::binary_dilation;

use poremark_core::{Error, Footprint, Result};

/// Reject arrays that are not 2-d or 3-d.
pub(crate) fn check_ndim(ndim: usize) -> Result<()> {
    if (2..=3).contains(&ndim) {
        Ok(())
    } else {
        Err(Error::UnsupportedDimension { ndim })
    }
}

/// Full-connectivity neighbor offsets (3^N cube without the center).
pub(crate) fn neighbor_offsets(ndim: usize) -> Vec<[isize; 3]> {
    Footprint::Cube { radius: 1, ndim }
        .offsets()
        .into_iter()
        .filter(|off| off != &[0, 0, 0])
        .collect()
}

/// Apply an offset to a voxel index, `None` if it leaves the array.
///
/// Indices are padded to three components; unused components stay 0.
#[inline]
pub(crate) fn shifted(idx: [usize; 3], off: [isize; 3], shape: &[usize]) -> Option<[usize; 3]> {
    let mut out = [0usize; 3];
    for (d, &side) in shape.iter().enumerate() {
        let v = idx[d] as isize + off[d];
        if v < 0 || v >= side as isize {
            return None;
        }
        out[d] = v as usize;
    }
    Some(out)
}

/// Row-major multi-index of a flat position.
#[inline]
pub(crate) fn unravel(mut flat: usize, shape: &[usize]) -> [usize; 3] {
    let mut idx = [0usize; 3];
    for d in (0..shape.len()).rev() {
        idx[d] = flat % shape[d];
        flat /= shape[d];
    }
    idx
}
