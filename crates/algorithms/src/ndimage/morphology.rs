//! Binary morphology
//!
//! One-voxel binary dilation under full-neighborhood (3^N cube)
//! connectivity, the growth step of the saddle-trimming loop.

use ndarray::ArrayD;
use poremark_core::Result;

use super::{check_ndim, neighbor_offsets, shifted, unravel};

/// Dilate a boolean mask by one voxel, diagonals included.
///
/// A voxel is set in the output if it or any of its 3^N - 1 neighbors
/// is set in the input. Out-of-bounds neighbors are treated as unset.
pub fn binary_dilation(mask: &ArrayD<bool>) -> Result<ArrayD<bool>> {
    check_ndim(mask.ndim())?;

    let shape = mask.shape().to_vec();
    let offsets = neighbor_offsets(mask.ndim());
    let mut out = mask.clone();

    for (flat, &set) in mask.iter().enumerate() {
        if !set {
            continue;
        }
        let idx = unravel(flat, &shape);
        for &off in &offsets {
            if let Some(nidx) = shifted(idx, off, &shape) {
                out[&nidx[..shape.len()]] = true;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_single_voxel_grows_to_cube() {
        let mut mask = ArrayD::from_elem(IxDyn(&[5, 5]), false);
        mask[[2, 2]] = true;
        let out = binary_dilation(&mask).unwrap();
        assert_eq!(out.iter().filter(|&&v| v).count(), 9);
        assert!(out[[1, 1]]);
        assert!(out[[3, 3]]);
        assert!(!out[[0, 0]]);
    }

    #[test]
    fn test_corner_clips() {
        let mut mask = ArrayD::from_elem(IxDyn(&[4, 4]), false);
        mask[[0, 0]] = true;
        let out = binary_dilation(&mask).unwrap();
        assert_eq!(out.iter().filter(|&&v| v).count(), 4);
    }

    #[test]
    fn test_empty_stays_empty() {
        let mask = ArrayD::from_elem(IxDyn(&[4, 4]), false);
        let out = binary_dilation(&mask).unwrap();
        assert!(out.iter().all(|&v| !v));
    }

    #[test]
    fn test_3d_grows_to_27() {
        let mut mask = ArrayD::from_elem(IxDyn(&[5, 5, 5]), false);
        mask[[2, 2, 2]] = true;
        let out = binary_dilation(&mask).unwrap();
        assert_eq!(out.iter().filter(|&&v| v).count(), 27);
    }
}
