//! Maximum filter over an explicit footprint
//!
//! Replaces each voxel with the maximum value inside the footprint
//! neighborhood centered on it. Neighbors outside the array are ignored,
//! so the window shrinks at the borders instead of wrapping or padding.

use ndarray::{ArrayD, IxDyn};
use poremark_core::{Error, Footprint, Result};

use crate::maybe_rayon::*;

use super::{check_ndim, shifted, unravel};

/// Apply a maximum filter to a scalar field.
///
/// # Arguments
/// * `field` - Input field (2-d or 3-d)
/// * `footprint` - Neighborhood shape; must match the field dimensionality
pub fn maximum_filter(field: &ArrayD<f64>, footprint: &Footprint) -> Result<ArrayD<f64>> {
    check_ndim(field.ndim())?;
    footprint.validate()?;
    if footprint.ndim() != field.ndim() {
        return Err(Error::InvalidParameter {
            name: "footprint",
            value: format!("{}-d", footprint.ndim()),
            reason: format!("footprint must match the {}-d field", field.ndim()),
        });
    }

    let shape = field.shape().to_vec();
    let inner: usize = shape[1..].iter().product();
    let offsets = footprint.offsets();

    let data: Vec<f64> = (0..shape[0])
        .into_par_iter()
        .flat_map(|i0| {
            let mut plane = vec![f64::NEG_INFINITY; inner];
            for (rest, out) in plane.iter_mut().enumerate() {
                let mut idx = unravel(rest, &shape[1..]);
                // Prepend the leading-axis coordinate
                for d in (0..shape.len() - 1).rev() {
                    idx[d + 1] = idx[d];
                }
                idx[0] = i0;

                let mut max_val = f64::NEG_INFINITY;
                for &off in &offsets {
                    if let Some(nidx) = shifted(idx, off, &shape) {
                        let v = field[&nidx[..shape.len()]];
                        if v > max_val {
                            max_val = v;
                        }
                    }
                }
                *out = max_val;
            }
            plane
        })
        .collect();

    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| Error::Other(e.to_string()))
}
