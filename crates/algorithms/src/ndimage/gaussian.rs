//! Separable Gaussian smoothing
//!
//! One 1-d convolution per axis with a normalized Gaussian kernel,
//! truncated at four standard deviations. Borders are handled by
//! reflection about the edge between the first/last samples.

use ndarray::{ArrayD, Axis};
use poremark_core::Result;

use super::check_ndim;

/// Number of standard deviations covered by the kernel
const TRUNCATE: f64 = 4.0;

/// Smooth a scalar field with a Gaussian of the given standard deviation.
///
/// `sigma <= 0` disables smoothing and returns the field unchanged,
/// so a pre-smoothed distance transform can be passed straight through.
pub fn gaussian_filter(field: &ArrayD<f64>, sigma: f64) -> Result<ArrayD<f64>> {
    check_ndim(field.ndim())?;
    if sigma <= 0.0 {
        return Ok(field.clone());
    }

    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() / 2;

    let mut out = field.clone();
    for ax in 0..field.ndim() {
        let n = field.shape()[ax];
        let mut line = vec![0.0; n];
        for mut lane in out.lanes_mut(Axis(ax)) {
            for (dst, &src) in line.iter_mut().zip(lane.iter()) {
                *dst = src;
            }
            for (q, dst) in lane.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (t, &w) in kernel.iter().enumerate() {
                    let i = q as isize + t as isize - radius as isize;
                    acc += w * line[reflect(i, n as isize)];
                }
                *dst = acc;
            }
        }
    }
    Ok(out)
}

/// Normalized Gaussian weights, radius `TRUNCATE * sigma`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    let denom = 2.0 * sigma * sigma;
    for t in -(radius as isize)..=(radius as isize) {
        let d = t as f64;
        kernel.push((-d * d / denom).exp());
    }
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Reflect an index into `0..n` (d c b a | a b c d).
#[inline]
fn reflect(mut i: isize, n: isize) -> usize {
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - 1 - i;
        } else {
            return i as usize;
        }
    }
}
