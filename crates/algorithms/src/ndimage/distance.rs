//! Exact Euclidean distance transform
//!
//! Separable squared-distance transform: a 1-d lower-envelope-of-parabolas
//! pass along each axis, followed by a square root. Exact for arbitrary
//! dimensionality; this crate restricts it to 2-d and 3-d.
//!
//! Reference:
//! Felzenszwalb, P.F. & Huttenlocher, D.P. (2012). Distance transforms
//! of sampled functions. Theory of Computing, 8(19).

use ndarray::{ArrayD, Axis};
use poremark_core::Result;

use super::check_ndim;

/// Exact Euclidean distance transform of a boolean mask.
///
/// Each `true` voxel receives its Euclidean distance to the nearest
/// `false` voxel; `false` voxels receive 0. An all-`true` mask yields
/// large finite values bounded by the array extent.
///
/// # Arguments
/// * `mask` - Domain mask, `true` = pore space
pub fn distance_transform_edt(mask: &ArrayD<bool>) -> Result<ArrayD<f64>> {
    check_ndim(mask.ndim())?;

    // Finite stand-in for "no source yet": larger than any reachable
    // squared distance, and keeps the envelope arithmetic NaN-free.
    let extent: f64 = mask.shape().iter().map(|&s| s as f64).sum();
    let far = extent * extent;

    let mut sq = mask.mapv(|pore| if pore { far } else { 0.0 });

    for ax in 0..mask.ndim() {
        let n = mask.shape()[ax];
        let mut line = vec![0.0; n];
        for mut lane in sq.lanes_mut(Axis(ax)) {
            for (dst, &src) in line.iter_mut().zip(lane.iter()) {
                *dst = src;
            }
            let transformed = envelope_1d(&line);
            for (dst, src) in lane.iter_mut().zip(transformed) {
                *dst = src;
            }
        }
    }

    Ok(sq.mapv(f64::sqrt))
}

/// 1-d squared-distance transform of a sampled function via the lower
/// envelope of the parabolas `f[i] + (q - i)^2`.
fn envelope_1d(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    if n == 1 {
        return vec![f[0]];
    }

    // v: parabola apex positions, z: envelope breakpoints
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(f, q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(f, q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    let mut out = vec![0.0; n];
    let mut k = 0usize;
    for (q, dst) in out.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - v[k] as f64;
        *dst = d * d + f[v[k]];
    }
    out
}

/// Horizontal position where parabolas rooted at q and p cross.
#[inline]
fn intersect(f: &[f64], q: usize, p: usize) -> f64 {
    let (qf, pf) = (q as f64, p as f64);
    ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
}
