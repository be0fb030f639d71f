//! Connected-component labeling and per-label measurements
//!
//! Components are maximal sets of `true` voxels connected under
//! full-neighborhood (diagonals included) adjacency. Labels are dense
//! integers from 1; 0 is background. Label order follows the row-major
//! scan and is deterministic, but callers must not rely on a particular
//! integer-to-location mapping.

use std::collections::VecDeque;

use ndarray::ArrayD;
use poremark_core::Result;

use super::{check_ndim, neighbor_offsets, shifted, unravel};

/// A labeled mask: the label array and the number of components
#[derive(Debug, Clone)]
pub struct Labeled {
    /// Component label per voxel, 0 = background
    pub labels: ArrayD<u32>,
    /// Number of components
    pub count: usize,
}

/// Axis-aligned bounding box of one component (`hi` is exclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub lo: Vec<usize>,
    pub hi: Vec<usize>,
}

impl BoundingBox {
    /// Expand by `pad` voxels on every side, clamped to the array shape.
    pub fn padded(&self, pad: usize, shape: &[usize]) -> BoundingBox {
        let lo = self
            .lo
            .iter()
            .map(|&l| l.saturating_sub(pad))
            .collect();
        let hi = self
            .hi
            .iter()
            .zip(shape)
            .map(|(&h, &side)| (h + pad).min(side))
            .collect();
        BoundingBox { lo, hi }
    }
}

/// Label connected components of a boolean mask (full connectivity).
///
/// Flood fill with a queue; each unvisited `true` voxel seeds the next
/// component.
pub fn label(mask: &ArrayD<bool>) -> Result<Labeled> {
    check_ndim(mask.ndim())?;

    let shape = mask.shape().to_vec();
    let ndim = shape.len();
    let offsets = neighbor_offsets(ndim);
    let mut labels = ArrayD::<u32>::zeros(mask.raw_dim());
    let mut count = 0u32;
    let mut queue: VecDeque<[usize; 3]> = VecDeque::new();

    for (flat, &set) in mask.iter().enumerate() {
        if !set {
            continue;
        }
        let seed = unravel(flat, &shape);
        if labels[&seed[..ndim]] != 0 {
            continue;
        }

        count += 1;
        labels[&seed[..ndim]] = count;
        queue.push_back(seed);

        while let Some(idx) = queue.pop_front() {
            for &off in &offsets {
                if let Some(nidx) = shifted(idx, off, &shape) {
                    if mask[&nidx[..ndim]] && labels[&nidx[..ndim]] == 0 {
                        labels[&nidx[..ndim]] = count;
                        queue.push_back(nidx);
                    }
                }
            }
        }
    }

    Ok(Labeled {
        labels,
        count: count as usize,
    })
}

/// Bounding box of every component, indexed by label - 1.
pub fn find_objects(labeled: &Labeled) -> Vec<BoundingBox> {
    let shape = labeled.labels.shape().to_vec();
    let ndim = shape.len();
    let mut boxes = vec![
        BoundingBox {
            lo: shape.clone(),
            hi: vec![0; ndim],
        };
        labeled.count
    ];

    for (flat, &lbl) in labeled.labels.iter().enumerate() {
        if lbl == 0 {
            continue;
        }
        let idx = unravel(flat, &shape);
        let bb = &mut boxes[(lbl - 1) as usize];
        for d in 0..ndim {
            bb.lo[d] = bb.lo[d].min(idx[d]);
            bb.hi[d] = bb.hi[d].max(idx[d] + 1);
        }
    }
    boxes
}

/// Geometric center of mass of every component, indexed by label - 1.
///
/// Coordinates are padded to three components; unused components stay 0.
pub fn center_of_mass(labeled: &Labeled) -> Vec<[f64; 3]> {
    let shape = labeled.labels.shape().to_vec();
    let ndim = shape.len();
    let mut sums = vec![[0.0f64; 3]; labeled.count];
    let mut sizes = vec![0usize; labeled.count];

    for (flat, &lbl) in labeled.labels.iter().enumerate() {
        if lbl == 0 {
            continue;
        }
        let idx = unravel(flat, &shape);
        let i = (lbl - 1) as usize;
        for d in 0..ndim {
            sums[i][d] += idx[d] as f64;
        }
        sizes[i] += 1;
    }

    for (sum, &size) in sums.iter_mut().zip(&sizes) {
        for v in sum.iter_mut() {
            *v /= size as f64;
        }
    }
    sums
}
