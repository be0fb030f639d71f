//! Proximity-based peak merging
//!
//! Two surviving peaks that are closer to each other than either is to
//! the solid boundary almost certainly arose from the same pore; the
//! weaker of the pair (smaller distance to solid) is removed. Peak
//! separation is measured between blob centroids through a k-d tree.

use std::collections::BTreeSet;

use ndarray::{ArrayD, Slice, Zip};
use poremark_core::{Algorithm, Error, Result};

use crate::ndimage::{center_of_mass, find_objects, label};
use crate::spatial::KdTree;

/// Parameters for proximity merging (none yet)
#[derive(Debug, Clone, Default)]
pub struct TrimNearbyPeaksParams;

/// Proximity-merging algorithm
#[derive(Debug, Clone, Default)]
pub struct TrimNearbyPeaks;

impl Algorithm for TrimNearbyPeaks {
    type Input = (ArrayD<bool>, ArrayD<f64>);
    type Output = ArrayD<bool>;
    type Params = TrimNearbyPeaksParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "TrimNearbyPeaks"
    }

    fn description(&self) -> &'static str {
        "Remove the weaker of any two peaks closer to each other than to the solid"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        trim_nearby_peaks(&input.0, &input.1)
    }
}

/// Remove peaks that are nearer to another peak than to the solid.
///
/// Each labeled blob is reduced to its floored centroid; a centroid is
/// contested when the distance to its nearest other centroid is smaller
/// than its own field value (its distance to the solid). Of a contested
/// pair, the centroid with the smaller distance to solid is dropped —
/// a symmetric rule over the unordered pair, so the outcome does not
/// depend on iteration order.
///
/// Removing a peak can hand a survivor a new, closer nearest neighbor,
/// so passes repeat until no contested pair remains. The result is a
/// fixpoint: running the stage on its own output changes nothing. With
/// fewer than two peaks the stage is a no-op.
pub fn trim_nearby_peaks(peaks: &ArrayD<bool>, dt: &ArrayD<f64>) -> Result<ArrayD<bool>> {
    if peaks.shape() != dt.shape() {
        return Err(Error::ShapeMismatch {
            expected: dt.shape().to_vec(),
            actual: peaks.shape().to_vec(),
        });
    }

    let mut out = peaks.clone();
    loop {
        match merge_pass(&out, dt)? {
            Some(next) => out = next,
            None => return Ok(out),
        }
    }
}

/// One merge pass. Returns the reduced mask, or `None` when no pair is
/// contested (the input is already a fixpoint).
fn merge_pass(peaks: &ArrayD<bool>, dt: &ArrayD<f64>) -> Result<Option<ArrayD<bool>>> {
    let labeled = label(peaks)?;
    if labeled.count < 2 {
        return Ok(None);
    }
    let ndim = peaks.ndim();

    // Floored centroids, also used to sample the distance to solid
    let centroids: Vec<[f64; 3]> = center_of_mass(&labeled)
        .into_iter()
        .map(|com| {
            let mut p = [0.0; 3];
            for d in 0..ndim {
                p[d] = com[d].floor();
            }
            p
        })
        .collect();

    let dist_to_solid: Vec<f64> = centroids
        .iter()
        .map(|p| {
            let idx: Vec<usize> = p[..ndim].iter().map(|&c| c as usize).collect();
            dt[&idx[..]]
        })
        .collect();

    let tree = KdTree::build(&centroids, ndim);

    let mut drop: BTreeSet<usize> = BTreeSet::new();
    for (i, p) in centroids.iter().enumerate() {
        let Some(neighbor) = nearest_other(&tree, *p, i) else {
            continue;
        };
        let dist_to_neighbor = neighbor.distance_sq.sqrt();
        if dist_to_neighbor >= dist_to_solid[i] {
            continue;
        }
        drop.insert(weaker_of(i, neighbor.index, &dist_to_solid));
    }

    if drop.is_empty() {
        return Ok(None);
    }

    let boxes = find_objects(&labeled);
    let mut out = peaks.clone();
    for &i in &drop {
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
    Ok(Some(out))
}

/// The peak of a contested pair to remove: the one closer to the solid.
///
/// A function of the unordered pair, so the outcome is the same from
/// whichever side the pair was discovered. An exact tie removes the
/// higher-labeled peak; removing both would empty a pore entirely.
fn weaker_of(a: usize, b: usize, dist_to_solid: &[f64]) -> usize {
    if dist_to_solid[a] < dist_to_solid[b] {
        a
    } else if dist_to_solid[b] < dist_to_solid[a] {
        b
    } else {
        a.max(b)
    }
}

/// The nearest centroid other than the query's own entry.
fn nearest_other(
    tree: &KdTree,
    p: [f64; 3],
    own_index: usize,
) -> Option<crate::spatial::NearestResult> {
    tree.k_nearest(p, 2).into_iter().find(|r| r.index != own_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    /// A field where two point peaks sit in one wide pore: distance to
    /// solid exceeds their separation.
    fn contested_pair() -> (ArrayD<bool>, ArrayD<f64>) {
        let mut dt = ArrayD::from_elem(IxDyn(&[15, 15]), 1.0);
        dt[[7, 6]] = 6.0;
        dt[[7, 9]] = 5.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[15, 15]), false);
        peaks[[7, 6]] = true;
        peaks[[7, 9]] = true;
        (peaks, dt)
    }

    #[test]
    fn test_contested_pair_drops_weaker() {
        let (peaks, dt) = contested_pair();
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        // Separation 3 < both distances to solid (6 and 5): the peak
        // with the smaller distance to solid yields
        assert!(merged[[7, 6]]);
        assert!(!merged[[7, 9]]);
    }

    #[test]
    fn test_distant_pair_untouched() {
        let mut dt = ArrayD::from_elem(IxDyn(&[9, 30]), 1.0);
        dt[[4, 4]] = 3.0;
        dt[[4, 25]] = 3.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[9, 30]), false);
        peaks[[4, 4]] = true;
        peaks[[4, 25]] = true;
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert!(merged[[4, 4]]);
        assert!(merged[[4, 25]]);
    }

    #[test]
    fn test_single_peak_noop() {
        let mut dt = ArrayD::from_elem(IxDyn(&[9, 9]), 0.0);
        dt[[4, 4]] = 3.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[9, 9]), false);
        peaks[[4, 4]] = true;
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert_eq!(merged, peaks);
    }

    #[test]
    fn test_empty_mask_noop() {
        let dt = ArrayD::from_elem(IxDyn(&[9, 9]), 0.0);
        let peaks = ArrayD::from_elem(IxDyn(&[9, 9]), false);
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert!(merged.iter().all(|&p| !p));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let (peaks, dt) = contested_pair();
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        let merged_again = trim_nearby_peaks(&merged, &dt).unwrap();
        assert_eq!(merged, merged_again);
    }

    #[test]
    fn test_merge_invariant_holds() {
        // After merging, no surviving pair is mutually closer than each
        // is to the solid
        let mut dt = ArrayD::from_elem(IxDyn(&[20, 20]), 1.0);
        dt[[5, 5]] = 7.0;
        dt[[5, 8]] = 6.0;
        dt[[14, 14]] = 4.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[20, 20]), false);
        peaks[[5, 5]] = true;
        peaks[[5, 8]] = true;
        peaks[[14, 14]] = true;
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();

        let survivors: Vec<[f64; 2]> = merged
            .indexed_iter()
            .filter(|(_, &p)| p)
            .map(|(idx, _)| [idx[0] as f64, idx[1] as f64])
            .collect();
        for (a, pa) in survivors.iter().enumerate() {
            for pb in survivors.iter().skip(a + 1) {
                let sep = ((pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2)).sqrt();
                let da = dt[[pa[0] as usize, pa[1] as usize]];
                let db = dt[[pb[0] as usize, pb[1] as usize]];
                assert!(
                    sep >= da || sep >= db,
                    "survivors at {pa:?} and {pb:?} are still contested"
                );
            }
        }
    }

    #[test]
    fn test_chain_collapses_in_one_call() {
        // Three peaks in a row: dropping the middle one leaves the ends
        // mutually contested, so a single pass is not enough. The stage
        // must resolve the cascade itself and land on a fixpoint.
        let mut dt = ArrayD::from_elem(IxDyn(&[15, 18]), 1.0);
        dt[[7, 5]] = 10.0;
        dt[[7, 8]] = 9.0;
        dt[[7, 12]] = 3.5;
        let mut peaks = ArrayD::from_elem(IxDyn(&[15, 18]), false);
        peaks[[7, 5]] = true;
        peaks[[7, 8]] = true;
        peaks[[7, 12]] = true;

        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert_eq!(merged.iter().filter(|&&p| p).count(), 1);
        assert!(merged[[7, 5]], "the strongest peak survives the cascade");

        let merged_again = trim_nearby_peaks(&merged, &dt).unwrap();
        assert_eq!(merged, merged_again);
    }

    #[test]
    fn test_exact_tie_keeps_one_peak() {
        // Equal distances to solid: exactly one of the pair survives
        let mut dt = ArrayD::from_elem(IxDyn(&[15, 15]), 1.0);
        dt[[7, 6]] = 6.0;
        dt[[7, 9]] = 6.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[15, 15]), false);
        peaks[[7, 6]] = true;
        peaks[[7, 9]] = true;
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert_eq!(merged.iter().filter(|&&p| p).count(), 1);
    }

    #[test]
    fn test_symmetric_decision_rule() {
        // Swap which peak is stronger; the weaker one is dropped both ways
        let mut dt = ArrayD::from_elem(IxDyn(&[15, 15]), 1.0);
        dt[[7, 6]] = 5.0;
        dt[[7, 9]] = 6.0;
        let mut peaks = ArrayD::from_elem(IxDyn(&[15, 15]), false);
        peaks[[7, 6]] = true;
        peaks[[7, 9]] = true;
        let merged = trim_nearby_peaks(&peaks, &dt).unwrap();
        assert!(!merged[[7, 6]]);
        assert!(merged[[7, 9]]);
    }
}
