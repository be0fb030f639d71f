//! Structuring-element (footprint) definitions for N-dimensional filters
//!
//! A footprint defines the neighborhood shape used by the maximum filter
//! and other windowed operations. Offsets are expressed as `[isize; 3]`
//! relative to the center voxel; in 2-d the third component is always 0.

use ndarray::{ArrayD, Dimension};

use crate::error::{Error, Result};

/// Shape of a filter footprint
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    /// 2-d Euclidean disk of given radius
    Disk(usize),
    /// 3-d Euclidean ball of given radius
    Ball(usize),
    /// Full (2r+1)^N cube; radius 1 is the full-connectivity neighborhood
    Cube { radius: usize, ndim: usize },
    /// User-provided boolean mask (2-d or 3-d, odd side lengths)
    Custom(ArrayD<bool>),
}

impl Footprint {
    /// The round footprint matching the image dimensionality: a disk in
    /// 2-d, a ball in 3-d. Any other dimensionality is rejected.
    pub fn ball_like(ndim: usize, radius: usize) -> Result<Self> {
        match ndim {
            2 => Ok(Footprint::Disk(radius)),
            3 => Ok(Footprint::Ball(radius)),
            _ => Err(Error::UnsupportedDimension { ndim }),
        }
    }

    /// Validate the footprint, returning an error for invalid configurations
    pub fn validate(&self) -> Result<()> {
        match self {
            Footprint::Disk(r) | Footprint::Ball(r) | Footprint::Cube { radius: r, .. } => {
                if *r == 0 {
                    return Err(Error::InvalidParameter {
                        name: "radius",
                        value: "0".to_string(),
                        reason: "footprint radius must be at least 1".to_string(),
                    });
                }
                if let Footprint::Cube { ndim, .. } = self {
                    if !(2..=3).contains(ndim) {
                        return Err(Error::UnsupportedDimension { ndim: *ndim });
                    }
                }
                Ok(())
            }
            Footprint::Custom(mask) => {
                if !(2..=3).contains(&mask.ndim()) {
                    return Err(Error::UnsupportedDimension { ndim: mask.ndim() });
                }
                for &side in mask.shape() {
                    if side % 2 == 0 {
                        return Err(Error::InvalidParameter {
                            name: "custom_mask",
                            value: format!("{:?}", mask.shape()),
                            reason: "custom mask side lengths must be odd".to_string(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Dimensionality of the footprint
    pub fn ndim(&self) -> usize {
        match self {
            Footprint::Disk(_) => 2,
            Footprint::Ball(_) => 3,
            Footprint::Cube { ndim, .. } => *ndim,
            Footprint::Custom(mask) => mask.ndim(),
        }
    }

    /// Compute offsets relative to center for all active voxels.
    ///
    /// Offsets are padded to three components; the third is 0 for 2-d
    /// footprints. The center voxel is included.
    pub fn offsets(&self) -> Vec<[isize; 3]> {
        match self {
            Footprint::Disk(r) => round_offsets(2, *r),
            Footprint::Ball(r) => round_offsets(3, *r),
            Footprint::Cube { radius, ndim } => cube_offsets_radius(*ndim, *radius),
            Footprint::Custom(mask) => {
                let center: Vec<isize> = mask.shape().iter().map(|&s| (s / 2) as isize).collect();
                let mut offsets = Vec::new();
                for (idx, &active) in mask.indexed_iter() {
                    if !active {
                        continue;
                    }
                    let mut off = [0isize; 3];
                    for (d, &i) in idx.slice().iter().enumerate() {
                        off[d] = i as isize - center[d];
                    }
                    offsets.push(off);
                }
                offsets
            }
        }
    }
}

/// Offsets within Euclidean distance `r` of the center
fn round_offsets(ndim: usize, r: usize) -> Vec<[isize; 3]> {
    let r = r as isize;
    let mut offsets = Vec::new();
    for off in cube_offsets_radius(ndim, r as usize) {
        let dist_sq = off.iter().map(|&d| d * d).sum::<isize>();
        if (dist_sq as f64).sqrt() <= r as f64 {
            offsets.push(off);
        }
    }
    offsets
}

/// All offsets of the (2r+1)^ndim cube, center included
fn cube_offsets_radius(ndim: usize, r: usize) -> Vec<[isize; 3]> {
    let r = r as isize;
    let mut offsets = Vec::new();
    let depth_range = if ndim == 3 { -r..=r } else { 0..=0 };
    for dz in depth_range {
        for dr in -r..=r {
            for dc in -r..=r {
                // 2-d offsets occupy the first two components
                if ndim == 2 {
                    offsets.push([dr, dc, 0]);
                } else {
                    offsets.push([dz, dr, dc]);
                }
            }
        }
    }
    offsets
}
