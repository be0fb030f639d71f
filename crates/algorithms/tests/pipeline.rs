//! End-to-end pipeline tests on synthetic geometry.
//!
//! Fixtures are generated disks/balls rather than image files, so every
//! test runs everywhere. Assertions check the multiset of surviving peak
//! locations, never a particular label-to-location mapping.

use ndarray::{ArrayD, Dimension, IxDyn};
use poremark_algorithms::filters::{snow, trim_nearby_peaks, SnowInput, SnowParams};
use poremark_algorithms::ndimage::distance_transform_edt;

/// 2-d mask of filled circles.
fn disks(shape: [usize; 2], circles: &[(f64, f64, f64)]) -> ArrayD<bool> {
    let mut mask = ArrayD::from_elem(IxDyn(&shape), false);
    for (idx, v) in mask.indexed_iter_mut() {
        let (r, c) = (idx[0] as f64, idx[1] as f64);
        for &(cr, cc, radius) in circles {
            if (r - cr).powi(2) + (c - cc).powi(2) <= radius * radius {
                *v = true;
            }
        }
    }
    mask
}

/// 3-d mask of a single filled ball.
fn ball(shape: [usize; 3], center: [f64; 3], radius: f64) -> ArrayD<bool> {
    let mut mask = ArrayD::from_elem(IxDyn(&shape), false);
    for (idx, v) in mask.indexed_iter_mut() {
        let d: f64 = (0..3)
            .map(|i| (idx[i] as f64 - center[i]).powi(2))
            .sum();
        *v = d <= radius * radius;
    }
    mask
}

/// Positions of all marked voxels.
fn marker_positions(markers: &ArrayD<u32>) -> Vec<Vec<usize>> {
    markers
        .indexed_iter()
        .filter(|(_, &m)| m != 0)
        .map(|(idx, _)| idx.slice().to_vec())
        .collect()
}

#[test]
fn single_disk_pore_yields_one_centered_peak() {
    let mask = disks([25, 25], &[(12.0, 12.0, 8.0)]);
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();

    assert_eq!(out.final_peaks, 1);
    let positions = marker_positions(&out.markers);
    assert!(positions
        .iter()
        .all(|p| p[0].abs_diff(12) <= 1 && p[1].abs_diff(12) <= 1));
}

#[test]
fn single_ball_pore_yields_one_centered_peak_3d() {
    let mask = ball([17, 17, 17], [8.0, 8.0, 8.0], 6.0);
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();

    assert_eq!(out.final_peaks, 1);
    let positions = marker_positions(&out.markers);
    assert!(positions
        .iter()
        .all(|p| p.iter().all(|&c| c.abs_diff(8) <= 1)));
}

#[test]
fn two_well_separated_overlapping_disks_keep_two_peaks() {
    // Centers 12 apart, radius 8: the pores overlap, but the separation
    // exceeds either distance to solid, so both peaks survive
    let mask = disks([25, 37], &[(12.0, 12.0, 8.0), (12.0, 24.0, 8.0)]);
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();

    assert_eq!(out.final_peaks, 2);
    let positions = marker_positions(&out.markers);
    for (cr, cc) in [(12usize, 12usize), (12, 24)] {
        assert!(
            positions
                .iter()
                .any(|p| p[0].abs_diff(cr) <= 1 && p[1].abs_diff(cc) <= 1),
            "expected a peak near ({cr}, {cc})"
        );
    }
}

#[test]
fn two_nearby_disks_collapse_to_one_peak() {
    // Centers 5 apart, radius 8: separation is smaller than either
    // distance to solid, so the proximity merger keeps exactly one
    let mask = disks([25, 30], &[(12.0, 12.0, 8.0), (12.0, 17.0, 8.0)]);
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();

    assert_eq!(out.final_peaks, 1);
}

#[test]
fn dumbbell_neck_ridge_is_removed() {
    // Two lobes joined by a long 3-voxel neck: the neck's flat
    // distance-transform ridge produces spurious candidates that the
    // saddle trimmer must eliminate. Smoothing is disabled because the
    // default sigma flattens this ridge before detection ever sees it;
    // the raw field is what exercises the trimmer through the pipeline.
    let mut mask = disks([21, 57], &[(10.0, 8.0, 7.0), (10.0, 48.0, 7.0)]);
    for r in 9..=11 {
        for c in 8..=48 {
            mask[[r, c]] = true;
        }
    }
    let params = SnowParams {
        sigma: 0.0,
        ..SnowParams::default()
    };
    let out = snow(&SnowInput::Mask(mask), &params).unwrap();

    assert!(
        out.initial_peaks > 2,
        "the neck must contribute spurious candidates (got {})",
        out.initial_peaks
    );
    assert_eq!(out.final_peaks, 2);
    let positions = marker_positions(&out.markers);
    for (cr, cc) in [(10usize, 8usize), (10, 48)] {
        assert!(
            positions
                .iter()
                .any(|p| p[0].abs_diff(cr) <= 1 && p[1].abs_diff(cc) <= 1),
            "expected a peak near ({cr}, {cc})"
        );
    }
}

#[test]
fn peak_counts_are_monotone_across_stages() {
    let mut mask = disks([21, 57], &[(10.0, 8.0, 7.0), (10.0, 48.0, 7.0)]);
    for r in 9..=11 {
        for c in 8..=48 {
            mask[[r, c]] = true;
        }
    }
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();
    assert!(out.after_saddle_trim <= out.initial_peaks);
    assert!(out.final_peaks <= out.after_saddle_trim);
}

#[test]
fn surviving_peaks_lie_on_pore_space() {
    let mask = disks([25, 37], &[(12.0, 12.0, 8.0), (12.0, 24.0, 8.0)]);
    let dt = distance_transform_edt(&mask).unwrap();

    // sigma 0 so the field sampled here is exactly the pipeline's field
    let params = SnowParams {
        sigma: 0.0,
        ..SnowParams::default()
    };
    let out = snow(&SnowInput::Mask(mask), &params).unwrap();

    for p in marker_positions(&out.markers) {
        assert!(dt[&p[..]] > 0.0, "marker at {p:?} sits on solid");
    }
}

#[test]
fn proximity_merge_is_idempotent_on_pipeline_output() {
    let mask = disks([25, 30], &[(12.0, 12.0, 8.0), (12.0, 17.0, 8.0)]);
    let dt = distance_transform_edt(&mask).unwrap();
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();

    let surviving = out.markers.mapv(|m| m != 0);
    let remerged = trim_nearby_peaks(&surviving, &dt).unwrap();
    assert_eq!(remerged, surviving);
}

#[test]
fn empty_domain_produces_all_zero_markers() {
    let mask = ArrayD::from_elem(IxDyn(&[16, 16]), false);
    let out = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();
    assert_eq!(out.initial_peaks, 0);
    assert_eq!(out.final_peaks, 0);
    assert!(out.markers.iter().all(|&m| m == 0));
}

#[test]
fn precomputed_distance_field_matches_mask_input() {
    let mask = disks([25, 25], &[(12.0, 12.0, 8.0)]);
    let dt = distance_transform_edt(&mask).unwrap();

    let from_mask = snow(&SnowInput::Mask(mask), &SnowParams::default()).unwrap();
    let from_field = snow(&SnowInput::Distance(dt), &SnowParams::default()).unwrap();

    assert_eq!(from_mask.final_peaks, from_field.final_peaks);
    assert_eq!(
        marker_positions(&from_mask.markers),
        marker_positions(&from_field.markers)
    );
}
