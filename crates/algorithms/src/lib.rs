//! # Poremark Algorithms
//!
//! Peak extraction from the distance transform of pore-space images.
//!
//! The main entry point is [`filters::snow`], which turns a boolean
//! domain mask (or a pre-computed distance transform) into an
//! integer-labeled marker image for marker-based watershed segmentation.
//! The underlying stages and primitives are public for callers that
//! need finer control:
//!
//! - **filters**: candidate detection, saddle trimming, proximity
//!   merging, and the orchestrating pipeline
//! - **ndimage**: distance transform, Gaussian smoothing, maximum
//!   filter, binary dilation, connected-component labeling
//! - **spatial**: k-d tree over peak centroids

pub mod filters;
pub mod ndimage;
pub mod spatial;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::filters::{
        find_peaks, snow, trim_nearby_peaks, trim_saddle_points, FindPeaks, FindPeaksParams,
        Snow, SnowExtraction, SnowInput, SnowParams, TrimNearbyPeaks, TrimSaddleParams,
        TrimSaddlePoints,
    };
    pub use crate::ndimage::{distance_transform_edt, gaussian_filter};
    pub use poremark_core::prelude::*;
}
