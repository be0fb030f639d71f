//! The peak-refinement pipeline
//!
//! Three refinement stages plus an orchestrator:
//! - **peaks**: candidate detection via a round maximum filter
//! - **saddle**: per-blob growth test removing ridge/saddle artifacts
//! - **merge**: centroid proximity merging with a distance-to-solid
//!   tie-break
//! - **snow**: the full sequence, ending in a unique-integer marker image

mod merge;
mod peaks;
mod saddle;
mod snow;

pub use merge::{trim_nearby_peaks, TrimNearbyPeaks, TrimNearbyPeaksParams};
pub use peaks::{find_peaks, reduce_peaks_to_points, FindPeaks, FindPeaksParams};
pub use saddle::{trim_saddle_points, TrimSaddleParams, TrimSaddlePoints};
pub use snow::{snow, Snow, SnowExtraction, SnowInput, SnowParams};
