//! Spatial indexing for peak centroids

mod kdtree;

pub use kdtree::{KdTree, NearestResult};
