//! k-d tree for voxel-centroid points
//!
//! O(log n) nearest-neighbor and k-nearest-neighbor queries over peak
//! centroids in array-index space. Points carry three coordinates; 2-d
//! points leave the third at 0, so the Euclidean metric is unaffected.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

/// A k-d tree over 2-d or 3-d points.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Points in insertion order; node indices refer into this
    points: Vec<[f64; 3]>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension, cycling with tree depth
    split_dim: usize,
    /// Left child node index (None = leaf)
    left: Option<usize>,
    /// Right child node index (None = leaf)
    right: Option<usize>,
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy)]
pub struct NearestResult {
    pub point: [f64; 3],
    pub distance_sq: f64,
    pub index: usize,
}

impl KdTree {
    /// Build a k-d tree from points.
    ///
    /// Construction is O(n log n) using median-of-coordinate splitting;
    /// the split dimension cycles over the first `ndim` coordinates.
    pub fn build(points: &[[f64; 3]], ndim: usize) -> Self {
        let stored_points: Vec<[f64; 3]> = points.to_vec();
        let mut nodes = Vec::with_capacity(points.len());

        if !points.is_empty() {
            let mut indices: Vec<usize> = (0..points.len()).collect();
            build_recursive(&stored_points, &mut indices, 0, ndim, &mut nodes);
        }

        Self {
            nodes,
            points: stored_points,
        }
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Find the single nearest point to `q`.
    ///
    /// Returns `None` if the tree is empty.
    pub fn nearest(&self, q: [f64; 3]) -> Option<NearestResult> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best_dist_sq = f64::MAX;
        let mut best_idx = 0;

        self.nearest_recursive(0, q, &mut best_dist_sq, &mut best_idx);

        Some(NearestResult {
            point: self.points[best_idx],
            distance_sq: best_dist_sq,
            index: best_idx,
        })
    }

    /// Find the k nearest points to `q`, sorted by ascending distance.
    ///
    /// With `q` itself in the tree, `k_nearest(q, 2)` yields the point and
    /// its nearest other point.
    pub fn k_nearest(&self, q: [f64; 3], k: usize) -> Vec<NearestResult> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        // Max-heap of size k kept as a descending sorted vec
        let mut heap: Vec<(f64, usize)> = Vec::with_capacity(k + 1);

        self.knn_recursive(0, q, k, &mut heap);

        heap.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        heap.iter()
            .map(|&(dist_sq, idx)| NearestResult {
                point: self.points[idx],
                distance_sq: dist_sq,
                index: idx,
            })
            .collect()
    }

    fn nearest_recursive(
        &self,
        node_idx: usize,
        q: [f64; 3],
        best_dist_sq: &mut f64,
        best_idx: &mut usize,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];

        let dist_sq = distance_sq(&q, p);
        if dist_sq < *best_dist_sq {
            *best_dist_sq = dist_sq;
            *best_idx = node.point_idx;
        }

        // Signed distance to the splitting plane decides which side first
        let diff = q[node.split_dim] - p[node.split_dim];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, q, best_dist_sq, best_idx);
        }

        if diff * diff < *best_dist_sq {
            if let Some(child) = second {
                self.nearest_recursive(child, q, best_dist_sq, best_idx);
            }
        }
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        q: [f64; 3],
        k: usize,
        heap: &mut Vec<(f64, usize)>,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];
        let dist_sq = distance_sq(&q, p);

        let max_dist_sq = if heap.len() >= k { heap[0].0 } else { f64::MAX };

        if dist_sq < max_dist_sq || heap.len() < k {
            if heap.len() >= k {
                // Evict the farthest point
                heap.remove(0);
            }
            let pos = heap
                .binary_search_by(|probe| {
                    probe
                        .0
                        .partial_cmp(&dist_sq)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .reverse()
                })
                .unwrap_or_else(|e| e);
            heap.insert(pos, (dist_sq, node.point_idx));
        }

        let diff = q[node.split_dim] - p[node.split_dim];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, q, k, heap);
        }

        let threshold = if heap.len() >= k { heap[0].0 } else { f64::MAX };
        if diff * diff < threshold {
            if let Some(child) = second {
                self.knn_recursive(child, q, k, heap);
            }
        }
    }
}

#[inline]
fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

fn build_recursive(
    points: &[[f64; 3]],
    indices: &mut [usize],
    depth: usize,
    ndim: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }

    let split_dim = depth % ndim;
    indices.sort_unstable_by(|&a, &b| {
        points[a][split_dim]
            .partial_cmp(&points[b][split_dim])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = indices.len() / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[mid],
        split_dim,
        left: None,
        right: None,
    });

    let (left_part, rest) = indices.split_at_mut(mid);
    let right_part = &mut rest[1..];

    let left = build_recursive(points, left_part, depth + 1, ndim, nodes);
    let right = build_recursive(points, right_part, depth + 1, ndim, nodes);

    nodes[node_idx].left = left;
    nodes[node_idx].right = right;
    Some(node_idx)
}
