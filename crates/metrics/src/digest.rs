//! Centroid compaction
//!
//! Values recorded in a window are folded into a bounded number of
//! `(value, count)` centroids. Adjacent values (after sorting) are merged
//! into weighted means until each centroid carries roughly the same share of
//! the total count.

use crate::windowed::Centroid;

/// Fold `centroids` into at most `compression` centroids, sorted by value
///
/// Every centroid pushed before the last carries at least `target` counts,
/// which bounds the output at `ceil(total / target) <= compression`.
pub(crate) fn compress(mut centroids: Vec<Centroid>, compression: usize) -> Vec<Centroid> {
    centroids.sort_by(|a, b| a.value.total_cmp(&b.value));

    let compression = compression.max(1);
    let total: u64 = centroids.iter().map(|c| c.count).sum();
    let target = total.div_ceil(compression as u64).max(1);

    let mut merged = Vec::with_capacity(compression.min(centroids.len()));
    let mut current: Option<Centroid> = None;

    for centroid in centroids {
        let next = match current.take() {
            Some(acc) if acc.value == centroid.value || acc.count < target => acc.merge(centroid),
            Some(acc) => {
                merged.push(acc);
                centroid
            }
            None => centroid,
        };
        current = Some(next);
    }

    if let Some(acc) = current {
        merged.push(acc);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: impl IntoIterator<Item = f64>) -> Vec<Centroid> {
        values.into_iter().map(|v| Centroid::new(v, 1)).collect()
    }

    #[test]
    fn test_small_input_sorted_and_kept() {
        let out = compress(points([3.0, 1.0, 2.0]), 10);
        let values: Vec<f64> = out.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_equal_values_collapse() {
        let out = compress(points([7.0, 7.0, 7.0]), 10);
        assert_eq!(out, vec![Centroid::new(7.0, 3)]);
    }

    #[test]
    fn test_bounded_by_compression() {
        let out = compress(points((0..1000).map(f64::from)), 32);
        assert!(out.len() <= 32);
        assert_eq!(out.iter().map(|c| c.count).sum::<u64>(), 1000);
        assert!(out.windows(2).all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn test_weighted_mean() {
        let out = compress(vec![Centroid::new(0.0, 1), Centroid::new(10.0, 3)], 1);
        assert_eq!(out, vec![Centroid::new(7.5, 4)]);
    }

    #[test]
    fn test_empty() {
        assert!(compress(Vec::new(), 8).is_empty());
    }
}
