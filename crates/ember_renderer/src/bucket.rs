//! Bucket (tile) partitioning of the image.
//!
//! Buckets are independent rectangles rendered in parallel; together they
//! cover the image exactly once.

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: usize = 24;

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Top-left corner.
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Position in the generation order; doubles as the RNG seed for the
    /// bucket so renders are reproducible.
    pub index: usize,
}

impl Bucket {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Partition a `width x height` image into buckets of `bucket_size` edge.
/// The last row and column are clipped to the image.
pub fn generate_buckets(width: usize, height: usize, bucket_size: usize) -> Vec<Bucket> {
    assert!(bucket_size > 0, "bucket_size must be positive");

    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            buckets.push(Bucket {
                x,
                y,
                width: bucket_size.min(width - x),
                height: bucket_size.min(height - y),
                index,
            });
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fit() {
        let buckets = generate_buckets(48, 48, 24);
        assert_eq!(buckets.len(), 4);
        assert!(buckets.iter().all(|b| b.width == 24 && b.height == 24));
    }

    #[test]
    fn test_clipped_edges() {
        // 100 = 4 * 24 + 4: five buckets per axis, the last 4px wide
        let buckets = generate_buckets(100, 100, 24);
        assert_eq!(buckets.len(), 25);

        let total: usize = buckets.iter().map(Bucket::pixel_count).sum();
        assert_eq!(total, 100 * 100);

        let last = buckets.last().unwrap();
        assert_eq!((last.x, last.y), (96, 96));
        assert_eq!((last.width, last.height), (4, 4));
    }

    #[test]
    fn test_buckets_cover_image_exactly_once() {
        let (w, h) = (50, 37);
        let buckets = generate_buckets(w, h, 16);

        let mut covered = vec![0u8; w * h];
        for b in &buckets {
            for y in b.y..b.y + b.height {
                for x in b.x..b.x + b.width {
                    covered[y * w + x] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_indices_are_sequential() {
        let buckets = generate_buckets(100, 60, 24);
        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.index, i);
        }
    }
}
