// Weighted sampling over positive integer weights.
//
// `WeightedIndex` stores cumulative weights and draws with a single uniform
// integer plus a binary search, so a draw costs O(log n) whatever the weight
// magnitudes are. Category members and word templates both sample through
// it. Integer arithmetic only: no float rounding, and a weight of 5000 is as
// cheap as a weight of 1.
//
// The sampler holds no state between draws. Every call takes the caller's
// `WordRng`, so repeated identical draws are ordinary randomness, not a bug.

use wordsmith_prng::WordRng;

/// Cumulative-weight table for O(log n) weighted draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedIndex {
    cumulative: Vec<u64>,
}

impl WeightedIndex {
    /// Build a table from per-item weights.
    ///
    /// Returns `None` when there are no items or every weight is zero, since
    /// nothing could ever be drawn.
    pub fn new<I>(weights: I) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut total = 0u64;
        let cumulative: Vec<u64> = weights
            .into_iter()
            .map(|w| {
                total += u64::from(w);
                total
            })
            .collect();
        if total == 0 {
            return None;
        }
        Some(Self { cumulative })
    }

    /// Number of items in the table.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Draw an item index with probability `weight / total`.
    pub fn sample(&self, rng: &mut WordRng) -> usize {
        let r = rng.range_u64(0, self.total());
        // First bucket whose cumulative bound exceeds r. Zero-weight items
        // have an empty bucket and are never selected.
        self.cumulative.partition_point(|&bound| bound <= r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_weight_tables_are_rejected() {
        assert!(WeightedIndex::new(Vec::<u32>::new()).is_none());
        assert!(WeightedIndex::new(vec![0, 0]).is_none());
    }

    #[test]
    fn single_item_always_drawn() {
        let index = WeightedIndex::new(vec![7]).unwrap();
        let mut rng = WordRng::new(1);
        for _ in 0..100 {
            assert_eq!(index.sample(&mut rng), 0);
        }
    }

    #[test]
    fn zero_weight_item_never_drawn() {
        let index = WeightedIndex::new(vec![0, 3, 0, 1]).unwrap();
        let mut rng = WordRng::new(2);
        for _ in 0..10_000 {
            let i = index.sample(&mut rng);
            assert!(i == 1 || i == 3, "drew zero-weight index {i}");
        }
    }

    #[test]
    fn three_to_one_ratio_converges() {
        let index = WeightedIndex::new(vec![3, 1]).unwrap();
        let mut rng = WordRng::new(42);
        let n = 100_000;
        let a = (0..n).filter(|_| index.sample(&mut rng) == 0).count();
        let ratio = a as f64 / (n - a) as f64;
        assert!(
            (2.85..3.15).contains(&ratio),
            "expected a:e near 3:1, got {ratio:.3}"
        );
    }

    #[test]
    fn large_weights_keep_proportions() {
        let index = WeightedIndex::new(vec![9000, 1000]).unwrap();
        assert_eq!(index.total(), 10_000);
        let mut rng = WordRng::new(9);
        let n = 50_000;
        let first = (0..n).filter(|_| index.sample(&mut rng) == 0).count();
        let share = first as f64 / n as f64;
        assert!((0.88..0.92).contains(&share), "got {share:.3}");
    }

    #[test]
    fn repeated_draws_are_independent() {
        // Consecutive equal draws must happen; the sampler keeps no memory.
        let index = WeightedIndex::new(vec![1, 1]).unwrap();
        let mut rng = WordRng::new(5);
        let draws: Vec<usize> = (0..200).map(|_| index.sample(&mut rng)).collect();
        assert!(draws.windows(2).any(|w| w[0] == w[1]));
    }
}
