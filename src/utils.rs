//! Utility functions for the rating engine

/// `x * x`
pub fn square(x: f64) -> f64 {
    x * x
}

/// Order `items` by ascending rank (1 = first place), keeping the input order
/// among equal ranks. Returns the reordered items with their ranks.
pub fn sort_by_rank<T>(items: Vec<T>, ranks: &[u32]) -> (Vec<T>, Vec<u32>) {
    let mut ranked: Vec<(u32, T)> = ranks.iter().copied().zip(items).collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(rank, item)| (item, rank)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square() {
        assert_eq!(square(3.0), 9.0);
        assert_eq!(square(-0.5), 0.25);
    }

    #[test]
    fn test_sort_by_rank() {
        let (items, ranks) = sort_by_rank(vec!["c", "a", "b"], &[3, 1, 2]);
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_rank_is_stable_for_ties() {
        let (items, ranks) = sort_by_rank(vec!["x", "y", "z", "w"], &[2, 1, 2, 1]);
        assert_eq!(items, vec!["y", "w", "x", "z"]);
        assert_eq!(ranks, vec![1, 1, 2, 2]);
    }
}
