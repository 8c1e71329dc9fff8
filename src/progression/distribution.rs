//! Even XP split with a randomly placed remainder

use rand::seq::SliceRandom;
use rand::Rng;

/// Split `total` across `recipients` shares
///
/// Every share gets `total / recipients`; the remainder goes one point each
/// to the first `total % recipients` indices of a shuffled index list.
/// Zero recipients yields an empty split.
pub fn distribute_evenly<R: Rng + ?Sized>(total: u32, recipients: usize, rng: &mut R) -> Vec<u32> {
    if recipients == 0 {
        return Vec::new();
    }

    let count = recipients as u64;
    let base = (total as u64 / count) as u32;
    let remainder = (total as u64 % count) as usize;

    let mut shares = vec![base; recipients];
    if remainder > 0 {
        let mut indices: Vec<usize> = (0..recipients).collect();
        indices.shuffle(rng);
        for &index in indices.iter().take(remainder) {
            shares[index] += 1;
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hundred_over_three() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut shares = distribute_evenly(100, 3, &mut rng);
        assert_eq!(shares.iter().sum::<u32>(), 100);
        shares.sort_unstable();
        assert_eq!(shares, vec![33, 33, 34]);
    }

    #[test]
    fn test_exact_split_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(distribute_evenly(30, 3, &mut rng), vec![10, 10, 10]);
    }

    #[test]
    fn test_no_recipients() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(distribute_evenly(50, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_fewer_points_than_recipients() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let shares = distribute_evenly(2, 5, &mut rng);
        assert_eq!(shares.iter().filter(|s| **s == 1).count(), 2);
        assert_eq!(shares.iter().filter(|s| **s == 0).count(), 3);
    }

    #[test]
    fn test_remainder_placement_varies() {
        // Across seeds the lucky recipient should not always be the same index
        let mut winners = std::collections::BTreeSet::new();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let shares = distribute_evenly(4, 3, &mut rng);
            let index = shares.iter().position(|s| *s == 2).unwrap();
            winners.insert(index);
        }
        assert!(winners.len() > 1);
    }
}
