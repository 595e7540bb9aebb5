//! Distribution normalization
//!
//! Converts absolute per-category totals (macro calories, workout counts) into
//! integer percentages that always sum to exactly 100. Each share is rounded
//! independently, then the signed rounding remainder is added to the category
//! holding the largest share. Which category wins a tie for "largest" is an
//! explicit [`TieBreak`] parameter.

use crate::types::round_half_up;
use serde::{Deserialize, Serialize};

/// Precedence used when several categories share the largest amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak<'a, K> {
    /// Earlier entries in the input win
    InputOrder,
    /// Earlier entries in this list win; unlisted categories rank last, in input order
    Precedence(&'a [K]),
}

impl<K: PartialEq> TieBreak<'_, K> {
    fn rank(&self, category: &K, input_index: usize) -> usize {
        match self {
            TieBreak::InputOrder => input_index,
            TieBreak::Precedence(order) => order
                .iter()
                .position(|k| k == category)
                .unwrap_or(order.len() + input_index),
        }
    }
}

/// One category's normalized share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Share<K> {
    pub category: K,
    /// Absolute amount (grams, kcal, count...) after clamping negatives to zero
    pub amount: f64,
    pub percent: i64,
}

/// Normalize category totals to integer percentages summing to 100.
///
/// Returns shares in input order, or an empty vector when the grand total is zero.
/// Negative and non-finite amounts count as zero.
pub fn normalize<K: Copy + PartialEq>(
    totals: &[(K, f64)],
    tie_break: TieBreak<'_, K>,
) -> Vec<Share<K>> {
    let amounts: Vec<f64> = totals
        .iter()
        .map(|(_, amount)| if amount.is_finite() { amount.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = amounts.iter().sum();

    if total <= 0.0 {
        return Vec::new();
    }

    let mut shares: Vec<Share<K>> = totals
        .iter()
        .zip(&amounts)
        .map(|((category, _), &amount)| Share {
            category: *category,
            amount,
            percent: round_half_up(amount / total * 100.0) as i64,
        })
        .collect();

    let remainder = 100 - shares.iter().map(|s| s.percent).sum::<i64>();
    if remainder != 0 {
        if let Some(largest) = largest_share(&shares, tie_break) {
            shares[largest].percent += remainder;
        }
    }

    shares
}

fn largest_share<K: PartialEq>(shares: &[Share<K>], tie_break: TieBreak<'_, K>) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, share) in shares.iter().enumerate() {
        best = match best {
            None => Some(i),
            Some(b) => {
                let current = &shares[b];
                let wins = share.amount > current.amount
                    || (share.amount == current.amount
                        && tie_break.rank(&share.category, i)
                            < tie_break.rank(&current.category, b));
                if wins {
                    Some(i)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Macro;
    use pretty_assertions::assert_eq;

    fn percents<K>(shares: &[Share<K>]) -> Vec<i64> {
        shares.iter().map(|s| s.percent).collect()
    }

    #[test]
    fn test_sums_to_100_for_many_inputs() {
        let cases: Vec<Vec<f64>> = vec![
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            vec![2.0, 2.0, 2.0, 2.0, 2.0, 2.0],
            vec![0.5, 0.5],
            vec![333.0, 333.0, 334.0],
            vec![7.0, 0.0, 13.0, 29.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![0.001, 1000.0],
        ];

        for amounts in cases {
            let totals: Vec<(usize, f64)> = amounts.iter().copied().enumerate().collect();
            let shares = normalize(&totals, TieBreak::InputOrder);
            assert_eq!(shares.iter().map(|s| s.percent).sum::<i64>(), 100, "{amounts:?}");
            assert!(shares.iter().all(|s| s.percent >= 0), "{amounts:?}");
        }
    }

    #[test]
    fn test_zero_total_is_empty() {
        let totals = [(Macro::Protein, 0.0), (Macro::Carbs, 0.0), (Macro::Fat, 0.0)];
        assert!(normalize(&totals, TieBreak::InputOrder).is_empty());
        assert!(normalize::<Macro>(&[], TieBreak::InputOrder).is_empty());
    }

    #[test]
    fn test_remainder_goes_to_precedence_on_tie() {
        let totals = [(Macro::Protein, 100.0), (Macro::Carbs, 100.0), (Macro::Fat, 100.0)];
        let precedence = [Macro::Carbs, Macro::Protein, Macro::Fat];

        let shares = normalize(&totals, TieBreak::Precedence(&precedence));
        assert_eq!(percents(&shares), vec![33, 34, 33]);

        let shares = normalize(&totals, TieBreak::InputOrder);
        assert_eq!(percents(&shares), vec![34, 33, 33]);
    }

    #[test]
    fn test_remainder_goes_to_largest() {
        // 16.67 / 16.67 / 66.67 rounds to 17 + 17 + 67 = 101
        let totals = [("a", 1.0), ("b", 1.0), ("c", 4.0)];
        let shares = normalize(&totals, TieBreak::InputOrder);
        assert_eq!(percents(&shares), vec![17, 17, 66]);
    }

    #[test]
    fn test_negative_amounts_are_clamped() {
        let totals = [("a", -5.0), ("b", 10.0), ("c", f64::NAN)];
        let shares = normalize(&totals, TieBreak::InputOrder);
        assert_eq!(percents(&shares), vec![0, 100, 0]);
        assert_eq!(shares[0].amount, 0.0);
    }

    #[test]
    fn test_unlisted_categories_rank_last() {
        let totals = [("x", 1.0), ("y", 1.0), ("z", 1.0)];
        let shares = normalize(&totals, TieBreak::Precedence(&["z"]));
        assert_eq!(percents(&shares), vec![33, 33, 34]);
    }
}
