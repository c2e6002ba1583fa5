//! Probability of dice sums.
//!
//! The distribution of the sum of `count` dice is built by convolving the
//! single-die distribution with itself, one die at a time. Counts are kept
//! exact in `u128` while `sides^count` fits; beyond that the convolution runs
//! on `f64` probabilities. Either way results are rounded to two decimals.

use crate::dice::DiceSpec;

/// Distribution of the sum of a dice pool.
#[derive(Debug, Clone)]
pub struct SumDistribution {
    dice: DiceSpec,
    weights: Weights,
}

#[derive(Debug, Clone)]
enum Weights {
    /// A single die: every face equally likely.
    Uniform,
    /// Number of face combinations per sum, out of `total`.
    Exact { counts: Vec<u128>, total: u128 },
    /// Probability per sum.
    Approx(Vec<f64>),
}

impl SumDistribution {
    /// Compute the distribution for the given dice.
    pub fn new(dice: DiceSpec) -> Self {
        let weights = if dice.count() == 1 {
            Weights::Uniform
        } else {
            match u128::from(dice.sides()).checked_pow(dice.count()) {
                Some(total) => Weights::Exact {
                    counts: convolve_exact(dice),
                    total,
                },
                None => Weights::Approx(convolve_approx(dice)),
            }
        };
        Self { dice, weights }
    }

    /// The dice this distribution describes.
    pub fn dice(&self) -> DiceSpec {
        self.dice
    }

    /// Unrounded probability that the sum lands in `[start, end]`.
    ///
    /// Values outside the domain carry no mass; an empty range yields 0.
    pub fn mass(&self, start: u32, end: u32) -> f64 {
        match self.clamp(start, end) {
            None => 0.0,
            Some((lo, hi)) => match &self.weights {
                Weights::Uniform => (hi - lo + 1) as f64 / f64::from(self.dice.sides()),
                Weights::Exact { counts, total } => {
                    let hits: u128 = counts[lo..=hi].iter().sum();
                    hits as f64 / *total as f64
                }
                Weights::Approx(probs) => probs[lo..=hi].iter().sum(),
            },
        }
    }

    /// Probability that the sum lands in `[start, end]`, rounded to two
    /// decimals (halves round away from zero).
    pub fn probability(&self, start: u32, end: u32) -> f64 {
        let Some((lo, hi)) = self.clamp(start, end) else {
            return 0.0;
        };
        let exact = match &self.weights {
            Weights::Uniform => Some(((hi - lo + 1) as u128, u128::from(self.dice.sides()))),
            Weights::Exact { counts, total } => Some((counts[lo..=hi].iter().sum(), *total)),
            Weights::Approx(_) => None,
        };
        match exact.and_then(|(hits, total)| round_ratio(hits, total)) {
            Some(hundredths) => hundredths as f64 / 100.0,
            None => (self.mass(start, end) * 100.0).round() / 100.0,
        }
    }

    /// Translate a sum range into indices into the weight table, clipped to
    /// the domain. `None` when nothing remains.
    fn clamp(&self, start: u32, end: u32) -> Option<(usize, usize)> {
        let low = start.max(self.dice.min());
        let high = end.min(self.dice.max());
        if low > high {
            return None;
        }
        let base = self.dice.min();
        Some(((low - base) as usize, (high - base) as usize))
    }
}

/// `hits / total` in hundredths, rounded half up. `None` on overflow.
fn round_ratio(hits: u128, total: u128) -> Option<u128> {
    let numerator = hits.checked_mul(200)?.checked_add(total)?;
    let denominator = total.checked_mul(2)?;
    Some(numerator / denominator)
}

/// Number of ways to reach each sum, indexed from the minimum sum.
fn convolve_exact(dice: DiceSpec) -> Vec<u128> {
    let faces = dice.sides() as usize;
    let mut counts = vec![1u128; faces];
    for _ in 1..dice.count() {
        let prefix = prefix_sums(&counts, 0u128);
        counts = (0..counts.len() + faces - 1)
            .map(|j| window(&prefix, j, faces))
            .collect();
    }
    counts
}

/// Probability of each sum, indexed from the minimum sum.
fn convolve_approx(dice: DiceSpec) -> Vec<f64> {
    let faces = dice.sides() as usize;
    let p = 1.0 / f64::from(dice.sides());
    let mut probs = vec![p; faces];
    for _ in 1..dice.count() {
        let prefix = prefix_sums(&probs, 0.0);
        probs = (0..probs.len() + faces - 1)
            .map(|j| window(&prefix, j, faces) * p)
            .collect();
    }
    probs
}

fn prefix_sums<T>(values: &[T], zero: T) -> Vec<T>
where
    T: Copy + std::ops::Add<Output = T>,
{
    let mut prefix = Vec::with_capacity(values.len() + 1);
    let mut acc = zero;
    prefix.push(acc);
    for &v in values {
        acc = acc + v;
        prefix.push(acc);
    }
    prefix
}

/// Sum of the previous distribution over the `faces` indices ending at `j`.
fn window<T>(prefix: &[T], j: usize, faces: usize) -> T
where
    T: Copy + std::ops::Sub<Output = T>,
{
    let hi = (j + 1).min(prefix.len() - 1);
    let lo = (j + 1).saturating_sub(faces);
    prefix[hi] - prefix[lo]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(count: u32, sides: u32) -> SumDistribution {
        SumDistribution::new(DiceSpec::new(count, sides).unwrap())
    }

    #[test]
    fn two_d6_classics() {
        let d = dist(2, 6);
        assert_eq!(d.probability(7, 7), 0.17);
        assert_eq!(d.probability(2, 2), 0.03);
        assert_eq!(d.probability(12, 12), 0.03);
        assert_eq!(d.probability(6, 8), 0.44);
    }

    #[test]
    fn exact_counts_for_two_d6() {
        assert_eq!(
            convolve_exact(DiceSpec::new(2, 6).unwrap()),
            vec![1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1]
        );
    }

    #[test]
    fn exact_counts_for_three_d4() {
        let counts = convolve_exact(DiceSpec::new(3, 4).unwrap());
        assert_eq!(counts, vec![1, 3, 6, 10, 12, 12, 10, 6, 3, 1]);
        assert_eq!(counts.iter().sum::<u128>(), 64);
    }

    #[test]
    fn single_die_is_uniform() {
        let d = dist(1, 20);
        assert_eq!(d.probability(1, 1), 0.05);
        assert_eq!(d.probability(1, 10), 0.5);
        assert_eq!(d.probability(1, 20), 1.0);
    }

    #[test]
    fn full_domain_is_certain() {
        for (count, sides) in [(1, 6), (2, 6), (3, 8), (4, 10), (10, 6)] {
            let d = dist(count, sides);
            assert_eq!(d.probability(count, count * sides), 1.0);
        }
    }

    #[test]
    fn outside_domain_is_zero() {
        let d = dist(2, 6);
        assert_eq!(d.probability(13, 20), 0.0);
        assert_eq!(d.probability(0, 1), 0.0);
        assert_eq!(d.probability(8, 7), 0.0);
    }

    #[test]
    fn partially_outside_is_clipped() {
        let d = dist(2, 6);
        assert_eq!(d.probability(0, 2), 0.03);
        assert_eq!(d.probability(0, 100), 1.0);
    }

    #[test]
    fn one_sided_dice() {
        let d = dist(3, 1);
        assert_eq!(d.probability(3, 3), 1.0);
    }

    #[test]
    fn approx_path_matches_exact_path() {
        let dice = DiceSpec::new(4, 6).unwrap();
        let exact = SumDistribution::new(dice);
        let approx = SumDistribution {
            dice,
            weights: Weights::Approx(convolve_approx(dice)),
        };
        for n in 4..=24 {
            assert_eq!(exact.probability(n, n), approx.probability(n, n), "sum {n}");
        }
    }

    #[test]
    fn huge_pools_fall_back_to_floats() {
        let d = dist(40, 100);
        assert!(matches!(d.weights, Weights::Approx(_)));
        assert_eq!(d.probability(40, 4000), 1.0);
    }

    #[test]
    fn rounding_half_up() {
        assert_eq!(round_ratio(1, 8), Some(13));
        assert_eq!(round_ratio(1, 200), Some(1));
        assert_eq!(round_ratio(1, 201), Some(0));
    }
}
