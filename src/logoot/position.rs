use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::id::{Id, BASE, MAX, MIN};
use crate::ReplicaId;

/// Skew applied to the random choice of a new digit.
///
/// Each allocation raises a uniform sample to either `BIAS` or `1 / BIAS`,
/// pushing the digit towards one end of the free interval so that runs of
/// typing leave room on the other side.
pub const BIAS: f64 = 15.0;

/// Digit range at `depth`: `BASE` doubled once per level, capped at [`MAX`].
#[must_use]
pub fn doubled_base(depth: usize) -> u64 {
    let doublings = u32::try_from(depth).unwrap_or(u32::MAX);
    BASE.saturating_mul(2u64.saturating_pow(doublings)).min(MAX)
}

/// Allocates positions for one replica.
#[derive(Debug, Clone)]
pub struct PositionGenerator {
    replica_id: ReplicaId,
    clock: u64,
    bias: f64,
    rng: StdRng,
}

impl PositionGenerator {
    /// A generator seeded from the operating system.
    pub fn new(replica_id: ReplicaId) -> Self {
        Self::from_rng(replica_id, StdRng::from_entropy())
    }

    /// A generator whose allocations are reproducible.
    pub fn with_seed(replica_id: ReplicaId, seed: u64) -> Self {
        Self::from_rng(replica_id, StdRng::seed_from_u64(seed))
    }

    fn from_rng(replica_id: ReplicaId, rng: StdRng) -> Self {
        Self {
            replica_id,
            clock: 0,
            bias: BIAS,
            rng,
        }
    }

    /// Number of digits allocated so far.
    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// A fresh position strictly between `previous` and `next`.
    ///
    /// Requires `previous < next`. An empty slice stands for the start of
    /// the sequence on the left and for the end of it on the right.
    pub fn generate(&mut self, previous: &[Id], next: &[Id]) -> Vec<Id> {
        let mut position = Vec::with_capacity(previous.len().max(next.len()) + 1);
        let mut same_prefix = true;
        let mut depth = 0;
        loop {
            let mut lower = previous
                .get(depth)
                .copied()
                .unwrap_or(Id::anonymous(MIN));
            let bound = if same_prefix {
                next.get(depth).copied()
            } else {
                None
            };
            let upper = bound.unwrap_or_else(|| Id::anonymous(doubled_base(depth)));

            if upper.num().saturating_sub(lower.num()) > 1 {
                position.push(self.allocate(lower.num(), upper.num()));
                return position;
            }

            if depth > 0 && lower.is_anonymous() {
                let claimed = lower.claimed_by(self.replica_id);
                // Claiming must not overtake a bounding segment with the same digit.
                if bound.is_none() || claimed < upper {
                    lower = claimed;
                }
            }
            position.push(lower);
            if lower != upper {
                same_prefix = false;
            }
            depth += 1;
        }
    }

    fn allocate(&mut self, lower: u64, upper: u64) -> Id {
        let sample: f64 = self.rng.gen();
        let bias = if self.rng.gen_bool(0.5) {
            self.bias
        } else {
            self.bias.recip()
        };
        let span = upper - lower - 1;
        let offset = (sample.powf(bias) * span as f64) as u64;
        let num = (lower + 1 + offset).min(upper - 1);

        let clock = self.clock;
        self.clock += 1;
        Id::new(num, self.replica_id, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinels() -> (Vec<Id>, Vec<Id>) {
        (vec![Id::anonymous(MIN)], vec![Id::anonymous(BASE)])
    }

    #[test]
    fn doubles_per_level() {
        assert_eq!(doubled_base(0), 256);
        assert_eq!(doubled_base(1), 512);
        assert_eq!(doubled_base(10), 256 << 10);
    }

    #[test]
    fn caps_at_max() {
        assert_eq!(doubled_base(45), MAX);
        assert_eq!(doubled_base(200), MAX);
    }

    #[test]
    fn between_sentinels() {
        let mut generator = PositionGenerator::with_seed(1, 7);
        let (begin, end) = sentinels();
        let position = generator.generate(&begin, &end);
        assert_eq!(position.len(), 1);
        assert!(begin < position && position < end);
        assert_eq!(position[0].replica_id(), Some(1));
        assert_eq!(generator.clock(), 1);
    }

    #[test]
    fn adjacent_digits_go_deeper() {
        let mut generator = PositionGenerator::with_seed(0, 1);
        let previous = vec![Id::new(4, 0, 0)];
        let next = vec![Id::new(5, 0, 1)];
        let position = generator.generate(&previous, &next);
        assert_eq!(position.len(), 2);
        assert_eq!(position[0], previous[0]);
        assert!(previous < position && position < next);
    }

    #[test]
    fn claimed_prefix_stays_below_bound() {
        let mut generator = PositionGenerator::with_seed(3, 2);
        let previous = vec![Id::new(4, 0, 0)];
        let next = vec![Id::new(4, 0, 0), Id::new(0, 1, 0), Id::new(0, 2, 0)];
        let position = generator.generate(&previous, &next);
        assert!(previous < position, "{position:?}");
        assert!(position < next, "{position:?}");
    }

    #[test]
    fn repeated_appends_stay_ordered() {
        let mut generator = PositionGenerator::with_seed(0, 42);
        let (mut previous, end) = sentinels();
        for _ in 0..500 {
            let position = generator.generate(&previous, &end);
            assert!(previous < position && position < end);
            previous = position;
        }
    }

    #[test]
    fn repeated_prepends_stay_ordered() {
        let mut generator = PositionGenerator::with_seed(0, 42);
        let (begin, mut next) = sentinels();
        for _ in 0..500 {
            let position = generator.generate(&begin, &next);
            assert!(begin < position && position < next);
            next = position;
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let (begin, end) = sentinels();
        let mut a = PositionGenerator::with_seed(0, 9);
        let mut b = PositionGenerator::with_seed(0, 9);
        assert_eq!(a.generate(&begin, &end), b.generate(&begin, &end));
    }
}
