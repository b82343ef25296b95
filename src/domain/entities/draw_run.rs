//! Draw run entity.
//!
//! A finite pool of numbered items consumed without replacement. The pool is
//! shuffled once at the start of a run and then drained from its tail.

use chrono::{DateTime, FixedOffset, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of items in a full pool (items are `1..=POOL_SIZE`).
pub const POOL_SIZE: u8 = 75;

/// Largest accepted time between draws (one day).
pub const MAX_TICK_SECONDS: u64 = 24 * 60 * 60;

/// Pool and draw history of one run.
///
/// `pool` and `drawn` always partition `1..=POOL_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRun {
    pool: Vec<u8>,
    drawn: Vec<u8>,
}

impl Default for DrawRun {
    fn default() -> Self {
        Self {
            pool: (1..=POOL_SIZE).collect(),
            drawn: Vec::new(),
        }
    }
}

impl DrawRun {
    /// A full pool in uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut run = Self::default();
        run.pool.shuffle(rng);
        run
    }

    /// Take the next item, `None` once the pool is exhausted.
    pub fn draw(&mut self) -> Option<u8> {
        let item = self.pool.pop()?;
        self.drawn.push(item);
        Some(item)
    }

    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty()
    }

    /// Items still in the pool, in draw order reversed.
    pub fn pool(&self) -> &[u8] {
        &self.pool
    }

    /// Items dispensed so far, in draw order.
    pub fn drawn(&self) -> &[u8] {
        &self.drawn
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }
}

/// Comma-joined representation of a draw sequence.
pub fn join_sequence(items: &[u8]) -> String {
    items
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Label of a run started at `start`: `{prefix}_YYYY-MM-DD_HH:MM`.
pub fn run_label(prefix: &str, start: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "{}_{}",
        prefix,
        start.with_timezone(&offset).format("%Y-%m-%d_%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn full_domain() -> BTreeSet<u8> {
        (1..=POOL_SIZE).collect()
    }

    #[test]
    fn test_shuffled_pool_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let run = DrawRun::shuffled(&mut rng);

        let items: BTreeSet<u8> = run.pool().iter().copied().collect();
        assert_eq!(items, full_domain());
        assert_eq!(run.pool().len(), POOL_SIZE as usize);
        assert!(run.drawn().is_empty());
    }

    #[test]
    fn test_pool_and_drawn_partition_domain_at_every_step() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut run = DrawRun::shuffled(&mut rng);

        for step in 1..=POOL_SIZE as usize {
            let expected = *run.pool().last().unwrap();
            assert_eq!(run.draw(), Some(expected));

            let pool: BTreeSet<u8> = run.pool().iter().copied().collect();
            let drawn: BTreeSet<u8> = run.drawn().iter().copied().collect();
            assert_eq!(drawn.len(), step, "drawn must not repeat");
            assert!(pool.is_disjoint(&drawn));
            assert_eq!(&pool | &drawn, full_domain());
        }

        assert!(run.is_exhausted());
        assert_eq!(run.draw(), None);
        assert_eq!(run.drawn().len(), POOL_SIZE as usize);
    }

    #[test]
    fn test_different_seeds_give_different_orders() {
        let a = DrawRun::shuffled(&mut StdRng::seed_from_u64(1));
        let b = DrawRun::shuffled(&mut StdRng::seed_from_u64(2));
        assert_ne!(a.pool(), b.pool());
    }

    #[test]
    fn test_sequence_is_comma_joined() {
        assert_eq!(join_sequence(&[5, 12, 75]), "5,12,75");
        assert_eq!(join_sequence(&[]), "");
    }

    #[test]
    fn test_run_label_uses_offset() {
        let start = DateTime::parse_from_rfc3339("2024-05-01T15:07:42Z")
            .unwrap()
            .with_timezone(&Utc);
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(run_label("Bingo", start, offset), "Bingo_2024-05-01_10:07");
    }
}
