// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use rand::{
    prelude::*,
    rngs::SmallRng,
};

use crate::{
    config::SkipListConfig,
    errs::SkipListError,
    preconditions::check_argument,
};

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a `LevelGenerator`.
pub trait LevelGenerator {
    /// The total number of lanes that are assumed to exist for this level
    /// generator.
    fn total(&self) -> usize;
    /// Generate the number of lanes for a new node, in the range `[1, total)`.
    ///
    /// This must never return a level that is `>= self.total()`.
    fn random(&mut self) -> usize;
}

/// A level generator which will produce geometrically distributed numbers.
///
/// Every node starts in one lane and is promoted one more lane at a time with
/// probability `p`, stopping at `total - 1` lanes.
#[derive(Debug)]
pub struct GeometricalLevelGenerator {
    total: usize,
    p: f64,
    rng: SmallRng, // Fast generator
}

impl GeometricalLevelGenerator {
    /// Create a new GeometricalLevelGenerator with `total` number of lanes,
    /// and `p` as the probability that a given node is present in the next
    /// lane. `total` must be at least 2 and `p` must be in `(0, 1)`.
    pub fn new(total: usize, p: f64) -> Result<Self, SkipListError> {
        Self::build(total, p, SmallRng::seed_from_u64(thread_rng().gen()))
    }

    /// Same as [`GeometricalLevelGenerator::new`] but with a deterministic
    /// sequence of levels.
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, SkipListError> {
        Self::build(total, p, SmallRng::seed_from_u64(seed))
    }

    /// Build a generator for an already validated config. Every call starts a
    /// fresh random sequence unless the config pins a seed.
    pub(crate) fn from_config(config: &SkipListConfig) -> Self {
        let rng = match config.seed() {
            | Some(seed) => SmallRng::seed_from_u64(seed),
            | None => SmallRng::seed_from_u64(thread_rng().gen()),
        };
        GeometricalLevelGenerator {
            total: config.max_level(),
            p: config.probability(),
            rng,
        }
    }

    fn build(total: usize, p: f64, rng: SmallRng) -> Result<Self, SkipListError> {
        check_argument(total >= 2, "total %s must be at least 2", &[&total])?;
        check_argument(p > 0.0 && p < 1.0, "p %s must be in (0, 1)", &[&p])?;
        Ok(GeometricalLevelGenerator { total, p, rng })
    }
}

impl LevelGenerator for GeometricalLevelGenerator {
    fn random(&mut self) -> usize {
        let mut level = 1;
        while level < self.total - 1 && self.rng.gen::<f64>() < self.p {
            level += 1;
        }
        level
    }

    fn total(&self) -> usize {
        self.total
    }
}
