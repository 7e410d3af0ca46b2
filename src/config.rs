// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use getset::CopyGetters;

use crate::{
    errs::SkipListError,
    preconditions::check_argument,
};

/// The maximum number of lanes a list can grow to. 2^32 elements is far past
/// anything an in-memory list will hold.
pub const MAX_LEVEL: usize = 32;

/// The chance that a node is promoted into the next lane.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SkipListConfig {
    /// Number of lanes allocated for the sentinel.
    max_level: usize,
    /// Promotion probability per level.
    probability: f64,
    /// Fixed seed for the level generator; `None` seeds from the thread rng.
    seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            max_level: MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl SkipListConfig {
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SkipListError> {
        check_argument(
            (2..=MAX_LEVEL).contains(&self.max_level),
            "max level %s must be between 2 and %s",
            &[&self.max_level, &MAX_LEVEL],
        )?;
        check_argument(
            self.probability > 0.0 && self.probability < 1.0,
            "probability %s must be in (0, 1)",
            &[&self.probability],
        )
    }
}
