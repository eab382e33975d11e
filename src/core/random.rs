//! Sources of uniform random bits.
//!
//! Every function that needs entropy takes a `&mut R: RandomSource` so runs can be
//! replayed from a seed or a fixed script.

use crate::core::errors::RandomError;
use rand::Rng;
use std::collections::VecDeque;

/// Capability to produce uniform booleans.
pub trait RandomSource {
    fn next_bool(&mut self) -> Result<bool, RandomError>;
}

impl<R: Rng> RandomSource for R {
    fn next_bool(&mut self) -> Result<bool, RandomError> {
        Ok(self.random_bool(0.5))
    }
}

/// Replays a fixed sequence of draws, failing once it runs dry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<bool>,
    drawn: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = bool>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            drawn: 0,
        }
    }

    /// Builds a script from `0`/`1` digits; any other character is ignored.
    pub fn from_bits(bits: &str) -> Self {
        Self::new(bits.chars().filter_map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        }))
    }

    /// Number of draws still available.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    /// Number of draws consumed so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedSource {
    fn next_bool(&mut self) -> Result<bool, RandomError> {
        let value = self
            .draws
            .pop_front()
            .ok_or(RandomError::Exhausted { drawn: self.drawn })?;
        self.drawn += 1;
        Ok(value)
    }
}
