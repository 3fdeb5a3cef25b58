//! Lazy combination generation over a compiled template and a root store.
//!
//! The full candidate space of a template is the Cartesian product of the
//! root pools of its category slots. Its size is computed up front as an
//! integer so the caller can pick a consumption mode before producing a
//! single candidate:
//!
//! - **Full enumeration** — mixed-radix counting with the rightmost slot
//!   varying fastest; every combination exactly once.
//! - **Random probing** — for spaces above the ceiling, a seeded stream of
//!   randomly indexed combinations, non-repeating within the run and bounded
//!   by a draw budget, so astronomically large products are never iterated or
//!   materialized.
//!
//! Generation is side-effect free: filtering and deduplication happen
//! downstream.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::engine::error::EngineError;
use crate::engine::template::CompiledTemplate;
use crate::roots::store::RootStore;

/// Default ceiling above which a template switches to random probing.
pub const DEFAULT_FULL_ENUMERATION_CEILING: u64 = 2_000_000;

/// How a combination space should be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionMode {
    /// Enumerate every combination in mixed-radix order.
    Full,
    /// Draw random non-repeating indices up to a budget.
    Probe,
}

/// The candidate space of one compiled template against one root store.
#[derive(Debug)]
pub struct CombinationSpace<'a> {
    template: &'a CompiledTemplate,
    pools: Vec<Vec<&'a str>>,
    count: u128,
}

impl<'a> CombinationSpace<'a> {
    /// Bind a compiled template to the root pools it references.
    ///
    /// # Errors
    /// - [`EngineError::UnknownCategory`] if the store lacks a referenced
    ///   category (possible when a template was compiled against a different
    ///   store).
    /// - [`EngineError::EmptyCategory`] if a referenced category has no
    ///   roots.
    /// - [`EngineError::CombinationOverflow`] if the product exceeds u128.
    pub fn new(template: &'a CompiledTemplate, store: &'a RootStore) -> Result<Self, EngineError> {
        let mut pools: Vec<Vec<&'a str>> = Vec::new();
        for name in template.category_refs() {
            let roots = store.get(name).ok_or_else(|| EngineError::UnknownCategory {
                template: template.source().to_string(),
                category: name.to_string(),
            })?;
            if roots.is_empty() {
                return Err(EngineError::EmptyCategory {
                    category: name.to_string(),
                });
            }
            pools.push(roots.iter().map(|r| r.word.as_str()).collect());
        }

        let mut count: u128 = 1;
        for pool in &pools {
            count = count.checked_mul(pool.len() as u128).ok_or_else(|| {
                EngineError::CombinationOverflow {
                    template: template.source().to_string(),
                }
            })?;
        }

        Ok(Self {
            template,
            pools,
            count,
        })
    }

    /// The template this space enumerates.
    pub fn template(&self) -> &CompiledTemplate {
        self.template
    }

    /// Exact size of the space: the product of all referenced pool sizes,
    /// with a repeated category counted once per slot. A template with no
    /// placeholders has exactly one combination, the literal itself.
    pub fn count(&self) -> u128 {
        self.count
    }

    /// Pick the consumption mode for a given enumeration ceiling.
    pub fn mode(&self, ceiling: u64) -> ConsumptionMode {
        if self.count <= u128::from(ceiling) {
            ConsumptionMode::Full
        } else {
            ConsumptionMode::Probe
        }
    }

    /// Decode a single combination index into its candidate string.
    ///
    /// Index `0` takes the first root of every pool; incrementing the index
    /// advances the rightmost slot first, as in mixed-radix counting. Any
    /// consumed prefix of the full enumeration is therefore resumable from a
    /// single integer offset.
    pub fn candidate_at(&self, index: u128) -> String {
        debug_assert!(index < self.count);
        let mut choices = vec![""; self.pools.len()];
        let mut rest = index;
        for (slot, pool) in self.pools.iter().enumerate().rev() {
            let radix = pool.len() as u128;
            choices[slot] = pool[(rest % radix) as usize];
            rest /= radix;
        }
        self.template.render(&choices)
    }

    /// Lazily enumerate every combination in index order.
    pub fn enumerate(&self) -> FullEnumeration<'_, 'a> {
        FullEnumeration {
            space: self,
            next: 0,
        }
    }

    /// Draw up to `max_draws` distinct random combinations from the space.
    ///
    /// The stream never repeats an index within its lifetime and ends early
    /// if the whole space has been drawn. With the same seeded RNG it yields
    /// the same sequence.
    pub fn probe<'r>(&'r self, rng: &'r mut StdRng, max_draws: usize) -> ProbeStream<'r, 'a> {
        ProbeStream {
            space: self,
            rng,
            seen: HashSet::new(),
            remaining: max_draws,
        }
    }
}

/// Iterator over the complete space in mixed-radix order.
pub struct FullEnumeration<'s, 'a> {
    space: &'s CombinationSpace<'a>,
    next: u128,
}

impl Iterator for FullEnumeration<'_, '_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.space.count {
            return None;
        }
        let candidate = self.space.candidate_at(self.next);
        self.next += 1;
        Some(candidate)
    }
}

/// Bounded stream of distinct randomly indexed combinations.
pub struct ProbeStream<'r, 'a> {
    space: &'r CombinationSpace<'a>,
    rng: &'r mut StdRng,
    seen: HashSet<u128>,
    remaining: usize,
}

impl Iterator for ProbeStream<'_, '_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 || self.seen.len() as u128 >= self.space.count {
            return None;
        }
        loop {
            let index = self.rng.random_range(0..self.space.count);
            if self.seen.insert(index) {
                self.remaining -= 1;
                return Some(self.space.candidate_at(index));
            }
        }
    }
}
