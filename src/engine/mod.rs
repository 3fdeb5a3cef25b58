//! Combinatorial synthesis engine.
//!
//! Turns a style's root store and templates into a deduplicated, sampled
//! batch of names: compile templates, lazily enumerate (or randomly probe)
//! each combination space, run the filter chain, reject corpus collisions,
//! and sample the accepted pool down to the requested count with
//! per-template proportionality.
//!
//! The engine is synchronous and holds no state across runs; all inputs are
//! loaded before synthesis starts and a single seeded RNG drives both
//! probing and sampling, so a run is reproducible from its seed.

pub mod combine;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod sampler;
pub mod template;

use rand::rngs::StdRng;

use crate::roots::store::RootStore;

pub use combine::{CombinationSpace, ConsumptionMode, DEFAULT_FULL_ENUMERATION_CEILING};
pub use dedup::CorpusDedup;
pub use error::EngineError;
pub use filter::{CharsetClass, FilterChain, FilterStage};
pub use sampler::{sample_proportional, SampleOutcome, TemplatePool};
pub use template::{CompiledTemplate, Slot};

/// Default multiplier of the requested count that bounds probing draws.
pub const DEFAULT_PROBE_OVERSAMPLE: usize = 20;

/// Floor on probing draws so tiny requests still explore the space.
const MIN_PROBE_DRAWS: usize = 64;

/// Per-run counters surfaced alongside the accepted names.
#[derive(Debug, Clone, Default)]
pub struct SynthesisStats {
    /// Candidates produced by the generators.
    pub considered: u64,
    /// Rejected by the length stage.
    pub rejected_length: u64,
    /// Rejected by the adjacent-repeated-character stage.
    pub rejected_repeat: u64,
    /// Rejected by the forbidden-pair stage.
    pub rejected_forbidden_pair: u64,
    /// Rejected by the charset stage.
    pub rejected_charset: u64,
    /// Rejected as a corpus or intra-run duplicate.
    pub rejected_duplicate: u64,
    /// Names in the delivered result.
    pub accepted: u64,
    /// True when fewer names were delivered than requested.
    pub shortfall: bool,
}

impl SynthesisStats {
    fn record_rejection(&mut self, stage: FilterStage) {
        match stage {
            FilterStage::Length => self.rejected_length += 1,
            FilterStage::RepeatedChar => self.rejected_repeat += 1,
            FilterStage::ForbiddenPair => self.rejected_forbidden_pair += 1,
            FilterStage::Charset => self.rejected_charset += 1,
        }
    }
}

/// The final output of a synthesis run.
#[derive(Debug)]
pub struct AcceptanceResult {
    /// Accepted, deduplicated, sampled names.
    pub names: Vec<String>,
    /// Run counters.
    pub stats: SynthesisStats,
}

/// One synthesis run's tunables.
#[derive(Debug, Clone)]
pub struct SynthesisEngine {
    full_enumeration_ceiling: u64,
    probe_oversample: usize,
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FULL_ENUMERATION_CEILING, DEFAULT_PROBE_OVERSAMPLE)
    }
}

impl SynthesisEngine {
    /// Configure the engine.
    ///
    /// Templates whose combination count exceeds `full_enumeration_ceiling`
    /// are consumed by random probing with at most
    /// `max(requested * probe_oversample, 64)` draws.
    pub fn new(full_enumeration_ceiling: u64, probe_oversample: usize) -> Self {
        Self {
            full_enumeration_ceiling,
            probe_oversample: probe_oversample.max(1),
        }
    }

    /// Run a full synthesis pass for one style.
    ///
    /// All templates are compiled before any candidate is produced; a
    /// compilation failure or an empty referenced category aborts the run.
    /// Under-delivery is not an error: the result carries the partial name
    /// list with `stats.shortfall` set.
    pub fn synthesize(
        &self,
        templates: &[String],
        store: &RootStore,
        filter: &FilterChain,
        corpus_snapshot: Vec<String>,
        requested: usize,
        rng: &mut StdRng,
    ) -> Result<AcceptanceResult, EngineError> {
        let category_names = store.name_set();
        let compiled: Vec<CompiledTemplate> = templates
            .iter()
            .map(|t| CompiledTemplate::compile(t, &category_names))
            .collect::<Result<_, _>>()?;

        let mut dedup = CorpusDedup::from_snapshot(corpus_snapshot);
        let mut stats = SynthesisStats::default();
        let mut pools: Vec<TemplatePool> = Vec::with_capacity(compiled.len());

        for template in &compiled {
            let space = CombinationSpace::new(template, store)?;
            let mode = space.mode(self.full_enumeration_ceiling);
            tracing::debug!(
                template = template.source(),
                combinations = %space.count(),
                ?mode,
                "enumerating template"
            );

            let mut pool = TemplatePool {
                template: template.source().to_string(),
                names: Vec::new(),
            };
            match mode {
                ConsumptionMode::Full => {
                    for candidate in space.enumerate() {
                        Self::consider(candidate, filter, &mut dedup, &mut stats, &mut pool);
                    }
                }
                ConsumptionMode::Probe => {
                    let draws = (requested * self.probe_oversample).max(MIN_PROBE_DRAWS);
                    for candidate in space.probe(rng, draws) {
                        Self::consider(candidate, filter, &mut dedup, &mut stats, &mut pool);
                    }
                }
            }
            tracing::debug!(
                template = template.source(),
                accepted = pool.names.len(),
                "template pool filled"
            );
            pools.push(pool);
        }

        let outcome = sample_proportional(&pools, requested, rng);
        stats.accepted = outcome.names.len() as u64;
        stats.shortfall = outcome.shortfall;

        tracing::info!(
            considered = stats.considered,
            accepted = stats.accepted,
            duplicates = stats.rejected_duplicate,
            shortfall = stats.shortfall,
            "synthesis run complete"
        );

        Ok(AcceptanceResult {
            names: outcome.names,
            stats,
        })
    }

    fn consider(
        candidate: String,
        filter: &FilterChain,
        dedup: &mut CorpusDedup,
        stats: &mut SynthesisStats,
        pool: &mut TemplatePool,
    ) {
        stats.considered += 1;
        if let Err(stage) = filter.check(&candidate) {
            stats.record_rejection(stage);
            return;
        }
        if !dedup.is_new(&candidate) {
            stats.rejected_duplicate += 1;
            return;
        }
        dedup.commit(candidate.clone());
        pool.names.push(candidate);
    }
}
