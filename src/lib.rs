//! # nameforge
//!
//! Stylized game-name synthesis. A small set of AI-generated vocabulary
//! roots, organized into per-style categories, is combined through
//! author-defined templates into candidate spaces that can reach millions of
//! entries; the engine enumerates them lazily (or randomly probes spaces too
//! large to walk), applies a filter chain, rejects collisions with the
//! persisted corpus, and samples the survivors down to the requested count
//! while preserving per-template diversity.
//!
//! The synthesis engine ([`engine`]) is pure and synchronous. Roots, styles,
//! and the corpus snapshot are loaded up front by the collaborator modules
//! ([`config`], [`roots`], [`glm`], [`storage`]); a single seeded RNG makes
//! every run reproducible from its seed.

pub mod config;
pub mod engine;
pub mod glm;
pub mod roots;
pub mod storage;

pub use config::ConfigManager;
pub use engine::{
    AcceptanceResult, CharsetClass, CompiledTemplate, CorpusDedup, EngineError, FilterChain,
    SynthesisEngine, SynthesisStats,
};
pub use glm::GlmClient;
pub use roots::{RootEntry, RootManager, RootProvider, RootStore};
pub use storage::StorageManager;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
