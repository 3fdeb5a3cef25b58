//! Synthesis engine errors.

use thiserror::Error;

/// Errors raised while compiling templates or running a synthesis pass.
///
/// All of these are configuration-time failures and abort the run for the
/// style; an under-delivering run is not an error (see
/// [`SynthesisStats::shortfall`](crate::engine::SynthesisStats)).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Template braces are unbalanced or a placeholder is empty.
    #[error("malformed template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A placeholder references a category the root store does not define.
    #[error("template '{template}' references unknown category '{category}'")]
    UnknownCategory { template: String, category: String },

    /// A referenced category exists but holds zero roots.
    #[error("category '{category}' has no roots")]
    EmptyCategory { category: String },

    /// The combination-space product does not fit in a u128.
    #[error("combination space of template '{template}' overflows")]
    CombinationOverflow { template: String },
}
