//! Root vocabulary: storage, caching, and acquisition.
//!
//! Roots are the atomic fragments templates combine into names. They arrive
//! either from hand-edited root files or from the AI provider, and are
//! frozen into a [`RootStore`] before synthesis begins.

pub mod error;
pub mod manager;
pub mod provider;
pub mod store;

pub use error::RootsError;
pub use manager::{RootCache, RootManager};
pub use provider::{ProviderError, RootProvider};
pub use store::{Category, RootEntry, RootStore};
