//! Root-provider interface.
//!
//! The engine never calls an AI backend directly; it consumes a finished
//! category-to-roots mapping. This trait is the seam where the GLM client
//! (or a test double) plugs in.

use async_trait::async_trait;

/// Error type providers may surface; the manager treats any failure as a
/// signal to fall back to configured example roots.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// A backend able to produce root vocabulary from a rendered prompt.
#[async_trait]
pub trait RootProvider: Send + Sync {
    /// Send the prompt and return the raw model text, expected to contain a
    /// JSON object mapping category names to root lists.
    async fn generate_roots(&self, prompt: &str) -> Result<String, ProviderError>;
}
