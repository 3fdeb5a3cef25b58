//! GLM API collaborator: chat-completions client and prompt rendering.
//!
//! The synthesis engine never depends on this module; roots flow in through
//! the [`RootProvider`](crate::roots::provider::RootProvider) seam.

pub mod client;
pub mod error;
pub mod prompt;

pub use client::{GlmClient, TokenUsage};
pub use error::GlmError;
