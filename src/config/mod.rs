//! Structured configuration: system settings, styles, word-root
//! definitions, filter rules, and prompt overrides, loaded once per
//! invocation from YAML.

pub mod error;
pub mod manager;
pub mod settings;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use settings::{
    ApiConfig, CategoryDef, FiltersConfig, GenerationConfig, GlmApiConfig, PromptTemplate,
    PromptsFile, StyleConfig, StylesFile, SystemConfig, TagConfig, WordRootsConfig,
};
