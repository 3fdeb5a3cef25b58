//! Typed configuration structures.
//!
//! Three YAML files make up a deployment's configuration:
//!
//! - `config.yaml` — system settings (API endpoint, key, timeouts), with
//!   `${VAR}` environment substitution applied to the raw text.
//! - `styles.yaml` — styles, word-root category definitions, templates,
//!   filter rules, and generation settings.
//! - `prompts.yaml` — optional prompt template overrides.

use std::collections::HashMap;

use serde::Deserialize;

use crate::engine::filter::CharsetClass;

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// config.yaml
// ---------------------------------------------------------------------------

/// Top-level system configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub api: ApiConfig,
}

/// API collaborator settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub glm: GlmApiConfig,
    /// Request timeout in seconds.
    #[serde(default = "ApiConfig::default_timeout")]
    pub timeout: u64,
}

impl ApiConfig {
    fn default_timeout() -> u64 {
        30
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            glm: GlmApiConfig::default(),
            timeout: Self::default_timeout(),
        }
    }
}

/// GLM chat-completions endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GlmApiConfig {
    /// API key; usually injected as `${GLM_API_KEY}`.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "GlmApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GlmApiConfig::default_model")]
    pub model: String,
}

impl GlmApiConfig {
    fn default_base_url() -> String {
        "https://open.bigmodel.cn/api/paas/v4/chat/completions".to_string()
    }

    fn default_model() -> String {
        "glm-4-flash".to_string()
    }
}

impl Default for GlmApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
        }
    }
}

// ---------------------------------------------------------------------------
// styles.yaml
// ---------------------------------------------------------------------------

/// Everything `styles.yaml` declares.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StylesFile {
    #[serde(default)]
    pub styles: HashMap<String, StyleConfig>,
    #[serde(default)]
    pub word_roots: WordRootsConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// One style's settings, immutable for the duration of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub description: String,
    /// Inclusive lower bound on candidate character count.
    #[serde(default = "StyleConfig::default_length_min")]
    pub length_min: usize,
    /// Inclusive upper bound on candidate character count.
    #[serde(default = "StyleConfig::default_length_max")]
    pub length_max: usize,
    #[serde(default)]
    pub charset: CharsetClass,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: TagConfig,
}

impl StyleConfig {
    fn default_length_min() -> usize {
        2
    }

    fn default_length_max() -> usize {
        6
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            length_min: Self::default_length_min(),
            length_max: Self::default_length_max(),
            charset: CharsetClass::default(),
            enabled: true,
            tags: TagConfig::default(),
        }
    }
}

/// Tags the root generator may attach to roots of a style.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagConfig {
    #[serde(default)]
    pub available: Vec<String>,
    /// Tags that must not be attached to the same root, keyed by tag.
    #[serde(default)]
    pub conflicts: HashMap<String, Vec<String>>,
}

impl TagConfig {
    /// Tags declared to conflict with `tag`.
    pub fn conflicts_with(&self, tag: &str) -> &[String] {
        self.conflicts.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// True unless either tag declares the other as a conflict.
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        !self.conflicts_with(a).iter().any(|t| t == b)
            && !self.conflicts_with(b).iter().any(|t| t == a)
    }
}

/// Word-root category definitions and combination templates, per style.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordRootsConfig {
    #[serde(default)]
    pub categories: HashMap<String, Vec<CategoryDef>>,
    #[serde(default)]
    pub templates: HashMap<String, Vec<String>>,
}

/// Definition of one root category for the AI generator.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Hand-picked examples: prompt seeds and the offline fallback corpus.
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default = "CategoryDef::default_count")]
    pub count_per_category: usize,
}

impl CategoryDef {
    fn default_count() -> usize {
        25
    }
}

/// Filter-stage parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    /// Reject candidates with the same character in adjacent positions.
    #[serde(default = "default_true")]
    pub forbid_duplicate_chars: bool,
    /// Per-style forbidden fragment sequences; each inner list is joined
    /// into one contiguous substring.
    #[serde(default)]
    pub forbidden_combinations: HashMap<String, Vec<Vec<String>>>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            forbid_duplicate_chars: true,
            forbidden_combinations: HashMap::new(),
        }
    }
}

impl FiltersConfig {
    /// The joined forbidden substrings for one style.
    pub fn forbidden_pairs_for(&self, style: &str) -> Vec<String> {
        self.forbidden_combinations
            .get(style)
            .map(|combos| combos.iter().map(|parts| parts.concat()).collect())
            .unwrap_or_default()
    }
}

/// Run-level generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Style to synthesize when the binary is not told otherwise.
    #[serde(default)]
    pub style: String,
    /// Requested number of names per run.
    #[serde(default = "GenerationConfig::default_count")]
    pub count: usize,
    /// RNG seed; absent means derive one at startup and log it.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Combination-space size above which a template is randomly probed.
    #[serde(default = "GenerationConfig::default_ceiling")]
    pub full_enumeration_ceiling: u64,
    /// Probing draw budget as a multiple of the requested count.
    #[serde(default = "GenerationConfig::default_oversample")]
    pub probe_oversample: usize,
}

impl GenerationConfig {
    fn default_count() -> usize {
        100
    }

    fn default_ceiling() -> u64 {
        crate::engine::DEFAULT_FULL_ENUMERATION_CEILING
    }

    fn default_oversample() -> usize {
        crate::engine::DEFAULT_PROBE_OVERSAMPLE
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            style: String::new(),
            count: Self::default_count(),
            seed: None,
            full_enumeration_ceiling: Self::default_ceiling(),
            probe_oversample: Self::default_oversample(),
        }
    }
}

// ---------------------------------------------------------------------------
// prompts.yaml
// ---------------------------------------------------------------------------

/// Optional prompt template overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsFile {
    #[serde(default)]
    pub prompts: HashMap<String, PromptTemplate>,
}

/// One named prompt template.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_defaults() {
        let style: StyleConfig = serde_yaml::from_str("description: 古风").unwrap();
        assert_eq!(style.length_min, 2);
        assert_eq!(style.length_max, 6);
        assert!(style.enabled);
        assert_eq!(style.charset, CharsetClass::Any);
    }

    #[test]
    fn test_charset_parses_lowercase() {
        let style: StyleConfig = serde_yaml::from_str("charset: cjk").unwrap();
        assert_eq!(style.charset, CharsetClass::Cjk);
    }

    #[test]
    fn test_forbidden_pairs_are_joined() {
        let filters: FiltersConfig = serde_yaml::from_str(
            "forbidden_combinations:\n  古风:\n    - [云, 云]\n    - [月, 月]\n",
        )
        .unwrap();
        assert_eq!(filters.forbidden_pairs_for("古风"), vec!["云云", "月月"]);
        assert!(filters.forbidden_pairs_for("其他").is_empty());
    }

    #[test]
    fn test_tag_conflicts_apply_both_ways() {
        let tags: TagConfig =
            serde_yaml::from_str("available: [孤寂, 明快, 雅致]\nconflicts:\n  孤寂: [明快]\n")
                .unwrap();
        assert_eq!(tags.conflicts_with("孤寂"), ["明快"]);
        assert!(!tags.compatible("孤寂", "明快"));
        assert!(!tags.compatible("明快", "孤寂"));
        assert!(tags.compatible("孤寂", "雅致"));
    }

    #[test]
    fn test_generation_defaults() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.count, 100);
        assert_eq!(generation.full_enumeration_ceiling, 2_000_000);
        assert!(generation.seed.is_none());
    }
}
