//! Configuration loading and lookup.
//!
//! All configuration is read once at startup; styles and roots are immutable
//! for the duration of a run, so there is no re-reading or hot reload inside
//! the engine.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::error::ConfigError;
use crate::config::settings::{
    CategoryDef, FiltersConfig, GenerationConfig, PromptsFile, StyleConfig, StylesFile,
    SystemConfig,
};
use crate::engine::FilterChain;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Replace `${VAR}` references with environment values, leaving unresolved
/// references verbatim.
fn substitute_env(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Loaded configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
    system: SystemConfig,
    styles: StylesFile,
    prompts: PromptsFile,
}

impl ConfigManager {
    /// Load `config.yaml`, `styles.yaml`, and the optional `prompts.yaml`
    /// from `config_dir`.
    ///
    /// # Errors
    /// [`ConfigError::MissingFile`] when a required file is absent;
    /// [`ConfigError::Yaml`] on parse failure.
    pub fn load(config_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let system: SystemConfig = parse_yaml(&read_required(&config_dir.join("config.yaml"))?)?;
        let styles: StylesFile = parse_yaml(&read_required(&config_dir.join("styles.yaml"))?)?;

        let prompts_path = config_dir.join("prompts.yaml");
        let prompts = if prompts_path.exists() {
            parse_yaml(&std::fs::read_to_string(&prompts_path)?)?
        } else {
            tracing::warn!(path = %prompts_path.display(), "prompts.yaml missing, using built-in prompts");
            PromptsFile::default()
        };

        tracing::info!(
            config_dir = %config_dir.display(),
            styles = styles.styles.len(),
            "configuration loaded"
        );

        Ok(Self {
            config_dir,
            system,
            styles,
            prompts,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn system(&self) -> &SystemConfig {
        &self.system
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.styles.generation
    }

    pub fn filters(&self) -> &FiltersConfig {
        &self.styles.filters
    }

    /// The named style.
    pub fn style(&self, name: &str) -> Result<&StyleConfig, ConfigError> {
        self.styles
            .styles
            .get(name)
            .ok_or_else(|| ConfigError::StyleNotFound(name.to_string()))
    }

    /// Names of all enabled styles.
    pub fn list_styles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .styles
            .styles
            .iter()
            .filter(|(_, style)| style.enabled)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Combination templates configured for a style.
    pub fn templates_for(&self, style: &str) -> &[String] {
        self.styles
            .word_roots
            .templates
            .get(style)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Root category definitions configured for a style.
    pub fn categories_for(&self, style: &str) -> &[CategoryDef] {
        self.styles
            .word_roots
            .categories
            .get(style)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Build the filter chain for a style from its bounds, the global filter
    /// toggles, and the style's forbidden combinations.
    pub fn filter_chain(&self, style_name: &str) -> Result<FilterChain, ConfigError> {
        let style = self.style(style_name)?;
        Ok(FilterChain::new(
            style.length_min,
            style.length_max,
            self.styles.filters.forbid_duplicate_chars,
            self.styles.filters.forbidden_pairs_for(style_name),
            style.charset,
        ))
    }

    /// A named prompt template override from `prompts.yaml`, if present.
    pub fn prompt_template(&self, kind: &str) -> Option<&str> {
        self.prompts
            .prompts
            .get(kind)
            .map(|p| p.template.as_str())
    }

    /// Check a style is usable: sane length bounds, at least one template,
    /// at least one category definition.
    pub fn validate_style(&self, name: &str) -> Result<(), ConfigError> {
        let style = self.style(name)?;
        let invalid = |reason: &str| ConfigError::InvalidStyle {
            style: name.to_string(),
            reason: reason.to_string(),
        };

        if style.length_min == 0 {
            return Err(invalid("length_min must be at least 1"));
        }
        if style.length_min > style.length_max {
            return Err(invalid("length_min exceeds length_max"));
        }
        if self.templates_for(name).is_empty() {
            return Err(invalid("no combination templates configured"));
        }
        if self.categories_for(name).is_empty() {
            return Err(invalid("no root categories configured"));
        }
        Ok(())
    }
}

fn read_required(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    Ok(substitute_env(&std::fs::read_to_string(path)?))
}

/// An empty file is treated as an empty document rather than a parse error.
fn parse_yaml<T: serde::de::DeserializeOwned + Default>(content: &str) -> Result<T, ConfigError> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const STYLES_YAML: &str = r#"
styles:
  古风:
    description: 古典雅致
    length_min: 2
    length_max: 4
    charset: cjk
  二次元:
    description: 动漫风
    enabled: false
word_roots:
  categories:
    古风:
      - name: 意象
        description: 自然意象
        examples: [云, 月]
      - name: 建筑
        description: 古代建筑
        examples: [轩, 阁]
  templates:
    古风:
      - "{意象}{建筑}"
filters:
  forbid_duplicate_chars: true
  forbidden_combinations:
    古风:
      - [云, 月]
generation:
  style: 古风
  count: 50
"#;

    fn write_config(dir: &TempDir, config: &str, styles: &str) {
        fs::write(dir.path().join("config.yaml"), config).unwrap();
        fs::write(dir.path().join("styles.yaml"), styles).unwrap();
    }

    #[test]
    fn test_load_and_query() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "api:\n  timeout: 10\n", STYLES_YAML);

        let manager = ConfigManager::load(dir.path()).unwrap();
        assert_eq!(manager.system().api.timeout, 10);
        assert_eq!(manager.generation().style, "古风");
        assert_eq!(manager.generation().count, 50);
        assert_eq!(manager.style("古风").unwrap().length_max, 4);
        assert_eq!(manager.templates_for("古风"), ["{意象}{建筑}"]);
        assert_eq!(manager.categories_for("古风").len(), 2);
    }

    #[test]
    fn test_list_styles_skips_disabled() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "", STYLES_YAML);

        let manager = ConfigManager::load(dir.path()).unwrap();
        assert_eq!(manager.list_styles(), vec!["古风"]);
    }

    #[test]
    fn test_missing_required_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "").unwrap();

        let err = ConfigManager::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_unknown_style() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "", STYLES_YAML);

        let manager = ConfigManager::load(dir.path()).unwrap();
        assert!(matches!(
            manager.style("不存在"),
            Err(ConfigError::StyleNotFound(_))
        ));
    }

    #[test]
    fn test_validate_style() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "", STYLES_YAML);

        let manager = ConfigManager::load(dir.path()).unwrap();
        manager.validate_style("古风").unwrap();
        // 二次元 has no templates or categories configured.
        assert!(matches!(
            manager.validate_style("二次元"),
            Err(ConfigError::InvalidStyle { .. })
        ));
    }

    #[test]
    fn test_filter_chain_uses_style_and_filters() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "", STYLES_YAML);

        let manager = ConfigManager::load(dir.path()).unwrap();
        let chain = manager.filter_chain("古风").unwrap();
        assert!(!chain.accepts("云月轩")); // forbidden pair 云月
        assert!(!chain.accepts("轩")); // below length_min
        assert!(chain.accepts("月轩"));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("NAMEFORGE_TEST_KEY", "sk-test");
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "api:\n  glm:\n    api_key: ${NAMEFORGE_TEST_KEY}\n",
            STYLES_YAML,
        );

        let manager = ConfigManager::load(dir.path()).unwrap();
        assert_eq!(manager.system().api.glm.api_key, "sk-test");
    }

    #[test]
    fn test_unresolved_env_ref_kept_verbatim() {
        assert_eq!(
            substitute_env("key: ${NAMEFORGE_DEFINITELY_UNSET}"),
            "key: ${NAMEFORGE_DEFINITELY_UNSET}"
        );
    }
}
