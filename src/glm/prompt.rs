//! Root-generation prompt rendering.
//!
//! Prompts are templates with `{variable}` placeholders, overridable from
//! `prompts.yaml`; the built-in template asks the model for a JSON object of
//! category-to-roots with optional tags.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::config::{CategoryDef, TagConfig};

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Built-in root-generation prompt, used when `prompts.yaml` has no
/// `word_root_generation` override.
pub const DEFAULT_ROOT_PROMPT: &str = r#"Generate word roots for the "{style_name}" style, covering these categories:

{categories_desc}

Requirements:
1. Produce the requested number of high-quality roots per category; never pad with off-style filler.
2. Every root must match the style; prefer common characters over obscure ones.
3. Roots must combine well with roots from the other categories.
4. One to four characters per root; two-character roots with strong imagery add variety.
5. No offensive or sensitive words; avoid near-duplicate meanings within a category.
6. Tag each root with fitting tags from: {available_tags}
7. Never attach mutually conflicting tags to one root. Conflicting tags: {tag_conflicts}

Return a single JSON object and nothing else, shaped like:
{example_json}
"#;

/// Replace known `{variable}` placeholders, leaving unknown ones verbatim.
pub fn interpolate(template: &str, vars: &HashMap<&str, String>) -> String {
    VARIABLE_PATTERN
        .replace_all(template, |caps: &regex::Captures<'_>| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render the root-generation prompt for one style.
///
/// `template_override` comes from `prompts.yaml`; the example JSON in the
/// prompt is built from the first configured examples (tagged form when the
/// style declares tags, bare strings otherwise).
pub fn build_root_prompt(
    style_name: &str,
    categories: &[CategoryDef],
    tags: &TagConfig,
    template_override: Option<&str>,
) -> String {
    let available_tags = &tags.available;
    let categories_desc = categories
        .iter()
        .map(|category| {
            let examples = if category.examples.is_empty() {
                "none".to_string()
            } else {
                category
                    .examples
                    .iter()
                    .take(5)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "- {}: {} ({} roots), examples: {}",
                category.name, category.description, category.count_per_category, examples
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut example = serde_json::Map::new();
    for category in categories {
        let sample = if available_tags.is_empty() {
            json!(category.examples.iter().take(3).collect::<Vec<_>>())
        } else {
            json!(category
                .examples
                .iter()
                .take(2)
                .map(|word| json!({ "word": word, "tags": [available_tags[0]] }))
                .collect::<Vec<_>>())
        };
        example.insert(category.name.clone(), sample);
    }
    let example_json = serde_json::to_string_pretty(&serde_json::Value::Object(example))
        .unwrap_or_else(|_| "{}".to_string());

    let tags_desc = if available_tags.is_empty() {
        "none".to_string()
    } else {
        available_tags.join(", ")
    };

    let conflicts_desc = if tags.conflicts.is_empty() {
        "none".to_string()
    } else {
        let mut entries: Vec<String> = tags
            .conflicts
            .iter()
            .map(|(tag, others)| format!("{tag} conflicts with {}", others.join(", ")))
            .collect();
        entries.sort_unstable();
        entries.join("; ")
    };

    let vars: HashMap<&str, String> = [
        ("style_name", style_name.to_string()),
        ("categories_desc", categories_desc),
        ("available_tags", tags_desc),
        ("tag_conflicts", conflicts_desc),
        ("example_json", example_json),
    ]
    .into_iter()
    .collect();

    interpolate(template_override.unwrap_or(DEFAULT_ROOT_PROMPT), &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, examples: &[&str]) -> CategoryDef {
        serde_yaml::from_str(&format!(
            "name: {name}\ndescription: test\nexamples: [{}]\ncount_per_category: 5\n",
            examples.join(", ")
        ))
        .unwrap()
    }

    fn tags(available: &[&str]) -> TagConfig {
        TagConfig {
            available: available.iter().map(|s| s.to_string()).collect(),
            conflicts: HashMap::new(),
        }
    }

    #[test]
    fn test_interpolate_replaces_known_vars() {
        let vars: HashMap<&str, String> = [("name", "Alice".to_string())].into_iter().collect();
        assert_eq!(interpolate("hi {name}, {other}", &vars), "hi Alice, {other}");
    }

    #[test]
    fn test_default_prompt_mentions_categories_and_counts() {
        let prompt = build_root_prompt(
            "古风",
            &[category("意象", &["云", "月"]), category("建筑", &["轩"])],
            &tags(&[]),
            None,
        );
        assert!(prompt.contains("古风"));
        assert!(prompt.contains("- 意象: test (5 roots), examples: 云, 月"));
        assert!(prompt.contains("- 建筑:"));
        assert!(prompt.contains("\"意象\""));
    }

    #[test]
    fn test_tagged_example_json_when_tags_configured() {
        let prompt = build_root_prompt(
            "古风",
            &[category("意象", &["云", "月"])],
            &tags(&["自然"]),
            None,
        );
        assert!(prompt.contains("\"word\": \"云\""));
        assert!(prompt.contains("自然"));
    }

    #[test]
    fn test_conflicting_tags_listed_in_prompt() {
        let mut tags = tags(&["孤寂", "明快"]);
        tags.conflicts
            .insert("孤寂".to_string(), vec!["明快".to_string()]);
        let prompt = build_root_prompt("古风", &[], &tags, None);
        assert!(prompt.contains("孤寂 conflicts with 明快"));
    }

    #[test]
    fn test_no_conflicts_renders_none() {
        let prompt = build_root_prompt("古风", &[], &tags(&["自然"]), None);
        assert!(prompt.contains("Conflicting tags: none"));
    }

    #[test]
    fn test_override_template_is_used() {
        let prompt = build_root_prompt(
            "古风",
            &[],
            &TagConfig::default(),
            Some("custom for {style_name}"),
        );
        assert_eq!(prompt, "custom for 古风");
    }
}
