//! Root lifecycle management.
//!
//! Resolution order for a style's roots: in-memory cache, then the style's
//! root file under the data directory, then the AI provider. Generated roots
//! are persisted back to the file with run metadata. The cache is an
//! explicit object owned by the manager and scoped to the process; there is
//! no module-level state.
//!
//! Provider failures are never fatal here: the configured category examples
//! serve as the fallback vocabulary, and under-delivered categories are
//! padded from the same examples.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::config::{CategoryDef, ConfigManager};
use crate::glm::prompt;
use crate::roots::error::RootsError;
use crate::roots::provider::RootProvider;
use crate::roots::store::{RootEntry, RootStore};

/// Explicit per-process cache of loaded root stores, keyed by style.
#[derive(Debug, Default)]
pub struct RootCache {
    inner: HashMap<String, RootStore>,
}

impl RootCache {
    fn get(&self, style: &str) -> Option<&RootStore> {
        self.inner.get(style)
    }

    fn insert(&mut self, style: &str, store: RootStore) {
        self.inner.insert(style.to_string(), store);
    }

    /// Drop one style's entry, or everything when `style` is `None`.
    pub fn clear(&mut self, style: Option<&str>) {
        match style {
            Some(style) => {
                self.inner.remove(style);
            }
            None => self.inner.clear(),
        }
    }
}

/// Loads, generates, caches, and persists root vocabulary per style.
pub struct RootManager {
    data_dir: PathBuf,
    cache: RootCache,
}

impl RootManager {
    /// Create a manager rooted at `data_dir`, creating the directory if
    /// needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, RootsError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            cache: RootCache::default(),
        })
    }

    /// Path of a style's root file.
    pub fn roots_path(&self, style: &str) -> PathBuf {
        self.data_dir.join(format!("{style}_roots.yaml"))
    }

    /// Resolve the root store for a style: cache, then file, then provider
    /// (falling back to configured examples on provider failure or absence).
    ///
    /// # Errors
    /// [`RootsError::NoCategories`] when generation is needed but the style
    /// defines no categories; I/O and YAML errors from the root file.
    pub async fn roots_for(
        &mut self,
        style: &str,
        config: &ConfigManager,
        provider: Option<&dyn RootProvider>,
    ) -> Result<RootStore, RootsError> {
        if let Some(store) = self.cache.get(style) {
            tracing::debug!(style, "roots served from cache");
            return Ok(store.clone());
        }

        if let Some(store) = self.load_from_file(style)? {
            tracing::info!(style, categories = store.len(), "roots loaded from file");
            self.cache.insert(style, store.clone());
            return Ok(store);
        }

        let categories = config.categories_for(style);
        if categories.is_empty() {
            return Err(RootsError::NoCategories(style.to_string()));
        }

        tracing::info!(style, "root file missing, generating roots");
        let store = self.generate(style, categories, config, provider).await;
        self.save_to_file(style, &store)?;
        self.cache.insert(style, store.clone());
        Ok(store)
    }

    /// Drop the cached and persisted roots for a style and produce a fresh
    /// set.
    pub async fn regenerate(
        &mut self,
        style: &str,
        config: &ConfigManager,
        provider: Option<&dyn RootProvider>,
    ) -> Result<RootStore, RootsError> {
        self.cache.clear(Some(style));
        let path = self.roots_path(style);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::info!(style, "old root file removed");
        }
        self.roots_for(style, config, provider).await
    }

    async fn generate(
        &self,
        style: &str,
        categories: &[CategoryDef],
        config: &ConfigManager,
        provider: Option<&dyn RootProvider>,
    ) -> RootStore {
        let tags = config
            .style(style)
            .map(|s| s.tags.clone())
            .unwrap_or_default();
        let rendered = prompt::build_root_prompt(
            style,
            categories,
            &tags,
            config.prompt_template("word_root_generation"),
        );

        let generated = match provider {
            None => {
                tracing::info!(style, "no root provider, using configured examples");
                None
            }
            Some(provider) => match provider.generate_roots(&rendered).await {
                Ok(text) => match parse_root_response(&text) {
                    Ok(map) => Some(map),
                    Err(reason) => {
                        tracing::warn!(style, %reason, "unparseable root response, using examples");
                        None
                    }
                },
                Err(error) => {
                    tracing::warn!(style, %error, "root generation failed, using examples");
                    None
                }
            },
        };

        build_store(categories, generated)
    }

    fn load_from_file(&self, style: &str) -> Result<Option<RootStore>, RootsError> {
        let path = self.roots_path(style);
        if !path.exists() {
            return Ok(None);
        }

        let value: Value = serde_yaml::from_str(&std::fs::read_to_string(&path)?)?;
        let mapping = value
            .get("categories")
            .and_then(Value::as_mapping)
            .ok_or_else(|| RootsError::MalformedFile {
                style: style.to_string(),
                reason: "missing 'categories' mapping".to_string(),
            })?;

        // Walking the YAML mapping keeps the file's category order.
        let mut store = RootStore::new();
        for (key, roots_value) in mapping {
            let name = key.as_str().ok_or_else(|| RootsError::MalformedFile {
                style: style.to_string(),
                reason: "non-string category name".to_string(),
            })?;
            let roots: Vec<RootEntry> = serde_yaml::from_value(roots_value.clone())?;
            store.insert(name, roots);
        }
        Ok(Some(store))
    }

    fn save_to_file(&self, style: &str, store: &RootStore) -> Result<(), RootsError> {
        let mut metadata = Mapping::new();
        metadata.insert(Value::from("style"), Value::from(style));
        metadata.insert(
            Value::from("generated_at"),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        metadata.insert(
            Value::from("total_count"),
            Value::from(store.total_roots() as u64),
        );

        let mut categories = Mapping::new();
        for category in store.categories() {
            let roots: Vec<Value> = category
                .roots
                .iter()
                .map(|root| {
                    if root.tags.is_empty() {
                        Value::from(root.word.clone())
                    } else {
                        let mut entry = Mapping::new();
                        entry.insert(Value::from("word"), Value::from(root.word.clone()));
                        entry.insert(
                            Value::from("tags"),
                            Value::from(
                                root.tags.iter().cloned().map(Value::from).collect::<Vec<_>>(),
                            ),
                        );
                        Value::Mapping(entry)
                    }
                })
                .collect();
            categories.insert(Value::from(category.name.clone()), Value::from(roots));
        }

        let mut document = Mapping::new();
        document.insert(Value::from("metadata"), Value::Mapping(metadata));
        document.insert(Value::from("categories"), Value::Mapping(categories));

        let path = self.roots_path(style);
        std::fs::write(&path, serde_yaml::to_string(&Value::Mapping(document))?)?;
        tracing::info!(style, path = %path.display(), "roots saved");
        Ok(())
    }
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

fn parse_root_response(text: &str) -> Result<HashMap<String, Vec<RootEntry>>, String> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| e.to_string())
}

/// Assemble the store in configured category order, filling gaps from
/// examples and padding under-delivered categories without duplicating
/// words.
fn build_store(
    categories: &[CategoryDef],
    generated: Option<HashMap<String, Vec<RootEntry>>>,
) -> RootStore {
    let mut store = RootStore::new();
    for category in categories {
        let mut roots: Vec<RootEntry> = generated
            .as_ref()
            .and_then(|map| map.get(&category.name))
            .cloned()
            .unwrap_or_default();

        if roots.is_empty() {
            roots = category
                .examples
                .iter()
                .take(category.count_per_category)
                .map(|word| RootEntry::new(word.clone()))
                .collect();
        } else if roots.len() < category.count_per_category {
            for example in &category.examples {
                if roots.len() >= category.count_per_category {
                    break;
                }
                if !roots.iter().any(|root| &root.word == example) {
                    roots.push(RootEntry::new(example.clone()));
                }
            }
        }

        tracing::debug!(
            category = category.name,
            roots = roots.len(),
            "category assembled"
        );
        store.insert(category.name.clone(), roots);
    }
    store
}
