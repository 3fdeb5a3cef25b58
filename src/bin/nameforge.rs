//! nameforge synthesis binary.
//!
//! Runs one synthesis pass for one style: load configuration, resolve roots
//! (cache → file → GLM, falling back to configured examples when no API key
//! is available), snapshot the corpus, synthesize, persist.
//!
//! # Environment Variables
//!
//! - `NAMEFORGE_CONFIG` — configuration directory (default: "config")
//! - `NAMEFORGE_DATA` — data directory (default: "data")
//! - `NAMEFORGE_STYLE` — style to synthesize (default: `generation.style`)
//! - `NAMEFORGE_COUNT` — requested name count (default: `generation.count`)
//! - `GLM_API_KEY` — GLM API key; without it roots come from configured examples
//! - `RUST_LOG` — tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nameforge
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;

use nameforge::engine::SynthesisEngine;
use nameforge::roots::RootProvider;
use nameforge::{ConfigManager, GlmClient, RootManager, StorageManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nameforge=debug".into()),
        )
        .init();

    let config_dir =
        std::env::var("NAMEFORGE_CONFIG").unwrap_or_else(|_| "config".to_string());
    let data_dir = std::env::var("NAMEFORGE_DATA").unwrap_or_else(|_| "data".to_string());

    let config = ConfigManager::load(&config_dir)
        .with_context(|| format!("loading configuration from {config_dir}"))?;
    let generation = config.generation().clone();

    let style = std::env::var("NAMEFORGE_STYLE").unwrap_or_else(|_| generation.style.clone());
    anyhow::ensure!(!style.is_empty(), "no style selected; set generation.style or NAMEFORGE_STYLE");
    let count = std::env::var("NAMEFORGE_COUNT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(generation.count);

    config
        .validate_style(&style)
        .with_context(|| format!("style '{style}' is not usable"))?;

    // Without a key the run still works, fed by configured example roots.
    let glm = match GlmClient::from_config(config.system()) {
        Ok(client) => Some(client),
        Err(error) => {
            tracing::warn!(%error, "GLM unavailable, falling back to example roots");
            None
        }
    };
    let provider = glm.as_ref().map(|client| client as &dyn RootProvider);

    let mut root_manager = RootManager::new(&data_dir)?;
    let store = root_manager.roots_for(&style, &config, provider).await?;
    tracing::info!(
        style,
        categories = store.len(),
        roots = store.total_roots(),
        "root store ready"
    );

    let storage = StorageManager::new(&data_dir)?;
    let snapshot = storage.corpus_snapshot(&style)?;
    tracing::info!(style, corpus = snapshot.len(), "corpus snapshot loaded");

    let seed = generation.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });
    tracing::info!(seed, "run seed");
    let mut rng = StdRng::seed_from_u64(seed);

    let engine = SynthesisEngine::new(
        generation.full_enumeration_ceiling,
        generation.probe_oversample,
    );
    let result = engine.synthesize(
        config.templates_for(&style),
        &store,
        &config.filter_chain(&style)?,
        snapshot,
        count,
        &mut rng,
    )?;

    if result.names.is_empty() {
        tracing::warn!(style, "run produced no names");
    } else {
        storage.append_names(&style, &result.names)?;
        storage.write_run_metadata(&style, &result.stats)?;
    }

    let stats = &result.stats;
    tracing::info!(
        style,
        requested = count,
        accepted = stats.accepted,
        considered = stats.considered,
        rejected_length = stats.rejected_length,
        rejected_repeat = stats.rejected_repeat,
        rejected_forbidden_pair = stats.rejected_forbidden_pair,
        rejected_charset = stats.rejected_charset,
        rejected_duplicate = stats.rejected_duplicate,
        shortfall = stats.shortfall,
        "synthesis finished"
    );
    if stats.shortfall {
        tracing::warn!(
            style,
            "shortfall: broaden the root set or relax filters to reach the requested count"
        );
    }
    if let Some(client) = &glm {
        let usage = client.token_usage();
        tracing::info!(
            input = usage.input,
            output = usage.output,
            total = usage.total,
            "token usage"
        );
    }

    Ok(())
}
