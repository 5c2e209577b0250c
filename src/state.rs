//! Application state: the current settings slot, its store, presets and randomness policy.
//!
//! This module owns:
//!   - the current `Settings` value (replaced wholesale on every edit, never mutated in place)
//!   - the settings store (TOML file or in-memory)
//!   - the preset catalog (built-ins plus config entries)
//!   - the optional fixed seed for reproducible worksheets

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::config::{self, load_app_config_from_env, AppConfig};
use crate::domain::Settings;
use crate::presets::{builtin_presets, Preset};
use crate::random::{RandomSource, SeededRandom, SystemRandom};
use crate::store::{MemoryStore, SettingsStore, TomlFileStore};
use crate::validation::validate_settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
    pub store: Arc<dyn SettingsStore>,
    pub presets: Arc<Vec<Preset>>,
    pub seed: Option<u64>,
}

impl AppState {
    /// Build state from env: load config, pick a store, restore saved settings, assemble presets.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env();

        let store: Arc<dyn SettingsStore> = match config::settings_path(cfg.as_ref()) {
            Some(path) => {
                let store = TomlFileStore::new(path);
                info!(target: "mathdrill_backend", path = %store.path().display(), "Using TOML settings store");
                Arc::new(store)
            }
            None => {
                info!(target: "mathdrill_backend", "No settings path configured; settings live in memory only");
                Arc::new(MemoryStore::default())
            }
        };

        let seed = config::seed(cfg.as_ref());
        if let Some(seed) = seed {
            warn!(target: "mathdrill_backend", seed, "Fixed seed configured; every generation replays the same draws");
        }

        Self::from_parts(cfg.unwrap_or_default(), store, seed)
    }

    /// Assemble state from already-loaded pieces.
    pub fn from_parts(cfg: AppConfig, store: Arc<dyn SettingsStore>, seed: Option<u64>) -> Self {
        let defaults = cfg.defaults.clone().unwrap_or_default();

        let current = match store.load() {
            Ok(Some(saved)) => {
                info!(target: "settings", "Restored saved settings");
                saved
            }
            Ok(None) => defaults,
            Err(e) => {
                error!(target: "settings", error = %e, "Failed to load saved settings; using defaults");
                defaults
            }
        };

        let presets = assemble_presets(cfg.presets);
        info!(target: "mathdrill_backend", presets = presets.len(), "Preset catalog ready");

        Self {
            settings: Arc::new(RwLock::new(current)),
            store,
            presets: Arc::new(presets),
            seed,
        }
    }

    /// Snapshot of the current settings value.
    pub async fn current_settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Swap in a new settings value and persist it. Persistence failures are logged, not returned:
    /// the in-memory value stays authoritative for this process.
    #[instrument(level = "debug", skip_all)]
    pub async fn replace_settings(&self, next: Settings) {
        let mut current = self.settings.write().await;
        self.persist(&next).await;
        *current = next;
    }

    /// Derive the next settings from the current ones and persist them, all under one write guard,
    /// so concurrent edits apply in turn instead of overwriting each other.
    #[instrument(level = "debug", skip_all)]
    pub async fn update_settings<E>(
        &self,
        edit: impl FnOnce(&Settings) -> Result<Settings, E> + Send,
    ) -> Result<Settings, E> {
        let mut current = self.settings.write().await;
        let next = edit(&current)?;
        self.persist(&next).await;
        *current = next.clone();
        Ok(next)
    }

    /// Store writes touch the filesystem, so they run on the blocking pool.
    async fn persist(&self, settings: &Settings) {
        let store = Arc::clone(&self.store);
        let snapshot = settings.clone();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(target: "settings", error = %e, "Failed to persist settings"),
            Err(e) => error!(target: "settings", error = %e, "Settings save task failed"),
        }
    }

    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// A fresh random source per generation call, so concurrent generations share nothing.
    pub fn random_source(&self) -> Box<dyn RandomSource + Send> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SystemRandom::new()),
        }
    }
}

/// Built-ins first; config entries with a new id and valid settings are appended.
fn assemble_presets(from_config: Vec<Preset>) -> Vec<Preset> {
    let mut presets = builtin_presets();
    for p in from_config {
        if presets.iter().any(|existing| existing.id == p.id) {
            warn!(target: "settings", id = %p.id, "Skipping config preset: id already in use");
            continue;
        }
        if let Err(e) = validate_settings(&p.settings) {
            error!(target: "settings", id = %p.id, error = %e, "Skipping config preset: invalid settings");
            continue;
        }
        presets.push(p);
    }
    presets
}
