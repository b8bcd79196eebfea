//! Demo environment wiring.
//!
//! The real deployment points these handles at the hosted backend; the
//! CLI ships with the deterministic in-memory backend so every command
//! and the dashboard run self-contained. The construction boundary is
//! explicit: build [`DemoEnv`] once at process start and pass its
//! [`Services`] handle down — nothing reaches for a global client.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use leadlane_core::config::{ProjectConfig, load_config};
use leadlane_core::feed::ChangeFeed;
use leadlane_core::model::NewLead;
use leadlane_core::remote::{LeadBackend as _, Services};
use leadlane_core::store::LeadStore;
use leadlane_sim::{DeterministicRng, MemoryBackend};

/// Global demo knobs taken from the top-level CLI flags.
#[derive(Debug, Clone)]
pub struct DemoOpts {
    /// RNG seed for the sample data.
    pub seed: u64,
    /// Override for `[demo].seed_leads`.
    pub seed_count: Option<usize>,
    /// JSON file with draft leads (wire field names) loaded on top of the
    /// generated sample.
    pub seed_file: Option<PathBuf>,
    /// Explicit config path.
    pub config: Option<PathBuf>,
}

/// One process-wide environment: config, backend, and the service handle.
#[derive(Debug)]
pub struct DemoEnv {
    pub config: ProjectConfig,
    pub backend: Arc<MemoryBackend>,
    pub services: Services,
}

/// A connected client: subscription plus initial snapshot.
pub struct Client {
    pub store: LeadStore,
    pub feed: ChangeFeed,
}

impl DemoEnv {
    /// Build the environment: load config, seed the backend, wrap the
    /// service handles.
    pub fn bootstrap(opts: &DemoOpts) -> Result<Self> {
        let config = load_config(opts.config.as_deref())?;
        let count = opts.seed_count.unwrap_or(config.demo.seed_leads);
        let mut rng = DeterministicRng::new(opts.seed);
        let backend = Arc::new(MemoryBackend::seeded(count, &mut rng));

        if let Some(path) = &opts.seed_file {
            load_seed_file(&backend, path)?;
        }
        info!(leads = backend.len(), "demo backend ready");

        let services = Services::new(backend.clone(), backend.clone(), backend.clone());
        Ok(Self {
            config,
            backend,
            services,
        })
    }

    /// Subscribe to the change feed, then fetch the initial snapshot —
    /// the startup order the merge policy makes race-safe.
    pub fn connect(&self) -> Result<Client> {
        let feed = ChangeFeed::new(self.services.leads.subscribe());
        let mut store = LeadStore::new();
        let rows = self
            .services
            .leads
            .query_all()
            .context("initial lead fetch")?;
        store.load_snapshot(rows);
        Ok(Client { store, feed })
    }
}

/// Load extra draft leads from a JSON file using the wire field names.
fn load_seed_file(backend: &MemoryBackend, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let drafts: Vec<NewLead> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    for draft in drafts {
        backend
            .insert(draft)
            .with_context(|| format!("inserting seed lead from {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> DemoOpts {
        DemoOpts {
            seed: 2026,
            seed_count: Some(5),
            seed_file: None,
            config: None,
        }
    }

    #[test]
    fn bootstrap_and_connect() {
        let env = DemoEnv::bootstrap(&opts()).expect("bootstrap");
        assert_eq!(env.backend.len(), 5);
        let client = env.connect().expect("connect");
        assert_eq!(client.store.snapshot().len(), 5);
    }

    #[test]
    fn seed_file_rows_are_appended() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("extra.json");
        std::fs::write(
            &path,
            r#"[{"nombre": "Hugo", "telefono": "5511", "vehiculo_interes": "Rav4"}]"#,
        )
        .expect("write seed");

        let env = DemoEnv::bootstrap(&DemoOpts {
            seed_file: Some(path),
            ..opts()
        })
        .expect("bootstrap");
        assert_eq!(env.backend.len(), 6);
    }

    #[test]
    fn malformed_seed_file_is_a_context_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").expect("write seed");

        let err = DemoEnv::bootstrap(&DemoOpts {
            seed_file: Some(path),
            ..opts()
        })
        .unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
