

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cache::CacheStats;
use super::config::{DictionaryConfig, StoreBackend};
use super::error::{DictionaryError, Result};
use super::models::{FieldLabel, Language, LanguageId, SimpleWord, Word};
use super::snapshot::{Snapshot, SnapshotInfo};
use crate::db::{ConceptSource, HelixClient, HelixStore, MemorySource};
use crate::toolkit::lexicon::ClosureResolver;
use crate::toolkit::search::{SearchEngine, words_with_term};


#[derive(Debug, Clone, Serialize)]
pub struct Lookup {
    pub results: Vec<Word>,
    /// True when the word was found only with the two languages swapped.
    pub reversed: bool,
}


/// Entry point for search traffic and administrative reloads.
///
/// Each request works on the snapshot that was current when it started. `reset_all`
/// loads and builds the next snapshot without blocking anyone and then swaps it in,
/// so a request never mixes two generations and a failed reset changes nothing.
pub struct Dictionary {
    source: Arc<dyn ConceptSource>,
    resolver: ClosureResolver,
    config: DictionaryConfig,
    current: RwLock<Arc<Snapshot>>,
    resetting: Mutex<()>,
}

impl Dictionary {
    pub async fn open(source: Arc<dyn ConceptSource>, config: DictionaryConfig) -> Result<Self> {
        let resolver = ClosureResolver::new(config.follow_parent_links);
        let store = source.load().await?;
        let snapshot = Snapshot::build(store, &resolver, 1, config.eager_warmup).await?;
        info!(
            "Dictionary ready: {} languages, hub {}",
            snapshot.languages().len(),
            snapshot.info().hub
        );

        Ok(Self {
            source,
            resolver,
            config,
            current: RwLock::new(Arc::new(snapshot)),
            resetting: Mutex::new(()),
        })
    }

    pub async fn from_config(config: DictionaryConfig) -> Result<Self> {
        let source: Arc<dyn ConceptSource> = match config.store_backend {
            StoreBackend::Memory => {
                let path = config.dataset_path.as_deref().ok_or_else(|| {
                    DictionaryError::Config("dataset_path is required for the memory backend".to_string())
                })?;
                info!("Using dataset file {}", path.display());
                Arc::new(MemorySource::open(path))
            }
            StoreBackend::Helix => {
                info!("Using HelixDB store at {}", config.helix_url());
                Arc::new(HelixStore::new(HelixClient::new(&config.helix_host, config.helix_port)))
            }
        };
        Self::open(source, config).await
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    fn display(&self, snapshot: &Snapshot, key: Option<&str>) -> LanguageId {
        snapshot
            .languages()
            .display_language(key.or(Some(self.config.hub_language.as_str())))
    }

    pub async fn search(&self, word: &str, from: &str, to: &str, display: Option<&str>) -> Result<Vec<Word>> {
        let snapshot = self.snapshot();
        let languages = snapshot.languages();
        let (from, to) = (languages.resolve(from)?, languages.resolve(to)?);
        let display = self.display(&snapshot, display);

        SearchEngine::new(&snapshot, &self.resolver)
            .search(word, from, to, display)
            .await
    }

    /// Searches `from -> to`, and `to -> from` if the word is missing from `from`.
    /// Store failures are returned as they are.
    pub async fn search_either_way(&self, word: &str, from: &str, to: &str, display: Option<&str>) -> Result<Lookup> {
        let snapshot = self.snapshot();
        let languages = snapshot.languages();
        let (from, to) = (languages.resolve(from)?, languages.resolve(to)?);
        let display = self.display(&snapshot, display);
        let engine = SearchEngine::new(&snapshot, &self.resolver);

        match engine.search(word, from, to, display).await {
            Ok(results) => Ok(Lookup { results, reversed: false }),
            Err(e) if e.is_not_found() && from != to => {
                debug!("'{}' not in {}, trying the other direction", word, languages.get(from).language);
                let results = engine.search(word, to, from, display).await?;
                Ok(Lookup { results, reversed: true })
            }
            Err(e) => Err(e),
        }
    }

    /// Type-ahead candidates from the cached word lists of a pair.
    pub async fn words_with_term(&self, term: &str, a: &str, b: &str, preferred: Option<&str>) -> Result<Vec<SimpleWord>> {
        let snapshot = self.snapshot();
        let languages = snapshot.languages();
        let (a, b) = (languages.resolve(a)?, languages.resolve(b)?);
        let preferred = preferred.map(|p| match languages.resolve(p) {
            Ok(id) => languages.get(id).tag.clone(),
            Err(_) => p.to_string(),
        });

        let pair = snapshot.pair_words(&self.resolver, a, b).await?;
        Ok(words_with_term(&pair, term, preferred.as_deref(), self.config.autocomplete_limit))
    }

    /// Languages named in the display language, which comes first.
    pub async fn languages(&self, display: Option<&str>) -> Vec<Language> {
        let snapshot = self.snapshot();
        let display = self.display(&snapshot, display);
        snapshot.names().localized(snapshot.languages(), display)
    }

    /// Canonical languages for a six-character pair key such as `engfre`.
    pub async fn parse_pair_key(&self, key: &str) -> Result<(Language, Language)> {
        let snapshot = self.snapshot();
        let languages = snapshot.languages();
        let (a, b) = languages.parse_pair_key(key)?;
        Ok((languages.get(a).clone(), languages.get(b).clone()))
    }

    pub async fn web_string(&self, display: Option<&str>, key: &str) -> Option<String> {
        let snapshot = self.snapshot();
        let display = self.display(&snapshot, display);
        snapshot.web_string(display, key).map(str::to_string)
    }

    /// Loads a new store generation and publishes a snapshot built on it. On any
    /// failure the previous snapshot and its generation stay in place.
    pub async fn reset_all(&self) -> Result<SnapshotInfo> {
        let _resetting = self.resetting.lock().await;
        let live = self.snapshot().version();
        let version = live + 1;
        info!("Resetting dictionary (v{} -> v{})", live, version);

        let store = self.source.load().await.map_err(|e| {
            warn!("Store reload failed, keeping v{}: {}", live, e);
            DictionaryError::ReloadFailure(e.to_string())
        })?;

        let snapshot = Snapshot::build(store, &self.resolver, version, self.config.eager_warmup)
            .await
            .map_err(|e| {
                warn!("Snapshot rebuild failed, keeping v{}: {}", live, e);
                DictionaryError::ReloadFailure(e.to_string())
            })?;

        let info = snapshot.info();
        *self.current.write() = Arc::new(snapshot);
        info!("Dictionary v{} published", info.version);
        Ok(info)
    }

    /// Drops every cached pair of the current snapshot; pairs refill on demand.
    pub async fn invalidate_cache(&self) {
        let snapshot = self.snapshot();
        snapshot.pairs().invalidate_all();
        debug!("Pair cache invalidated for v{}", snapshot.version());
    }

    pub async fn snapshot_info(&self) -> SnapshotInfo {
        self.snapshot().info()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.snapshot().pairs().stats()
    }
}


/// Distinct non-empty topical fields over a result list, in first-seen order.
pub fn distinct_fields(results: &[Word]) -> Vec<FieldLabel> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|w| !w.field.is_empty())
        .filter(|w| seen.insert(w.field.as_str()))
        .map(|w| FieldLabel {
            label: w.field.clone(),
            description: w.field_description.clone(),
        })
        .collect()
}
