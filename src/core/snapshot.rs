

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info};

use super::cache::{PairCache, PairView};
use super::error::Result;
use super::languages::{LanguageNames, LanguageSet};
use super::models::{FieldId, FieldLabel, GenreId, LanguageId};
use crate::db::{ConceptStore, StoreResult};
use crate::toolkit::lexicon::{ClosureResolver, PairProjector};


#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub version: u64,
    pub built_at: DateTime<Utc>,
    pub languages: usize,
    pub hub: String,
}


/// Everything search traffic reads, built as a whole and replaced as a whole.
/// The store generation it was built from travels with it, so lookups and
/// pair fills always read the same data as the labels and caches.
pub struct Snapshot {
    store: Arc<dyn ConceptStore>,
    version: u64,
    built_at: DateTime<Utc>,
    languages: LanguageSet,
    names: LanguageNames,
    fields: HashMap<(FieldId, LanguageId), FieldLabel>,
    genres: HashMap<(GenreId, LanguageId), String>,
    web_strings: HashMap<(LanguageId, String), String>,
    pairs: PairCache,
}

impl Snapshot {
    pub async fn build(
        store: Arc<dyn ConceptStore>,
        resolver: &ClosureResolver,
        version: u64,
        warm: bool,
    ) -> Result<Self> {
        info!("Building dictionary snapshot v{}", version);

        let (names, hub) = futures::try_join!(store.list_languages(), store.hub_language())?;
        let languages = LanguageSet::new(&names, &hub)?;

        let (name_rows, field_rows, genre_rows, web_rows) = futures::try_join!(
            store.list_language_names(),
            store.list_fields(),
            store.list_genres(),
            store.list_web_strings()
        )?;

        let fields = field_rows
            .into_iter()
            .filter_map(|f| {
                let lang = languages.resolve(&f.language).ok()?;
                Some(((f.id, lang), FieldLabel { label: f.label, description: f.description }))
            })
            .collect();
        let genres = genre_rows
            .into_iter()
            .filter_map(|g| Some(((g.id, languages.resolve(&g.language).ok()?), g.label)))
            .collect();
        let web_strings = web_rows
            .into_iter()
            .filter_map(|w| Some(((languages.resolve(&w.language).ok()?, w.key), w.value)))
            .collect();

        let snapshot = Self {
            store,
            version,
            built_at: Utc::now(),
            names: LanguageNames::new(&languages, &name_rows),
            pairs: PairCache::new(languages.len()),
            languages,
            fields,
            genres,
            web_strings,
        };

        if warm {
            snapshot.warm(resolver).await?;
        }
        Ok(snapshot)
    }

    /// Fills every pair, including each language with itself.
    pub async fn warm(&self, resolver: &ClosureResolver) -> StoreResult<()> {
        let ids: Vec<LanguageId> = self.languages.ids().collect();
        let pairs = ids
            .iter()
            .enumerate()
            .flat_map(|(i, a)| ids[..=i].iter().map(move |b| (*a, *b)));

        try_join_all(pairs.map(|(a, b)| self.compute_pair(resolver, a, b))).await?;
        info!("Warmed {} language pairs", self.pairs.stats().filled);
        Ok(())
    }

    async fn compute_pair(&self, resolver: &ClosureResolver, a: LanguageId, b: LanguageId) -> StoreResult<PairView> {
        let (first, second) = PairProjector::new(self.store.as_ref(), resolver)
            .project(self.languages.get(a), self.languages.get(b))
            .await?;
        debug!(
            "Cached pair {}/{}: {}/{} words",
            self.languages.get(a).tag,
            self.languages.get(b).tag,
            first.len(),
            second.len()
        );
        Ok(self.pairs.insert(a, b, first, second))
    }

    /// Cached word lists for a pair; a miss is computed and stored, a store failure stores nothing.
    pub async fn pair_words(&self, resolver: &ClosureResolver, a: LanguageId, b: LanguageId) -> StoreResult<PairView> {
        match self.pairs.get(a, b) {
            Some(view) => Ok(view),
            None => self.compute_pair(resolver, a, b).await,
        }
    }

    pub fn store(&self) -> &dyn ConceptStore {
        self.store.as_ref()
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    pub fn names(&self) -> &LanguageNames {
        &self.names
    }

    pub fn pairs(&self) -> &PairCache {
        &self.pairs
    }

    pub fn field_label(&self, field: FieldId, display: LanguageId) -> Option<&FieldLabel> {
        self.fields.get(&(field, display))
    }

    pub fn genre_label(&self, genre: GenreId, display: LanguageId) -> Option<&str> {
        self.genres.get(&(genre, display)).map(String::as_str)
    }

    /// UI string in `display`, falling back to the hub language when blank or missing.
    pub fn web_string(&self, display: LanguageId, key: &str) -> Option<&str> {
        let lookup = |lang: LanguageId| {
            self.web_strings
                .get(&(lang, key.to_string()))
                .map(String::as_str)
                .filter(|v| !v.is_empty())
        };
        lookup(display).or_else(|| lookup(self.languages.hub()))
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            version: self.version,
            built_at: self.built_at,
            languages: self.languages.len(),
            hub: self.languages.get(self.languages.hub()).language.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::db::memory::fixtures;

    async fn build(warm: bool) -> Snapshot {
        let store = Arc::new(MemoryStore::new(fixtures::dataset()).unwrap());
        Snapshot::build(store, &ClosureResolver::default(), 1, warm)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_eager_build_fills_every_pair() {
        let snapshot = build(true).await;
        let stats = snapshot.pairs().stats();
        assert_eq!(stats.capacity, 6);
        assert_eq!(stats.filled, 6);
    }

    #[tokio::test]
    async fn test_lazy_fill_on_miss() {
        let snapshot = build(false).await;
        assert_eq!(snapshot.pairs().stats().filled, 0);

        let fre = snapshot.languages().resolve("fre").unwrap();
        let ita = snapshot.languages().resolve("ita").unwrap();
        let resolver = ClosureResolver::default();
        let view = snapshot.pair_words(&resolver, fre, ita).await.unwrap();
        assert!(view.first().iter().any(|w| w.word == "fleur"));
        assert!(view.second().iter().any(|w| w.word == "fiore"));
        assert_eq!(snapshot.pairs().stats().filled, 1);

        let again = snapshot.pair_words(&resolver, ita, fre).await.unwrap();
        assert!(again.first().iter().all(|w| w.lang_tag == "ita"));
        assert_eq!(snapshot.pairs().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_labels_and_web_strings() {
        let snapshot = build(false).await;
        let langs = snapshot.languages();
        let fre = langs.resolve("fre").unwrap();
        let ita = langs.resolve("ita").unwrap();

        assert_eq!(snapshot.field_label(1, fre).unwrap().label, "botanique");
        assert_eq!(snapshot.genre_label(1, ita), Some("nome"));
        assert_eq!(snapshot.web_string(fre, "title"), Some("Dictionnaire"));
        assert_eq!(snapshot.web_string(ita, "title"), Some("Dictionary"));
        assert_eq!(snapshot.web_string(fre, "missing"), None);
    }

    #[tokio::test]
    async fn test_info() {
        let snapshot = build(false).await;
        let info = snapshot.info();
        assert_eq!(info.version, 1);
        assert_eq!(info.languages, 3);
        assert_eq!(info.hub, "english");
    }
}
