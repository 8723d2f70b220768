
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::{
    ConceptLinks, ConceptSource, ConceptStore, FieldRecord, GenreRecord, LanguageName, StoreError, StoreResult, WebString,
    WordEntry, WordRow,
};
use crate::core::models::{ConceptId, FieldId, GenreId, language_tag};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConceptRecord {
    pub id: ConceptId,
    pub word: String,
    #[serde(default)]
    pub parent: Option<ConceptId>,
    #[serde(default, alias = "synonyms")]
    pub synonym_group: Option<ConceptId>,
    #[serde(default)]
    pub field: Option<FieldId>,
    #[serde(default)]
    pub genre: Option<GenreId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub locality: String,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationRecord {
    pub word: String,
    #[serde(alias = "english_id")]
    pub concept: ConceptId,
    #[serde(default)]
    pub genre: Option<GenreId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub locality: String,
}


/// Full dictionary content as imported in one piece.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub hub_language: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub language_names: Vec<LanguageName>,
    pub concepts: Vec<ConceptRecord>,
    #[serde(default)]
    pub translations: BTreeMap<String, Vec<TranslationRecord>>,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub genres: Vec<GenreRecord>,
    #[serde(default)]
    pub web_strings: Vec<WebString>,
}

impl Dataset {
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Structural checks an import must pass before it replaces live data.
    pub fn validate(&self) -> StoreResult<()> {
        let invalid = |msg: String| Err(StoreError::Validation(msg));

        let languages: Vec<String> = self.languages.iter().map(|l| l.to_lowercase()).collect();
        let hub = self.hub_language.to_lowercase();
        if !languages.contains(&hub) {
            return invalid(format!("hub language {} is not in the language list", hub));
        }

        let mut tags = HashSet::new();
        for lang in &languages {
            if !tags.insert(language_tag(lang)) {
                return invalid(format!("language key {} is not unique", language_tag(lang)));
            }
        }

        let known: HashSet<&str> = languages.iter().map(String::as_str).collect();
        let mut named = HashSet::new();
        for row in &self.language_names {
            let (of, within) = (row.language.to_lowercase(), row.in_language.to_lowercase());
            if !known.contains(of.as_str()) || !known.contains(within.as_str()) {
                return invalid(format!("language name row {}/{} names an unknown language", of, within));
            }
            named.insert((of, within));
        }
        for of in &languages {
            for within in &languages {
                if !named.contains(&(of.clone(), within.clone())) {
                    return invalid(format!("missing name of {} in {}", of, within));
                }
            }
        }

        let field_ids = labelled_ids(&languages, self.fields.iter().map(|f| (f.id, f.language.as_str())), "field")?;
        let genre_ids = labelled_ids(&languages, self.genres.iter().map(|g| (g.id, g.language.as_str())), "genre")?;

        let mut concept_ids = HashSet::new();
        for concept in &self.concepts {
            if !concept_ids.insert(concept.id) {
                return invalid(format!("duplicate concept id {}", concept.id));
            }
        }
        for concept in &self.concepts {
            for (kind, target) in [("parent", concept.parent), ("synonyms", concept.synonym_group)] {
                if let Some(target) = target {
                    if !concept_ids.contains(&target) {
                        return invalid(format!("concept {} has unknown {} {}", concept.id, kind, target));
                    }
                }
            }
            if let Some(field) = concept.field {
                if !field_ids.contains(&field) {
                    return invalid(format!("concept {} has unknown field {}", concept.id, field));
                }
            }
            if let Some(genre) = concept.genre {
                if !genre_ids.contains(&genre) {
                    return invalid(format!("concept {} has unknown genre {}", concept.id, genre));
                }
            }
        }

        for lang in &languages {
            if *lang == hub {
                continue;
            }
            if !self.translations.keys().any(|k| k.to_lowercase() == *lang) {
                return invalid(format!("missing table for {}", lang));
            }
        }
        for (lang, rows) in &self.translations {
            let lang = lang.to_lowercase();
            if lang == hub || !known.contains(lang.as_str()) {
                return invalid(format!("unexpected table {}", lang));
            }
            for row in rows {
                if !concept_ids.contains(&row.concept) {
                    return invalid(format!("{} word {} has unknown concept {}", lang, row.word, row.concept));
                }
                if let Some(genre) = row.genre {
                    if !genre_ids.contains(&genre) {
                        return invalid(format!("{} word {} has unknown genre {}", lang, row.word, genre));
                    }
                }
            }
        }

        Ok(())
    }
}

// Every label table needs one row per language for each id.
fn labelled_ids<'a>(
    languages: &[String],
    rows: impl Iterator<Item = (i64, &'a str)>,
    table: &str,
) -> StoreResult<HashSet<i64>> {
    let mut seen: HashMap<i64, HashSet<String>> = HashMap::new();
    for (id, lang) in rows {
        let lang = lang.to_lowercase();
        if !languages.contains(&lang) {
            return Err(StoreError::Validation(format!("{} {} labelled in unknown language {}", table, id, lang)));
        }
        seen.entry(id).or_default().insert(lang);
    }
    for (id, langs) in &seen {
        if langs.len() != languages.len() {
            return Err(StoreError::Validation(format!(
                "{} {} is not labelled in every language",
                table, id
            )));
        }
    }
    Ok(seen.into_keys().collect())
}


struct Tables {
    hub: String,
    languages: Vec<String>,
    concepts: BTreeMap<ConceptId, ConceptRecord>,
    children: HashMap<ConceptId, Vec<ConceptId>>,
    synonym_members: HashMap<ConceptId, Vec<ConceptId>>,
    rows: HashMap<String, Vec<WordRow>>,
    language_names: Vec<LanguageName>,
    fields: Vec<FieldRecord>,
    genres: Vec<GenreRecord>,
    web_strings: Vec<WebString>,
}

impl Tables {
    fn index(dataset: Dataset) -> Self {
        let hub = dataset.hub_language.to_lowercase();
        let mut children: HashMap<ConceptId, Vec<ConceptId>> = HashMap::new();
        let mut synonym_members: HashMap<ConceptId, Vec<ConceptId>> = HashMap::new();
        let mut hub_rows = Vec::with_capacity(dataset.concepts.len());

        for concept in &dataset.concepts {
            if let Some(parent) = concept.parent {
                children.entry(parent).or_default().push(concept.id);
            }
            if let Some(group) = concept.synonym_group {
                synonym_members.entry(group).or_default().push(concept.id);
            }
            hub_rows.push(WordRow {
                word: concept.word.clone(),
                concept: concept.id,
                description: concept.description.clone(),
                definition: concept.definition.clone(),
                locality: concept.locality.clone(),
                genre: concept.genre,
            });
        }

        let mut rows: HashMap<String, Vec<WordRow>> = dataset
            .translations
            .into_iter()
            .map(|(lang, records)| {
                let rows = records
                    .into_iter()
                    .map(|r| WordRow {
                        word: r.word,
                        concept: r.concept,
                        description: r.description,
                        definition: r.definition,
                        locality: r.locality,
                        genre: r.genre,
                    })
                    .collect();
                (lang.to_lowercase(), rows)
            })
            .collect();
        rows.insert(hub.clone(), hub_rows);

        Self {
            hub,
            languages: dataset.languages.iter().map(|l| l.to_lowercase()).collect(),
            concepts: dataset.concepts.into_iter().map(|c| (c.id, c)).collect(),
            children,
            synonym_members,
            rows,
            language_names: dataset.language_names,
            fields: dataset.fields,
            genres: dataset.genres,
            web_strings: dataset.web_strings,
        }
    }

    fn rows(&self, language: &str) -> StoreResult<&[WordRow]> {
        self.rows
            .get(&language.to_lowercase())
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::Query(format!("no table for language {}", language)))
    }
}


/// One immutable generation of dictionary data, held entirely in memory.
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> StoreResult<Self> {
        dataset.validate()?;
        Ok(Self {
            tables: Tables::index(dataset),
        })
    }
}

#[async_trait]
impl ConceptStore for MemoryStore {
    async fn list_languages(&self) -> StoreResult<Vec<String>> {
        Ok(self.tables.languages.clone())
    }

    async fn hub_language(&self) -> StoreResult<String> {
        Ok(self.tables.hub.clone())
    }

    async fn lookup_word(&self, language: &str, text: &str) -> StoreResult<Vec<WordRow>> {
        let tables = &self.tables;
        Ok(tables.rows(language)?.iter().filter(|r| r.word == text).cloned().collect())
    }

    async fn resolve_concept(&self, id: ConceptId) -> StoreResult<Option<ConceptLinks>> {
        Ok(self.tables.concepts.get(&id).map(|c| ConceptLinks {
            id: c.id,
            parent: c.parent,
            synonym_group: c.synonym_group,
            field: c.field,
            genre: c.genre,
        }))
    }

    async fn concepts_with_parent(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
        Ok(self.tables.children.get(&id).cloned().unwrap_or_default())
    }

    async fn concepts_with_synonym_group(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
        Ok(self.tables.synonym_members.get(&id).cloned().unwrap_or_default())
    }

    async fn words_for_concepts(&self, language: &str, ids: &[ConceptId]) -> StoreResult<Vec<WordRow>> {
        let tables = &self.tables;
        let wanted: HashSet<ConceptId> = ids.iter().copied().collect();
        Ok(tables
            .rows(language)?
            .iter()
            .filter(|r| wanted.contains(&r.concept))
            .cloned()
            .collect())
    }

    async fn list_words(&self, language: &str) -> StoreResult<Vec<WordEntry>> {
        let tables = &self.tables;
        Ok(tables
            .rows(language)?
            .iter()
            .map(|r| WordEntry {
                word: r.word.clone(),
                concept: r.concept,
            })
            .collect())
    }

    async fn concept_graph(&self) -> StoreResult<Vec<ConceptLinks>> {
        Ok(self
            .tables
            .concepts
            .values()
            .map(|c| ConceptLinks {
                id: c.id,
                parent: c.parent,
                synonym_group: c.synonym_group,
                field: c.field,
                genre: c.genre,
            })
            .collect())
    }

    async fn list_language_names(&self) -> StoreResult<Vec<LanguageName>> {
        Ok(self.tables.language_names.clone())
    }

    async fn list_fields(&self) -> StoreResult<Vec<FieldRecord>> {
        Ok(self.tables.fields.clone())
    }

    async fn list_genres(&self) -> StoreResult<Vec<GenreRecord>> {
        Ok(self.tables.genres.clone())
    }

    async fn list_web_strings(&self) -> StoreResult<Vec<WebString>> {
        Ok(self.tables.web_strings.clone())
    }
}


/// Loads memory generations from a staged dataset or, failing that, the dataset file.
pub struct MemorySource {
    path: Option<PathBuf>,
    staged: Mutex<Option<Dataset>>,
    latest: Mutex<Option<Arc<MemoryStore>>>,
}

impl MemorySource {
    /// Source without a file; `dataset` is served by the first load.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            path: None,
            staged: Mutex::new(Some(dataset)),
            latest: Mutex::new(None),
        }
    }

    pub fn open(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            staged: Mutex::new(None),
            latest: Mutex::new(None),
        }
    }

    /// Queues a dataset for the next load, taking precedence over the file for that load.
    pub fn stage(&self, dataset: Dataset) {
        *self.staged.lock() = Some(dataset);
    }
}

#[async_trait]
impl ConceptSource for MemorySource {
    async fn load(&self) -> StoreResult<Arc<dyn ConceptStore>> {
        let staged = self.staged.lock().take();
        let dataset = match (staged, &self.path) {
            (Some(dataset), _) => dataset,
            (None, Some(path)) => {
                debug!("Reading dataset from {}", path.display());
                Dataset::from_path(path)?
            }
            (None, None) => {
                debug!("No staged dataset or source file, reusing the latest generation");
                let latest = self.latest.lock().clone();
                return match latest {
                    Some(store) => Ok(store as Arc<dyn ConceptStore>),
                    None => Err(StoreError::Validation("no dataset to load".to_string())),
                };
            }
        };

        let store = match MemoryStore::new(dataset) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Rejected dataset: {}", e);
                return Err(e);
            }
        };
        info!(
            "Loaded {} concepts across {} languages",
            store.tables.concepts.len(),
            store.tables.languages.len()
        );
        *self.latest.lock() = Some(Arc::clone(&store));
        Ok(store as Arc<dyn ConceptStore>)
    }
}


#[cfg(test)]
pub mod fixtures {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    pub const LANGUAGES: [&str; 3] = ["english", "french", "italian"];

    fn concept(id: ConceptId, word: &str, parent: Option<ConceptId>, synonym_group: Option<ConceptId>) -> ConceptRecord {
        ConceptRecord {
            id,
            word: word.into(),
            parent,
            synonym_group,
            field: None,
            genre: None,
            description: String::new(),
            definition: String::new(),
            locality: String::new(),
        }
    }

    pub fn row(word: &str, concept: ConceptId) -> TranslationRecord {
        TranslationRecord {
            word: word.into(),
            concept,
            genre: None,
            description: String::new(),
            definition: String::new(),
            locality: String::new(),
        }
    }

    fn names() -> Vec<LanguageName> {
        let table = [
            ("english", "english", "english"),
            ("english", "french", "anglais"),
            ("english", "italian", "inglese"),
            ("french", "english", "french"),
            ("french", "french", "français"),
            ("french", "italian", "francese"),
            ("italian", "english", "italian"),
            ("italian", "french", "italien"),
            ("italian", "italian", "italiano"),
        ];
        table
            .iter()
            .map(|(of, within, name)| LanguageName {
                language: of.to_string(),
                in_language: within.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    fn labels<T>(rows: &[(i64, &str, &str, &str)], make: impl Fn(i64, &str, &str, &str) -> T) -> Vec<T> {
        rows.iter().map(|(id, lang, label, desc)| make(*id, lang, label, desc)).collect()
    }

    /// English hub with a two-concept synonym group (flower/blossom), a three-concept
    /// synonym cycle (sofa/couch/settee), a parent link (kitten -> cat) and an
    /// untranslated concept (orphan).
    pub fn dataset() -> Dataset {
        let mut flower = concept(10, "flower", None, Some(7));
        flower.field = Some(1);
        flower.genre = Some(1);
        flower.description = "reproductive part of a plant".into();
        let mut cat = concept(20, "cat", None, None);
        cat.field = Some(2);

        let concepts = vec![
            concept(7, "blossom", None, None),
            flower,
            cat,
            concept(21, "kitten", Some(20), None),
            concept(30, "angel", None, None),
            concept(31, "angle", None, None),
            concept(40, "orphan", None, None),
            concept(50, "swan neck", None, None),
            concept(60, "ice cream", None, None),
            concept(70, "sofa", None, Some(71)),
            concept(71, "couch", None, Some(72)),
            concept(72, "settee", None, Some(70)),
            concept(80, "eel", None, None),
        ];

        let mut fleur = row("fleur", 10);
        fleur.genre = Some(1);
        let french = vec![
            fleur,
            row("fleur", 7),
            row("chat", 20),
            row("chaton", 21),
            row("ange", 30),
            row("angle", 31),
            row("anguille", 80),
            row("col de cygne", 50),
            row("crème glacée", 60),
            row("canapé", 70),
        ];
        let italian = vec![
            row("fiore", 10),
            row("gatto", 20),
            row("angelo", 30),
            row("angolo", 31),
            row("anguilla", 80),
            row("gelato", 60),
            row("divano", 71),
        ];

        let fields = labels(
            &[
                (1, "english", "botany", "study of plants"),
                (1, "french", "botanique", "étude des plantes"),
                (1, "italian", "botanica", "studio delle piante"),
                (2, "english", "zoology", "study of animals"),
                (2, "french", "zoologie", "étude des animaux"),
                (2, "italian", "zoologia", "studio degli animali"),
            ],
            |id, lang, label, desc| FieldRecord {
                id,
                language: lang.into(),
                label: label.into(),
                description: desc.into(),
            },
        );
        let genres = labels(
            &[(1, "english", "noun", ""), (1, "french", "nom", ""), (1, "italian", "nome", "")],
            |id, lang, label, _| GenreRecord {
                id,
                language: lang.into(),
                label: label.into(),
            },
        );
        let web_strings = vec![
            WebString { language: "english".into(), key: "title".into(), value: "Dictionary".into() },
            WebString { language: "french".into(), key: "title".into(), value: "Dictionnaire".into() },
            WebString { language: "italian".into(), key: "title".into(), value: String::new() },
        ];

        Dataset {
            hub_language: "english".into(),
            languages: LANGUAGES.iter().map(|l| l.to_string()).collect(),
            language_names: names(),
            concepts,
            translations: BTreeMap::from([("french".to_string(), french), ("italian".to_string(), italian)]),
            fields,
            genres,
            web_strings,
        }
    }

    /// Store generation that can be switched to fail, or made to stall word lookups.
    pub struct ControlledStore {
        pub inner: Arc<dyn ConceptStore>,
        pub failing: Arc<AtomicBool>,
        pub fields_failing: bool,
        pub lookup_delay: Option<Duration>,
    }

    impl ControlledStore {
        pub fn new(inner: Arc<dyn ConceptStore>) -> Self {
            Self {
                inner,
                failing: Arc::new(AtomicBool::new(false)),
                fields_failing: false,
                lookup_delay: None,
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::Connection("store offline".into()))
            } else {
                Ok(())
            }
        }
    }

    /// Memory source whose generations share one failure switch. Loads can be
    /// slowed down, and a single generation can be handed out with a broken field table.
    pub struct ControlledSource {
        pub inner: MemorySource,
        failing: Arc<AtomicBool>,
        fields_failing_next: AtomicBool,
        lookup_delay: Option<Duration>,
        load_delay: Option<Duration>,
    }

    impl ControlledSource {
        pub fn new(dataset: Dataset) -> Self {
            Self {
                inner: MemorySource::new(dataset),
                failing: Arc::new(AtomicBool::new(false)),
                fields_failing_next: AtomicBool::new(false),
                lookup_delay: None,
                load_delay: None,
            }
        }

        pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
            self.lookup_delay = Some(delay);
            self
        }

        pub fn with_load_delay(mut self, delay: Duration) -> Self {
            self.load_delay = Some(delay);
            self
        }

        pub fn stage(&self, dataset: Dataset) {
            self.inner.stage(dataset);
        }

        /// Fails loads and every query of every generation while set.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// The next generation loads fine but cannot list its fields.
        pub fn break_next_field_table(&self) {
            self.fields_failing_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ConceptSource for ControlledSource {
        async fn load(&self) -> StoreResult<Arc<dyn ConceptStore>> {
            if let Some(delay) = self.load_delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Connection("store offline".into()));
            }
            let generation = ControlledStore {
                inner: self.inner.load().await?,
                failing: Arc::clone(&self.failing),
                fields_failing: self.fields_failing_next.swap(false, Ordering::SeqCst),
                lookup_delay: self.lookup_delay,
            };
            Ok(Arc::new(generation) as Arc<dyn ConceptStore>)
        }
    }

    #[async_trait]
    impl ConceptStore for ControlledStore {
        async fn list_languages(&self) -> StoreResult<Vec<String>> {
            self.check()?;
            self.inner.list_languages().await
        }

        async fn hub_language(&self) -> StoreResult<String> {
            self.check()?;
            self.inner.hub_language().await
        }

        async fn lookup_word(&self, language: &str, text: &str) -> StoreResult<Vec<WordRow>> {
            if let Some(delay) = self.lookup_delay {
                tokio::time::sleep(delay).await;
            }
            self.check()?;
            self.inner.lookup_word(language, text).await
        }

        async fn resolve_concept(&self, id: ConceptId) -> StoreResult<Option<ConceptLinks>> {
            self.check()?;
            self.inner.resolve_concept(id).await
        }

        async fn concepts_with_parent(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
            self.check()?;
            self.inner.concepts_with_parent(id).await
        }

        async fn concepts_with_synonym_group(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
            self.check()?;
            self.inner.concepts_with_synonym_group(id).await
        }

        async fn words_for_concepts(&self, language: &str, ids: &[ConceptId]) -> StoreResult<Vec<WordRow>> {
            self.check()?;
            self.inner.words_for_concepts(language, ids).await
        }

        async fn list_words(&self, language: &str) -> StoreResult<Vec<WordEntry>> {
            self.check()?;
            self.inner.list_words(language).await
        }

        async fn concept_graph(&self) -> StoreResult<Vec<ConceptLinks>> {
            self.check()?;
            self.inner.concept_graph().await
        }

        async fn list_language_names(&self) -> StoreResult<Vec<LanguageName>> {
            self.check()?;
            self.inner.list_language_names().await
        }

        async fn list_fields(&self) -> StoreResult<Vec<FieldRecord>> {
            self.check()?;
            if self.fields_failing {
                return Err(StoreError::Query("field table unreadable".into()));
            }
            self.inner.list_fields().await
        }

        async fn list_genres(&self) -> StoreResult<Vec<GenreRecord>> {
            self.check()?;
            self.inner.list_genres().await
        }

        async fn list_web_strings(&self) -> StoreResult<Vec<WebString>> {
            self.check()?;
            self.inner.list_web_strings().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fixture_is_valid() {
        assert!(fixtures::dataset().validate().is_ok());
    }

    #[test]
    fn test_rejects_dangling_synonym() {
        let mut dataset = fixtures::dataset();
        dataset.concepts[0].synonym_group = Some(999);
        assert!(matches!(dataset.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_rejects_unknown_concept_in_translation() {
        let mut dataset = fixtures::dataset();
        dataset.translations.get_mut("french").unwrap().push(fixtures::row("fantôme", 404));
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_rejects_incomplete_name_matrix() {
        let mut dataset = fixtures::dataset();
        dataset.language_names.pop();
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_table() {
        let mut dataset = fixtures::dataset();
        dataset.translations.remove("italian");
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_rejects_partially_labelled_field() {
        let mut dataset = fixtures::dataset();
        dataset.fields.retain(|f| !(f.id == 2 && f.language == "italian"));
        assert!(dataset.validate().is_err());
    }

    #[tokio::test]
    async fn test_hub_rows_come_from_concepts() {
        let store = MemoryStore::new(fixtures::dataset()).unwrap();
        let hits = store.lookup_word("english", "flower").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].concept, 10);
        assert_eq!(hits[0].genre, Some(1));

        let members = store.concepts_with_synonym_group(7).await.unwrap();
        assert_eq!(members, vec![10]);
        assert_eq!(store.concepts_with_parent(20).await.unwrap(), vec![21]);
    }

    #[tokio::test]
    async fn test_unknown_table_is_query_error() {
        let store = MemoryStore::new(fixtures::dataset()).unwrap();
        assert!(matches!(
            store.lookup_word("klingon", "qapla").await,
            Err(StoreError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_load_keeps_earlier_generation() {
        let source = MemorySource::new(fixtures::dataset());
        let live = source.load().await.unwrap();

        let mut broken = fixtures::dataset();
        broken.hub_language = "german".into();
        source.stage(broken);

        assert!(matches!(source.load().await, Err(StoreError::Validation(_))));
        assert_eq!(live.hub_language().await.unwrap(), "english");
    }

    #[tokio::test]
    async fn test_generations_are_independent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&fixtures::dataset()).unwrap()).unwrap();
        let source = MemorySource::open(file.path());
        let first = source.load().await.unwrap();

        let mut smaller = fixtures::dataset();
        smaller.concepts.retain(|c| c.id != 40);
        std::fs::write(file.path(), serde_json::to_string(&smaller).unwrap()).unwrap();

        let second = source.load().await.unwrap();
        assert!(second.resolve_concept(40).await.unwrap().is_none());
        assert!(second.resolve_concept(10).await.unwrap().is_some());
        assert!(first.resolve_concept(40).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_source_without_file_reuses_latest_generation() {
        let source = MemorySource::new(fixtures::dataset());
        let first = source.load().await.unwrap();
        let again = source.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let empty = MemorySource::open(Path::new("/nonexistent/hubdict.json"));
        assert!(matches!(empty.load().await, Err(StoreError::Io(_))));
    }
}
