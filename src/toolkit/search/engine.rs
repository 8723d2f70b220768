
use std::collections::HashSet;

use tracing::debug;

use super::ranking::sort_words;
use crate::core::error::{DictionaryError, Result};
use crate::core::models::{ConceptId, FieldLabel, GenreId, LanguageId, Word};
use crate::core::snapshot::Snapshot;
use crate::db::{ConceptStore, WordRow};
use crate::toolkit::lexicon::{ClosureResolver, StoreAdjacency};
use crate::utils::drop_last_char;


/// Exact-word lookup with synonyms and translations resolved through the concept graph.
pub struct SearchEngine<'a> {
    store: &'a dyn ConceptStore,
    resolver: &'a ClosureResolver,
    snapshot: &'a Snapshot,
}

impl<'a> SearchEngine<'a> {
    /// Searches the store generation `snapshot` was built from.
    pub fn new(snapshot: &'a Snapshot, resolver: &'a ClosureResolver) -> Self {
        Self {
            store: snapshot.store(),
            resolver,
            snapshot,
        }
    }

    /// Tries the word exactly as given, then once more without its last character.
    pub async fn search(&self, word: &str, from: LanguageId, to: LanguageId, display: LanguageId) -> Result<Vec<Word>> {
        let source = self.snapshot.languages().get(from);

        let mut candidates = vec![word];
        candidates.extend(drop_last_char(word));

        for (attempt, candidate) in candidates.into_iter().enumerate() {
            let rows = self.store.lookup_word(&source.language, candidate).await?;
            if rows.is_empty() {
                debug!("No {} row for '{}'", source.language, candidate);
                continue;
            }
            if attempt > 0 {
                debug!("Matched '{}' after truncating '{}'", candidate, word);
            }

            let mut results = Vec::with_capacity(rows.len());
            for row in &rows {
                results.push(self.resolve_row(candidate, row, from, to, display).await?);
            }
            sort_words(&mut results);
            return Ok(results);
        }

        Err(DictionaryError::not_found(word, &source.language))
    }

    async fn resolve_row(
        &self,
        text: &str,
        row: &WordRow,
        from: LanguageId,
        to: LanguageId,
        display: LanguageId,
    ) -> Result<Word> {
        let languages = self.snapshot.languages();
        let adjacency = StoreAdjacency::new(self.store, self.resolver);
        let closure: Vec<ConceptId> = self
            .resolver
            .closure(&adjacency, row.concept)
            .await?
            .into_iter()
            .collect();

        let (synonym_rows, translation_rows, links) = futures::try_join!(
            self.store.words_for_concepts(&languages.get(from).language, &closure),
            self.store.words_for_concepts(&languages.get(to).language, &closure),
            self.store.resolve_concept(row.concept)
        )?;

        let mut word = self.to_word(text, row, from, display);
        if let Some(label) = links.as_ref().and_then(|l| l.field).and_then(|f| self.snapshot.field_label(f, display)) {
            word.field = label.label.clone();
            word.field_description = label.description.clone();
        }
        if word.genre.is_empty() {
            word.genre = self.genre(links.as_ref().and_then(|l| l.genre), display);
        }

        word.synonyms = self.related(synonym_rows, from, display, Some(text));
        word.translations = self.related(translation_rows, to, display, (from == to).then_some(text));
        debug!(
            "'{}' (concept {}): {} synonyms, {} translations",
            text,
            row.concept,
            word.synonyms.len(),
            word.translations.len()
        );
        Ok(word)
    }

    fn to_word(&self, text: &str, row: &WordRow, lang: LanguageId, display: LanguageId) -> Word {
        let languages = self.snapshot.languages();
        let mut word = Word::new(text, self.snapshot.names().localize(languages, lang, display));
        word.description = row.description.clone();
        word.definition = row.definition.clone();
        word.locality = row.locality.clone();
        word.genre = self.genre(row.genre, display);
        word
    }

    fn related(&self, rows: Vec<WordRow>, lang: LanguageId, display: LanguageId, excluded: Option<&str>) -> Vec<Word> {
        let mut seen = HashSet::new();
        let mut words: Vec<Word> = rows
            .iter()
            .filter(|r| Some(r.word.as_str()) != excluded)
            .filter(|r| seen.insert(r.word.as_str()))
            .map(|r| self.to_word(&r.word, r, lang, display))
            .collect();
        sort_words(&mut words);
        words
    }

    fn genre(&self, genre: Option<GenreId>, display: LanguageId) -> String {
        genre
            .and_then(|g| self.snapshot.genre_label(g, display))
            .unwrap_or_default()
            .to_string()
    }

    /// Topical field of a concept, labelled in `display`.
    pub async fn field_label(&self, concept: ConceptId, display: LanguageId) -> Result<Option<FieldLabel>> {
        let links = self.store.resolve_concept(concept).await?;
        Ok(links
            .and_then(|l| l.field)
            .and_then(|f| self.snapshot.field_label(f, display))
            .cloned())
    }
}
