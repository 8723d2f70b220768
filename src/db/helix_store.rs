
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use super::client::HelixClient;
use super::store::{
    ConceptLinks, ConceptSource, ConceptStore, FieldRecord, GenreRecord, LanguageName, StoreError, StoreResult, WebString,
    WordEntry, WordRow,
};
use crate::core::models::ConceptId;


/// Names of the stored HelixQL queries this store calls.
pub mod queries {
    pub const GET_LANGUAGES: &str = "getLanguages";
    pub const LOOKUP_WORD: &str = "lookupWord";
    pub const GET_CONCEPT: &str = "getConcept";
    pub const GET_CONCEPT_CHILDREN: &str = "getConceptChildren";
    pub const GET_SYNONYM_MEMBERS: &str = "getSynonymMembers";
    pub const GET_WORDS_FOR_CONCEPTS: &str = "getWordsForConcepts";
    pub const LIST_WORDS: &str = "listWords";
    pub const GET_CONCEPT_GRAPH: &str = "getConceptGraph";
    pub const LIST_LANGUAGE_NAMES: &str = "listLanguageNames";
    pub const LIST_FIELDS: &str = "listFields";
    pub const LIST_GENRES: &str = "listGenres";
    pub const LIST_WEB_STRINGS: &str = "listWebStrings";
}


#[derive(Debug, Deserialize)]
struct LanguagesResponse {
    languages: Vec<String>,
    hub: String,
}

#[derive(Debug, Deserialize)]
struct ConceptResponse {
    concept: Option<ConceptLinks>,
}

#[derive(Debug, Deserialize)]
struct IdsResponse {
    ids: Vec<ConceptId>,
}

#[derive(Debug, Deserialize)]
struct RowsResponse<T> {
    rows: Vec<T>,
}


/// Concept store served by stored HelixQL queries on a HelixDB instance.
/// Bulk import into HelixDB happens out of band, so every generation it hands
/// out reads the same live database.
#[derive(Clone)]
pub struct HelixStore {
    client: Arc<HelixClient>,
}

impl HelixStore {
    pub fn new(client: HelixClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn rows<T: DeserializeOwned>(&self, query: &str, params: serde_json::Value) -> StoreResult<Vec<T>> {
        let response: RowsResponse<T> = self.client.execute_query(query, &params).await?;
        Ok(response.rows)
    }

    async fn languages(&self) -> StoreResult<LanguagesResponse> {
        Ok(self.client.execute_query(queries::GET_LANGUAGES, &json!({})).await?)
    }
}

#[async_trait]
impl ConceptStore for HelixStore {
    async fn list_languages(&self) -> StoreResult<Vec<String>> {
        Ok(self.languages().await?.languages)
    }

    async fn hub_language(&self) -> StoreResult<String> {
        Ok(self.languages().await?.hub)
    }

    async fn lookup_word(&self, language: &str, text: &str) -> StoreResult<Vec<WordRow>> {
        self.rows(queries::LOOKUP_WORD, json!({ "language": language, "word": text })).await
    }

    async fn resolve_concept(&self, id: ConceptId) -> StoreResult<Option<ConceptLinks>> {
        let response: ConceptResponse = self.client.execute_query(queries::GET_CONCEPT, &json!({ "id": id })).await?;
        Ok(response.concept)
    }

    async fn concepts_with_parent(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
        let response: IdsResponse = self
            .client
            .execute_query(queries::GET_CONCEPT_CHILDREN, &json!({ "id": id }))
            .await?;
        Ok(response.ids)
    }

    async fn concepts_with_synonym_group(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>> {
        let response: IdsResponse = self
            .client
            .execute_query(queries::GET_SYNONYM_MEMBERS, &json!({ "id": id }))
            .await?;
        Ok(response.ids)
    }

    async fn words_for_concepts(&self, language: &str, ids: &[ConceptId]) -> StoreResult<Vec<WordRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.rows(queries::GET_WORDS_FOR_CONCEPTS, json!({ "language": language, "ids": ids }))
            .await
    }

    async fn list_words(&self, language: &str) -> StoreResult<Vec<WordEntry>> {
        self.rows(queries::LIST_WORDS, json!({ "language": language })).await
    }

    async fn concept_graph(&self) -> StoreResult<Vec<ConceptLinks>> {
        let links: Vec<ConceptLinks> = self.rows(queries::GET_CONCEPT_GRAPH, json!({})).await?;
        debug!("Fetched {} concept links", links.len());
        Ok(links)
    }

    async fn list_language_names(&self) -> StoreResult<Vec<LanguageName>> {
        self.rows(queries::LIST_LANGUAGE_NAMES, json!({})).await
    }

    async fn list_fields(&self) -> StoreResult<Vec<FieldRecord>> {
        self.rows(queries::LIST_FIELDS, json!({})).await
    }

    async fn list_genres(&self) -> StoreResult<Vec<GenreRecord>> {
        self.rows(queries::LIST_GENRES, json!({})).await
    }

    async fn list_web_strings(&self) -> StoreResult<Vec<WebString>> {
        self.rows(queries::LIST_WEB_STRINGS, json!({})).await
    }

}

#[async_trait]
impl ConceptSource for HelixStore {
    async fn load(&self) -> StoreResult<Arc<dyn ConceptStore>> {
        let languages = self
            .languages()
            .await
            .map_err(|e| StoreError::Connection(format!("{} unreachable: {}", self.client.base_url(), e)))?;
        info!(
            "HelixDB at {} serves {} languages",
            self.client.base_url(),
            languages.languages.len()
        );
        Ok(Arc::new(self.clone()) as Arc<dyn ConceptStore>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_response() {
        let response: LanguagesResponse = serde_json::from_value(json!({
            "languages": ["english", "french", "italian"],
            "hub": "english"
        }))
        .unwrap();
        assert_eq!(response.languages, vec!["english", "french", "italian"]);
        assert_eq!(response.hub, "english");
    }

    #[test]
    fn test_concept_response() {
        let response: ConceptResponse = serde_json::from_value(json!({
            "concept": { "id": 21, "parent": 20, "field": 2 }
        }))
        .unwrap();
        let concept = response.concept.unwrap();
        assert_eq!(concept.id, 21);
        assert_eq!(concept.parent, Some(20));
        assert_eq!(concept.synonym_group, None);
        assert_eq!(concept.field, Some(2));
        assert_eq!(concept.genre, None);

        let missing: ConceptResponse = serde_json::from_value(json!({ "concept": null })).unwrap();
        assert!(missing.concept.is_none());
    }

    #[test]
    fn test_ids_response() {
        let response: IdsResponse = serde_json::from_value(json!({ "ids": [70, 71, 72] })).unwrap();
        assert_eq!(response.ids, vec![70, 71, 72]);

        let empty: IdsResponse = serde_json::from_value(json!({ "ids": [] })).unwrap();
        assert!(empty.ids.is_empty());
    }

    #[test]
    fn test_word_rows_response() {
        let response: RowsResponse<WordRow> = serde_json::from_value(json!({
            "rows": [
                { "word": "fleur", "concept": 10, "genre": 1, "description": "organe floral" },
                { "word": "fleur", "concept": 7 }
            ]
        }))
        .unwrap();
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.rows[0].genre, Some(1));
        assert_eq!(response.rows[0].description, "organe floral");
        assert_eq!(response.rows[1].concept, 7);
        assert!(response.rows[1].definition.is_empty());
        assert_eq!(response.rows[1].genre, None);
    }

    #[test]
    fn test_rows_response_requires_rows() {
        let result: Result<RowsResponse<WordEntry>, _> = serde_json::from_value(json!({ "words": [] }));
        assert!(result.is_err());
    }
}
