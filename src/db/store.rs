

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::client::HelixClientError;
use crate::core::models::{ConceptId, FieldId, GenreId};
use crate::toolkit::lexicon::{ClosureResolver, ConceptGraph, project_rows};


#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Invalid data: {0}")]
    Validation(String),
    #[error("Helix error: {0}")]
    Helix(#[from] HelixClientError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;


/// Hub-table row: the concept graph node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConceptLinks {
    pub id: ConceptId,
    #[serde(default)]
    pub parent: Option<ConceptId>,
    #[serde(default)]
    pub synonym_group: Option<ConceptId>,
    #[serde(default)]
    pub field: Option<FieldId>,
    #[serde(default)]
    pub genre: Option<GenreId>,
}


#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordRow {
    pub word: String,
    pub concept: ConceptId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub genre: Option<GenreId>,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub concept: ConceptId,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageName {
    pub language: String,
    pub in_language: String,
    pub name: String,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldRecord {
    pub id: FieldId,
    pub language: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreRecord {
    pub id: GenreId,
    pub language: String,
    pub label: String,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebString {
    pub language: String,
    pub key: String,
    pub value: String,
}


/// Deduplicated word sets for the two sides of a language pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPair {
    pub first: Vec<String>,
    pub second: Vec<String>,
}


/// Query surface of the concept store. Languages are addressed by canonical name;
/// the store knows which one is the hub and serves its rows from the concept table.
#[async_trait]
pub trait ConceptStore: Send + Sync {
    async fn list_languages(&self) -> StoreResult<Vec<String>>;

    async fn hub_language(&self) -> StoreResult<String>;

    async fn lookup_word(&self, language: &str, text: &str) -> StoreResult<Vec<WordRow>>;

    async fn resolve_concept(&self, id: ConceptId) -> StoreResult<Option<ConceptLinks>>;

    async fn concepts_with_parent(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>>;

    async fn concepts_with_synonym_group(&self, id: ConceptId) -> StoreResult<Vec<ConceptId>>;

    async fn words_for_concepts(&self, language: &str, ids: &[ConceptId]) -> StoreResult<Vec<WordRow>>;

    async fn list_words(&self, language: &str) -> StoreResult<Vec<WordEntry>>;

    async fn concept_graph(&self) -> StoreResult<Vec<ConceptLinks>>;

    async fn list_language_names(&self) -> StoreResult<Vec<LanguageName>>;

    async fn list_fields(&self) -> StoreResult<Vec<FieldRecord>>;

    async fn list_genres(&self) -> StoreResult<Vec<GenreRecord>>;

    async fn list_web_strings(&self) -> StoreResult<Vec<WebString>>;

    /// Bulk pair projection. Stores with a native traversal may override this;
    /// the default materializes the graph once and resolves closures in process.
    async fn project_language_pair(
        &self,
        first: &str,
        second: &str,
        resolver: &ClosureResolver,
    ) -> StoreResult<RawPair> {
        let graph = ConceptGraph::from_links(self.concept_graph().await?);
        let first_rows = self.list_words(first).await?;
        let second_rows = self.list_words(second).await?;
        project_rows(&graph, resolver, &first_rows, &second_rows).await
    }
}


/// Hands out store generations. A loaded generation is never changed afterwards,
/// so a snapshot built on one keeps answering from it even after newer loads.
#[async_trait]
pub trait ConceptSource: Send + Sync {
    /// Reads the backing data into a new generation. A failed load has no effect
    /// on generations already handed out.
    async fn load(&self) -> StoreResult<Arc<dyn ConceptStore>>;
}
