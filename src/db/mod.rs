pub mod client;
pub mod helix_store;
pub mod memory;
pub mod store;

pub use client::{HelixClient, HelixClientError};
pub use helix_store::HelixStore;
pub use memory::{Dataset, MemorySource, MemoryStore};
pub use store::{
    ConceptLinks, ConceptSource, ConceptStore, FieldRecord, GenreRecord, LanguageName, RawPair, StoreError, StoreResult,
    WebString, WordEntry, WordRow,
};
