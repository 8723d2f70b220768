

pub mod cache;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod languages;
pub mod models;
pub mod snapshot;

pub use cache::{CacheStats, PairCache, PairView};
pub use config::{DictionaryConfig, StoreBackend};
pub use dictionary::{Dictionary, Lookup, distinct_fields};
pub use error::{DictionaryError, Result};
pub use languages::{LanguageNames, LanguageSet};
pub use models::{ConceptId, FieldLabel, Language, LanguageId, SimpleWord, Word};
pub use snapshot::{Snapshot, SnapshotInfo};
