

pub mod core;
pub mod db;
pub mod mcp;
pub mod toolkit;
pub mod utils;


pub use core::config::DictionaryConfig;
pub use core::dictionary::{Dictionary, Lookup};
pub use core::error::{DictionaryError, Result};
pub use db::{ConceptSource, ConceptStore, HelixClient, HelixStore, MemorySource, MemoryStore, StoreError};


pub const DEFAULT_HELIX_PORT: u16 = 6969;


pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 10;


pub const DEFAULT_CONFIG_ENV: &str = "HUBDICT_CONFIG";
