

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::Result;


#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    #[default]
    Memory,
    Helix,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub hub_language: String,

    pub store_backend: StoreBackend,
    pub dataset_path: Option<PathBuf>,
    pub helix_host: String,
    pub helix_port: u16,

    pub autocomplete_limit: usize,
    pub follow_parent_links: bool,
    pub eager_warmup: bool,
}

impl DictionaryConfig {
    pub fn new(hub_language: &str) -> Self {
        Self {
            hub_language: hub_language.to_lowercase(),
            store_backend: StoreBackend::Memory,
            dataset_path: None,
            helix_host: "localhost".to_string(),
            helix_port: crate::DEFAULT_HELIX_PORT,
            autocomplete_limit: crate::DEFAULT_AUTOCOMPLETE_LIMIT,
            follow_parent_links: true,
            eager_warmup: true,
        }
    }

    /// Defaults, then an optional TOML file, then `HUBDICT_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let mut loaded: Self = builder
            .add_source(config::Environment::with_prefix("HUBDICT").try_parsing(true))
            .build()?
            .try_deserialize()?;
        loaded.hub_language = loaded.hub_language.to_lowercase();
        Ok(loaded)
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn helix_url(&self) -> String {
        format!("http://{}:{}", self.helix_host, self.helix_port)
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self::new("english")
    }
}
