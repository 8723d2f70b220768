

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::DictionaryConfig;
use crate::core::dictionary::{Dictionary, distinct_fields};
use crate::core::error::DictionaryError;
use crate::core::models::{FieldLabel, Word};


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct SearchWordParams {
    #[schemars(description = "Exact word to look up")]
    pub word: String,
    #[schemars(description = "Source language, as a 3-letter tag ('eng') or a name ('english')")]
    pub from: String,
    #[schemars(description = "Target language for translations")]
    pub to: String,
    #[schemars(description = "Language used for language names and field/genre labels (default: hub)")]
    pub display: Option<String>,
    #[schemars(description = "Retry with the languages swapped when the word is missing (default: false)")]
    pub either_way: Option<bool>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AutocompleteParams {
    #[schemars(description = "Partial word typed so far")]
    pub term: String,
    #[schemars(description = "Six-character pair key, e.g. 'engfre'")]
    pub pair: String,
    #[schemars(description = "Language tag whose words should be listed first")]
    pub preferred: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ListLanguagesParams {
    #[schemars(description = "Language to name the languages in; it is listed first")]
    pub display: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct WebStringParams {
    #[schemars(description = "Interface string key")]
    pub key: String,
    #[schemars(description = "Language of the string (falls back to the hub language)")]
    pub display: Option<String>,
}


#[derive(Debug, Serialize)]
struct SearchWordResult {
    results: Vec<Word>,
    reversed: bool,
    fields: Vec<FieldLabel>,
}


#[derive(Clone)]
pub struct DictionaryMcpServer {
    dictionary: Arc<Dictionary>,
    tool_router: ToolRouter<Self>,
}

impl DictionaryMcpServer {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary: Arc::new(dictionary),
            tool_router: Self::tool_router(),
        }
    }

    fn convert_error(err: DictionaryError) -> McpError {
        match err {
            DictionaryError::NotFound { word, language } => McpError::resource_not_found(
                format!("Word {} not found in {}", word, language),
                Some(json!({ "word": word, "language": language })),
            ),
            DictionaryError::InvalidPairKey(key) => {
                McpError::invalid_params(format!("Unknown language key: {}", key), None)
            }
            DictionaryError::Config(msg) => McpError::invalid_params(msg, None),
            DictionaryError::StoreUnavailable(e) => McpError::internal_error(e.to_string(), None),
            DictionaryError::ReloadFailure(msg) => McpError::internal_error(msg, None),
        }
    }

    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router]
impl DictionaryMcpServer {
    #[tool(description = "Look up a word and return its meanings with synonyms and translations. Returns: {results: [{word, language, description, field, genre, synonyms, translations}], reversed, fields}")]
    async fn search_word(
        &self,
        Parameters(params): Parameters<SearchWordParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("🔍 Search '{}' [{} -> {}]", params.word, params.from, params.to);

        let display = params.display.as_deref();
        let (results, reversed) = if params.either_way.unwrap_or(false) {
            let lookup = self
                .dictionary
                .search_either_way(&params.word, &params.from, &params.to, display)
                .await
                .map_err(Self::convert_error)?;
            (lookup.results, lookup.reversed)
        } else {
            let results = self
                .dictionary
                .search(&params.word, &params.from, &params.to, display)
                .await
                .map_err(Self::convert_error)?;
            (results, false)
        };

        info!("✅ Found {} meanings", results.len());

        let fields = distinct_fields(&results);
        let json = Self::result_to_json(SearchWordResult { results, reversed, fields })?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Type-ahead suggestions for a language pair, ranked and capped. Returns: [{w, t}]")]
    async fn autocomplete(
        &self,
        Parameters(params): Parameters<AutocompleteParams>,
    ) -> Result<CallToolResult, McpError> {
        let (a, b) = self
            .dictionary
            .parse_pair_key(&params.pair)
            .await
            .map_err(Self::convert_error)?;

        let words = self
            .dictionary
            .words_with_term(&params.term, &a.language, &b.language, params.preferred.as_deref())
            .await
            .map_err(Self::convert_error)?;

        let json = Self::result_to_json(&words)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List the supported languages, named in the display language, which comes first. Returns: [{language, tag}]")]
    async fn list_languages(
        &self,
        Parameters(params): Parameters<ListLanguagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let languages = self.dictionary.languages(params.display.as_deref()).await;
        let json = Self::result_to_json(&languages)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Localised interface string, falling back to the hub language. Returns: {key, value}")]
    async fn web_string(
        &self,
        Parameters(params): Parameters<WebStringParams>,
    ) -> Result<CallToolResult, McpError> {
        let value = self
            .dictionary
            .web_string(params.display.as_deref(), &params.key)
            .await;
        let json = Self::result_to_json(json!({ "key": params.key, "value": value }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Reload the dictionary data and rebuild every cache. On failure the previous data stays live. Returns: {version, built_at, languages, hub}")]
    async fn reload_dictionary(&self) -> Result<CallToolResult, McpError> {
        info!("♻️ Reloading dictionary");

        let snapshot = match self.dictionary.reset_all().await {
            Ok(info) => info,
            Err(e) => {
                warn!("⚠️ Reload rejected: {}", e);
                return Err(Self::convert_error(e));
            }
        };

        info!("✅ Dictionary v{} live", snapshot.version);

        let json = Self::result_to_json(&snapshot)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}


#[tool_handler]
impl ServerHandler for DictionaryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "hubdict".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Multilingual dictionary. Use search_word for exact lookups with synonyms and \
                 translations, autocomplete for partial words, and list_languages for the \
                 supported language tags."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new("config://hubdict", "hubdict-config".to_string()).no_annotation(),
                RawResource::new("status://dictionary", "dictionary-status".to_string()).no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            "config://hubdict" => {
                let content = serde_json::to_string_pretty(self.dictionary.config()).unwrap_or_default();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            "status://dictionary" => {
                let snapshot = self.dictionary.snapshot_info().await;
                let cache = self.dictionary.cache_stats().await;

                let content = serde_json::to_string_pretty(&json!({
                    "snapshot": snapshot,
                    "pair_cache": {
                        "hits": cache.hits,
                        "misses": cache.misses,
                        "hit_rate": cache.hit_rate(),
                        "filled": cache.filled,
                        "capacity": cache.capacity,
                    },
                }))
                .unwrap_or_default();

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


/// Loads configuration (file named by `HUBDICT_CONFIG`, then `HUBDICT_*` variables),
/// opens the dictionary and serves MCP over stdio.
pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing hubdict MCP server...");

    let config_path = std::env::var(crate::DEFAULT_CONFIG_ENV).ok().map(PathBuf::from);
    let config = DictionaryConfig::load(config_path.as_deref())?;
    let dictionary = Dictionary::from_config(config).await?;

    let snapshot = dictionary.snapshot_info().await;
    info!("✅ hubdict MCP server ready");
    info!("   📍 Backend: {}", dictionary.config().store_backend);
    info!("   🌐 Languages: {} (hub {})", snapshot.languages, snapshot.hub);

    let server = DictionaryMcpServer::new(dictionary);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySource;
    use crate::db::memory::fixtures;

    fn code(err: DictionaryError) -> ErrorCode {
        DictionaryMcpServer::convert_error(err).code
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(code(DictionaryError::not_found("zzz", "english")), ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(code(DictionaryError::InvalidPairKey("xx".into())), ErrorCode::INVALID_PARAMS);
        assert_eq!(code(DictionaryError::ReloadFailure("bad".into())), ErrorCode::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_server_info() {
        let source = Arc::new(MemorySource::new(fixtures::dataset()));
        let dictionary = Dictionary::open(source, DictionaryConfig::default()).await.unwrap();
        let server = DictionaryMcpServer::new(dictionary);

        let info = server.get_info();
        assert_eq!(info.server_info.name, "hubdict");
        assert!(info.capabilities.tools.is_some());
    }
}
