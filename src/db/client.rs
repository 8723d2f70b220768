

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use helix_rs::{HelixDB, HelixDBClient, HelixError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};


const MAX_RETRIES: u32 = 3;

const INITIAL_RETRY_DELAY_MS: u64 = 100;

const MAX_RETRY_DELAY_MS: u64 = 10000;


#[derive(Debug, Error)]
pub enum HelixClientError {
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Helix error: {0}")]
    Helix(#[from] HelixError),
    #[error("Retry exhausted after {0} attempts: {1}")]
    RetryExhausted(u32, String),
}


pub struct HelixClient {
    inner: HelixDB,
    is_connected: AtomicBool,
    base_url: String,
}

impl HelixClient {
    pub fn new(host: &str, port: u16) -> Self {
        let endpoint = format!("http://{}", host);
        let base_url = format!("http://{}:{}", host, port);

        let inner = <HelixDB as HelixDBClient>::new(
            Some(&endpoint),
            Some(port),
            None,
        );

        info!("HelixClient created for {}", base_url);

        Self {
            inner,
            is_connected: AtomicBool::new(false),
            base_url,
        }
    }

    /// Runs a stored query, retrying transport failures with exponential backoff.
    pub async fn execute_query<T, P>(&self, query_name: &str, params: &P) -> Result<T, HelixClientError>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let mut last_error = None;
        let mut delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS);

        for attempt in 1..=MAX_RETRIES {
            debug!("Executing query: {} (attempt {})", query_name, attempt);

            match self.inner.query::<P, T>(query_name, params).await {
                Ok(result) => {
                    self.is_connected.store(true, Ordering::Relaxed);
                    return Ok(result);
                }
                Err(e) => {
                    let err_str = e.to_string();

                    if err_str.contains("not found") || err_str.contains("No value") {
                        return Err(HelixClientError::Query(err_str));
                    }

                    debug!("Query {} failed (attempt {}): {}", query_name, attempt, e);
                    last_error = Some(err_str);

                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(Duration::from_millis(MAX_RETRY_DELAY_MS));
                    }
                }
            }
        }

        self.is_connected.store(false, Ordering::Relaxed);
        Err(HelixClientError::RetryExhausted(
            MAX_RETRIES,
            last_error.unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
