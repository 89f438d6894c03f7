use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::client::{TranslationClient, TranslationRequest};
use crate::cache::CacheManager;
use crate::relay::Translator;

/// A [`TranslationClient`] backed by the SQLite translation cache.
///
/// Cache errors never fail a translation; they are logged and the request
/// goes to the API.
pub struct CachedTranslator {
    client: TranslationClient,
    cache: CacheManager,
}

impl CachedTranslator {
    pub const fn new(client: TranslationClient, cache: CacheManager) -> Self {
        Self { client, cache }
    }

    async fn lookup(&self, request: &TranslationRequest) -> Result<Option<String>> {
        let cache = self.cache.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || cache.get(&request))
            .await
            .context("Cache lookup task failed")?
    }

    async fn store(&self, request: &TranslationRequest, translated: &str) -> Result<()> {
        let cache = self.cache.clone();
        let request = request.clone();
        let translated = translated.to_string();
        tokio::task::spawn_blocking(move || cache.put(&request, &translated))
            .await
            .context("Cache write task failed")?
    }
}

#[async_trait]
impl Translator for CachedTranslator {
    async fn translate(&self, text: &str, language: &str) -> Result<String> {
        let request = self.client.request(text, language);

        match self.lookup(&request).await {
            Ok(Some(cached)) => {
                debug!(%language, "Translation cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %format!("{e:#}"), "Translation cache unavailable"),
        }

        let translated = self.client.translate_request(&request).await?;

        if let Err(e) = self.store(&request, &translated).await {
            warn!(error = %format!("{e:#}"), "Failed to store translation in cache");
        }

        Ok(translated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cache_hit_skips_api() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(temp_dir.path().join("translations.db")).unwrap();
        // Nothing listens here; a cache miss would fail to connect
        let client = TranslationClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            "test-model".to_string(),
        );
        cache
            .put(&client.request("Hello", "de"), "Hallo")
            .unwrap();

        let translator = CachedTranslator::new(client, cache);

        assert_eq!(translator.translate("Hello", "de").await.unwrap(), "Hallo");
    }

    #[tokio::test]
    async fn test_cache_miss_reaches_api() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(temp_dir.path().join("translations.db")).unwrap();
        let client = TranslationClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            "test-model".to_string(),
        );

        let translator = CachedTranslator::new(client, cache.clone());
        let result = translator.translate("Hello", "ru").await;

        assert!(result.is_err());
        assert_eq!(cache.entry_count().unwrap(), 0);
    }
}
