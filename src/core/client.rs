//! Translation dispatcher with sticky provider fallback

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{DetectionError, Result, TranslationError};
use crate::core::models::{
    DetectionResult, ProviderKind, ProviderState, TranslationRequest, TranslationResult,
    AUTO_LANGUAGE,
};
use crate::providers::{
    build_providers, DetectLanguageApi, GoogleFreeProvider, LanguageDetector, ProviderTable,
    TranslationProvider,
};

/// One-way switch from the primary free provider to a secondary one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub primary: ProviderKind,
    pub secondary: ProviderKind,
}

impl FallbackPolicy {
    pub fn new(secondary: ProviderKind) -> Self {
        Self {
            primary: ProviderKind::GoogleFree,
            secondary,
        }
    }

    /// Provider to switch to after `failed` failed. Only a primary failure
    /// moves anywhere; there is no transition back.
    pub fn next(&self, failed: ProviderKind) -> Option<ProviderKind> {
        (failed == self.primary && self.secondary != self.primary).then_some(self.secondary)
    }
}

/// Holds the busy flag for the lifetime of one translation, fallback retry included
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Translation client: one instance per session, cheap to clone
#[derive(Clone)]
pub struct FreeTranslator {
    providers: Arc<ProviderTable>,
    detectors: Arc<Vec<Arc<dyn LanguageDetector>>>,
    fallback: FallbackPolicy,
    active: Arc<Mutex<ProviderKind>>,
    busy: Arc<AtomicBool>,
}

impl FreeTranslator {
    /// Create a translator with HTTP adapters built from `config`
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build()?;

        let providers = build_providers(&config, &client);

        let mut detectors: Vec<Arc<dyn LanguageDetector>> = Vec::new();
        if let Some(api_key) = &config.detect_language_api_key {
            detectors.push(Arc::new(DetectLanguageApi::new(
                client.clone(),
                &config.detect_language_endpoint,
                api_key.clone(),
            )));
        }
        detectors.push(Arc::new(GoogleFreeProvider::new(
            client,
            &config.google_free_endpoint,
        )));

        info!(
            "Translator ready: {} providers, active {}, fallback {}",
            providers.len(),
            config.default_provider,
            config.fallback_provider
        );

        Ok(Self::from_parts(
            providers,
            detectors,
            config.default_provider,
            FallbackPolicy::new(config.fallback_provider),
        ))
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env()?;
        Self::new(config)
    }

    /// Assemble a translator from already-built adapters.
    ///
    /// Detectors are tried in order; the first answer wins.
    pub fn from_parts(
        providers: ProviderTable,
        detectors: Vec<Arc<dyn LanguageDetector>>,
        active: ProviderKind,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            providers: Arc::new(providers),
            detectors: Arc::new(detectors),
            fallback,
            active: Arc::new(Mutex::new(active)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Translate a request with the active provider.
    ///
    /// Returns an empty result without any network call when the text is blank
    /// or another translation on this client is still in flight.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        if self.busy.load(Ordering::Acquire) {
            debug!("Translation already in flight, skipping");
            return Ok(TranslationResult::empty());
        }

        let text = request.text.trim();
        if text.is_empty() {
            return Ok(TranslationResult::empty());
        }

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            debug!("Translation already in flight, skipping");
            return Ok(TranslationResult::empty());
        };

        let active = *self.active.lock().await;

        let err = match self.dispatch(active, text, request).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let secondary = match self.fallback.next(active) {
            Some(secondary) if err.is_provider_failure() => secondary,
            _ => return Err(err),
        };

        if !self.providers.contains_key(&secondary) {
            warn!("{} failed and fallback {} is not configured", active, secondary);
            return Err(err);
        }

        {
            let mut current = self.active.lock().await;
            if *current != active {
                debug!("Provider changed to {} while {} was in flight, not falling back", *current, active);
                return Err(err);
            }
            warn!("{}, switching to {}", err, secondary);
            *current = secondary;
        }
        info!("Active provider is now {}", secondary);

        self.dispatch(secondary, text, request).await
    }

    /// Translate and return only the text; empty string when the call was skipped
    pub async fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let request = TranslationRequest::new(text, target_lang).with_source_lang(source_lang);
        Ok(self.translate(&request).await?.translated_text)
    }

    /// Single attempt against one provider
    async fn dispatch(
        &self,
        provider: ProviderKind,
        text: &str,
        request: &TranslationRequest,
    ) -> Result<TranslationResult> {
        let adapter = self
            .providers
            .get(&provider)
            .cloned()
            .ok_or(TranslationError::ProviderUnavailable { provider })?;

        let source = self.resolve_source(&*adapter, request, text).await?;

        debug!(
            "Translating {} chars with {} ({} -> {})",
            text.chars().count(),
            provider,
            source,
            request.target_lang
        );

        let translation = adapter
            .translate(text, &source, &request.target_lang)
            .await
            .map_err(|e| TranslationError::provider(provider, e))?;

        let detected_source_lang = translation
            .detected_source_lang
            .or_else(|| (source != request.source_lang).then_some(source));

        Ok(TranslationResult {
            translated_text: translation.text,
            provider_used: Some(provider),
            detected_source_lang,
        })
    }

    /// Providers that reject `auto` get a detected source instead
    async fn resolve_source(
        &self,
        adapter: &dyn TranslationProvider,
        request: &TranslationRequest,
        text: &str,
    ) -> Result<String> {
        let provider = adapter.kind();
        if !request.is_auto_source() || provider.accepts_auto_source() {
            return Ok(request.source_lang.clone());
        }

        let detected = self.detect_language(text).await;
        if detected == AUTO_LANGUAGE {
            warn!("{} needs a concrete source language and detection gave none", provider);
            return Err(TranslationError::UnresolvedSourceLanguage { provider });
        }

        debug!("Resolved auto source to {} for {}", detected, provider);
        Ok(detected)
    }

    /// Best-effort language code for `text`; `"auto"` when every detector fails
    pub async fn detect_language(&self, text: &str) -> String {
        match self.try_detect_language(text).await {
            Ok(detection) => detection.language,
            Err(e) => {
                warn!("Language detection failed, using {}: {}", AUTO_LANGUAGE, e);
                AUTO_LANGUAGE.to_string()
            }
        }
    }

    /// Run the detectors in order and return the first answer
    pub async fn try_detect_language(&self, text: &str) -> std::result::Result<DetectionResult, DetectionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DetectionError::NoDetections);
        }

        let mut last_error = DetectionError::NotConfigured;
        for detector in self.detectors.iter() {
            match detector.detect(text).await {
                Ok(detection) => return Ok(detection),
                Err(e) => {
                    debug!("Detector failed: {}", e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Select the active provider by name. Unknown or unconfigured names fail.
    pub async fn set_method(&self, name: &str) -> Result<ProviderKind> {
        let provider: ProviderKind = name.parse()?;
        self.set_provider(provider).await?;
        Ok(provider)
    }

    /// Select the active provider
    pub async fn set_provider(&self, provider: ProviderKind) -> Result<()> {
        if !self.providers.contains_key(&provider) {
            return Err(TranslationError::ProviderUnavailable { provider });
        }

        *self.active.lock().await = provider;
        info!("Active provider set to {}", provider);
        Ok(())
    }

    /// Get current provider
    pub async fn active_provider(&self) -> ProviderKind {
        *self.active.lock().await
    }

    pub async fn state(&self) -> ProviderState {
        ProviderState {
            active: self.active_provider().await,
            busy: self.busy.load(Ordering::Acquire),
        }
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Get available providers
    pub fn available_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|p| self.providers.contains_key(p))
            .collect()
    }
}

impl std::fmt::Debug for FreeTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeTranslator")
            .field("providers", &self.available_providers())
            .field("detectors", &self.detectors.len())
            .field("fallback", &self.fallback)
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .finish()
    }
}

/// Provider table from a list of adapters, keyed by their own kind
pub fn provider_table<I>(adapters: I) -> ProviderTable
where
    I: IntoIterator<Item = Arc<dyn TranslationProvider>>,
{
    adapters
        .into_iter()
        .map(|adapter| (adapter.kind(), adapter))
        .collect::<HashMap<_, _>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProviderFailure;
    use crate::providers::test_support::serve;
    use crate::providers::ProviderTranslation;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    enum Behavior {
        Reply(&'static str),
        Fail(u16),
        /// Signal `entered`, then wait for `release` before replying
        Block {
            entered: Arc<Notify>,
            release: Arc<Notify>,
            reply: &'static str,
        },
        /// Like `Block`, but fail with `status` once released
        BlockThenFail {
            entered: Arc<Notify>,
            release: Arc<Notify>,
            status: u16,
        },
    }

    struct FakeProvider {
        kind: ProviderKind,
        behavior: Behavior,
        calls: AtomicUsize,
        last_source: std::sync::Mutex<Option<String>>,
    }

    impl FakeProvider {
        fn new(kind: ProviderKind, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior,
                calls: AtomicUsize::new(0),
                last_source: std::sync::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for FakeProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn translate(
            &self,
            _text: &str,
            source: &str,
            _target: &str,
        ) -> std::result::Result<ProviderTranslation, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_source.lock().unwrap() = Some(source.to_string());

            match &self.behavior {
                Behavior::Reply(text) => Ok(ProviderTranslation::new(*text)),
                Behavior::Fail(status) => Err(ProviderFailure::Status {
                    status: *status,
                    body: String::new(),
                }),
                Behavior::Block {
                    entered,
                    release,
                    reply,
                } => {
                    entered.notify_one();
                    release.notified().await;
                    Ok(ProviderTranslation::new(*reply))
                }
                Behavior::BlockThenFail {
                    entered,
                    release,
                    status,
                } => {
                    entered.notify_one();
                    release.notified().await;
                    Err(ProviderFailure::Status {
                        status: *status,
                        body: String::new(),
                    })
                }
            }
        }
    }

    struct FakeDetector(Option<&'static str>);

    #[async_trait]
    impl LanguageDetector for FakeDetector {
        async fn detect(&self, _text: &str) -> std::result::Result<DetectionResult, DetectionError> {
            match self.0 {
                Some(language) => Ok(DetectionResult::new(language)),
                None => Err(DetectionError::Failed(ProviderFailure::Status {
                    status: 500,
                    body: String::new(),
                })),
            }
        }
    }

    fn translator(
        primary: &Arc<FakeProvider>,
        secondary: &Arc<FakeProvider>,
        detectors: Vec<Arc<dyn LanguageDetector>>,
    ) -> FreeTranslator {
        let adapters: Vec<Arc<dyn TranslationProvider>> = vec![primary.clone(), secondary.clone()];
        FreeTranslator::from_parts(
            provider_table(adapters),
            detectors,
            ProviderKind::GoogleFree,
            FallbackPolicy::new(ProviderKind::MyMemory),
        )
    }

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest::new(text, "en").with_source_lang("vi")
    }

    #[test]
    fn test_fallback_policy_is_one_way() {
        let policy = FallbackPolicy::new(ProviderKind::MyMemory);
        assert_eq!(policy.next(ProviderKind::GoogleFree), Some(ProviderKind::MyMemory));
        assert_eq!(policy.next(ProviderKind::MyMemory), None);
        assert_eq!(policy.next(ProviderKind::LibreTranslate), None);
    }

    #[tokio::test]
    async fn test_successful_call_tags_provider() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("unused"));
        let translator = translator(&google, &mymemory, vec![]);

        let result = translator.translate(&request("xin chào")).await.unwrap();

        assert_eq!(result.translated_text, "hello");
        assert_eq!(result.provider_used, Some(ProviderKind::GoogleFree));
        assert_eq!(google.calls(), 1);
        assert_eq!(mymemory.calls(), 0);
        assert!(!translator.state().await.busy);
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_call() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![]);

        for text in ["", "   ", "\n\t "] {
            let result = translator.translate(&request(text)).await.unwrap();
            assert!(result.is_empty());
        }
        assert_eq!(translator.translate_text("  ", "vi", "en").await.unwrap(), "");
        assert_eq!(google.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_switches_to_secondary_once() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Fail(503));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![]);

        let result = translator.translate(&request("xin chào")).await.unwrap();

        assert_eq!(result.translated_text, "hello");
        assert_eq!(result.provider_used, Some(ProviderKind::MyMemory));
        assert_eq!(google.calls(), 1);
        assert_eq!(mymemory.calls(), 1);
        assert_eq!(translator.active_provider().await, ProviderKind::MyMemory);

        // Sticky: the primary is not tried again
        translator.translate(&request("tạm biệt")).await.unwrap();
        assert_eq!(google.calls(), 1);
        assert_eq!(mymemory.calls(), 2);
    }

    #[tokio::test]
    async fn test_secondary_failure_propagates() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Fail(500));
        let translator = translator(&google, &mymemory, vec![]);
        translator.set_method("mymemory").await.unwrap();

        let err = translator.translate(&request("xin chào")).await.unwrap_err();

        assert!(matches!(
            err,
            TranslationError::Provider {
                provider: ProviderKind::MyMemory,
                source: ProviderFailure::Status { status: 500, .. }
            }
        ));
        assert_eq!(mymemory.calls(), 1);
        assert_eq!(google.calls(), 0);
        assert_eq!(translator.active_provider().await, ProviderKind::MyMemory);
    }

    #[tokio::test]
    async fn test_both_failing_returns_secondary_error() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Fail(503));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Fail(429));
        let translator = translator(&google, &mymemory, vec![]);

        let err = translator.translate(&request("xin chào")).await.unwrap_err();

        assert_eq!(err.to_string(), "mymemory: HTTP error: 429");
        assert_eq!(google.calls(), 1);
        assert_eq!(mymemory.calls(), 1);
        assert!(!translator.state().await.busy);
    }

    #[tokio::test]
    async fn test_overlapping_call_returns_empty() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let google = FakeProvider::new(
            ProviderKind::GoogleFree,
            Behavior::Block {
                entered: entered.clone(),
                release: release.clone(),
                reply: "hello",
            },
        );
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("unused"));
        let translator = translator(&google, &mymemory, vec![]);

        let first = {
            let translator = translator.clone();
            tokio::spawn(async move { translator.translate(&request("xin chào")).await })
        };
        entered.notified().await;
        assert!(translator.state().await.busy);

        let second = translator.translate(&request("tạm biệt")).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(google.calls(), 1);

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.translated_text, "hello");
        assert!(!translator.state().await.busy);
    }

    #[tokio::test]
    async fn test_set_method_during_call_is_not_overridden_by_fallback() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let google = FakeProvider::new(
            ProviderKind::GoogleFree,
            Behavior::BlockThenFail {
                entered: entered.clone(),
                release: release.clone(),
                status: 503,
            },
        );
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("unused"));
        let libre = FakeProvider::new(ProviderKind::LibreTranslate, Behavior::Reply("hello"));
        let adapters: Vec<Arc<dyn TranslationProvider>> =
            vec![google.clone(), mymemory.clone(), libre.clone()];
        let translator = FreeTranslator::from_parts(
            provider_table(adapters),
            vec![],
            ProviderKind::GoogleFree,
            FallbackPolicy::new(ProviderKind::MyMemory),
        );

        let pending = {
            let translator = translator.clone();
            tokio::spawn(async move { translator.translate(&request("xin chào")).await })
        };
        entered.notified().await;
        translator.set_method("libre").await.unwrap();
        release.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            TranslationError::Provider {
                provider: ProviderKind::GoogleFree,
                ..
            }
        ));
        assert_eq!(mymemory.calls(), 0);
        assert_eq!(translator.active_provider().await, ProviderKind::LibreTranslate);

        let result = translator.translate(&request("xin chào")).await.unwrap();
        assert_eq!(result.provider_used, Some(ProviderKind::LibreTranslate));
    }

    #[tokio::test]
    async fn test_dropped_call_clears_busy() {
        let entered = Arc::new(Notify::new());
        let google = FakeProvider::new(
            ProviderKind::GoogleFree,
            Behavior::Block {
                entered: entered.clone(),
                release: Arc::new(Notify::new()),
                reply: "never",
            },
        );
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("unused"));
        let translator = translator(&google, &mymemory, vec![]);

        let pending = {
            let translator = translator.clone();
            tokio::spawn(async move { translator.translate(&request("xin chào")).await })
        };
        entered.notified().await;
        pending.abort();
        let _ = pending.await;

        assert!(!translator.state().await.busy);
    }

    #[tokio::test]
    async fn test_detect_language_collapses_to_auto() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));

        let failing = translator(&google, &mymemory, vec![Arc::new(FakeDetector(None))]);
        assert_eq!(failing.detect_language("xin chào").await, "auto");
        assert!(failing.try_detect_language("xin chào").await.is_err());

        let none = translator(&google, &mymemory, vec![]);
        assert_eq!(none.detect_language("xin chào").await, "auto");
        assert!(matches!(
            none.try_detect_language("xin chào").await,
            Err(DetectionError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_detect_language_falls_through_detectors() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(
            &google,
            &mymemory,
            vec![Arc::new(FakeDetector(None)), Arc::new(FakeDetector(Some("vi")))],
        );

        assert_eq!(translator.detect_language("xin chào").await, "vi");
        assert_eq!(translator.detect_language("   ").await, "auto");
    }

    #[tokio::test]
    async fn test_auto_source_resolved_for_concrete_only_provider() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![Arc::new(FakeDetector(Some("vi")))]);
        translator.set_method("mymemory").await.unwrap();

        let result = translator
            .translate(&TranslationRequest::new("xin chào", "en"))
            .await
            .unwrap();

        assert_eq!(mymemory.last_source.lock().unwrap().as_deref(), Some("vi"));
        assert_eq!(result.detected_source_lang.as_deref(), Some("vi"));
    }

    #[tokio::test]
    async fn test_auto_source_unresolved() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![Arc::new(FakeDetector(None))]);
        translator.set_method("mymemory").await.unwrap();

        let err = translator
            .translate(&TranslationRequest::new("xin chào", "en"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranslationError::UnresolvedSourceLanguage {
                provider: ProviderKind::MyMemory
            }
        ));
        assert_eq!(mymemory.calls(), 0);
    }

    #[tokio::test]
    async fn test_google_free_keeps_auto_source() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![Arc::new(FakeDetector(Some("vi")))]);

        translator
            .translate(&TranslationRequest::new("xin chào", "en"))
            .await
            .unwrap();

        assert_eq!(google.last_source.lock().unwrap().as_deref(), Some("auto"));
    }

    #[tokio::test]
    async fn test_set_method_validates_names() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Fail(503));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&google, &mymemory, vec![]);

        assert!(matches!(
            translator.set_method("deepl").await,
            Err(TranslationError::UnknownProvider { .. })
        ));
        assert!(matches!(
            translator.set_method("google-cloud").await,
            Err(TranslationError::ProviderUnavailable {
                provider: ProviderKind::GoogleCloud
            })
        ));
        assert_eq!(translator.active_provider().await, ProviderKind::GoogleFree);

        // An explicit set_method undoes the sticky switch
        translator.translate(&request("xin chào")).await.unwrap();
        assert_eq!(translator.active_provider().await, ProviderKind::MyMemory);
        assert_eq!(
            translator.set_method("google-free").await.unwrap(),
            ProviderKind::GoogleFree
        );
        assert_eq!(translator.active_provider().await, ProviderKind::GoogleFree);
    }

    #[tokio::test]
    async fn test_available_providers_in_display_order() {
        let google = FakeProvider::new(ProviderKind::GoogleFree, Behavior::Reply("hello"));
        let mymemory = FakeProvider::new(ProviderKind::MyMemory, Behavior::Reply("hello"));
        let translator = translator(&mymemory, &google, vec![]);

        assert_eq!(
            translator.available_providers(),
            vec![ProviderKind::GoogleFree, ProviderKind::MyMemory]
        );
    }

    fn config_for(base: &str) -> TranslatorConfig {
        TranslatorConfig {
            google_free_endpoint: base.to_string(),
            mymemory_endpoint: base.to_string(),
            libre_endpoint: format!("{}/translate", base),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_google_free_round_trip_over_http() {
        let app = Router::new().route(
            "/translate_a/single",
            get(|| async { Json(json!([[["hello", "xin chào", null, null, 1]], null, "vi"])) }),
        );
        let base = serve(app).await;
        let translator = FreeTranslator::new(config_for(&base)).unwrap();

        let result = translator.translate(&request("xin chào")).await.unwrap();

        assert_eq!(result.translated_text, "hello");
        assert_eq!(result.provider_used, Some(ProviderKind::GoogleFree));
        assert_eq!(result.detected_source_lang.as_deref(), Some("vi"));
    }

    #[tokio::test]
    async fn test_fallback_to_mymemory_over_http() {
        let app = Router::new()
            .route(
                "/translate_a/single",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            )
            .route(
                "/get",
                get(|| async { Json(json!({"responseData": {"translatedText": "hello"}})) }),
            );
        let base = serve(app).await;
        let translator = FreeTranslator::new(config_for(&base)).unwrap();

        let result = translator.translate(&request("xin chào")).await.unwrap();

        assert_eq!(result.translated_text, "hello");
        assert_eq!(result.provider_used, Some(ProviderKind::MyMemory));
        assert_eq!(translator.active_provider().await, ProviderKind::MyMemory);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_over_http() {
        let closed = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let app = Router::new().route(
            "/get",
            get(|| async { Json(json!({"responseData": {"translatedText": "hello"}})) }),
        );
        let base = serve(app).await;
        let config = TranslatorConfig {
            google_free_endpoint: closed.clone(),
            ..config_for(&base)
        };

        let unreachable = GoogleFreeProvider::new(reqwest::Client::new(), &closed);
        assert!(matches!(
            unreachable.translate("xin chào", "vi", "en").await,
            Err(ProviderFailure::Network(_))
        ));

        let translator = FreeTranslator::new(config).unwrap();
        let result = translator.translate(&request("xin chào")).await.unwrap();

        assert_eq!(result.translated_text, "hello");
        assert_eq!(result.provider_used, Some(ProviderKind::MyMemory));
        assert_eq!(translator.active_provider().await, ProviderKind::MyMemory);
    }
}
