//! Stale-while-revalidate orchestration over the cache store.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use http::header::{HeaderValue, CONTENT_TYPE, IF_NONE_MATCH};
use http::StatusCode;
use serde_json::json;

use pride_core::{
    Config, ExecutionContext, OriginHandler, Request, Response, TimingRecorder,
};
use pride_observability::Logger;

use crate::decorate::{decorate, CacheStatus};
use crate::entry::CachedEntry;
use crate::etag::normalize_etag;
use crate::freshness::FreshnessPolicy;
use crate::key::CacheKey;
use crate::store::CacheStore;

// Query parameter whose value must equal the configured admin key to
// bypass the cache entirely.
const REFRESH_PARAM: &str = "refresh";

// Timing labels for the measured operations.
const CACHE_LOOKUP: &str = "cache_lookup";
const ORIGIN_FETCH: &str = "origin_fetch";
const ORIGIN_REVALIDATE: &str = "origin_revalidate";

/// The caching layer between an inbound request and the origin handler.
///
/// Per request: derive the deployment-scoped cache key, look up the store
/// (unless the refresh secret bypasses it), classify the entry's
/// freshness, answer conditional requests with `304`, serve stale bodies
/// while a detached task revalidates, and fall back to a synchronous
/// origin call on a miss. Origin failures become a branded `503` that is
/// never written to the store. Every response leaves through the
/// decorator.
///
/// Concurrent requests that observe the same stale entry each schedule
/// their own background refresh; refreshes are not deduplicated per key.
pub struct SwrCache<S, H> {
    store: Arc<S>,
    origin: Arc<H>,
    ctx: Arc<dyn ExecutionContext>,
    config: Arc<Config>,
    logger: Logger,
}

impl<S, H> SwrCache<S, H>
where
    S: CacheStore + 'static,
    H: OriginHandler + 'static,
{
    /// Create the layer for one deployment.
    pub fn new(
        store: Arc<S>,
        origin: Arc<H>,
        ctx: Arc<dyn ExecutionContext>,
        config: Arc<Config>,
    ) -> Self {
        let logger = Logger::new(&config, "cache");
        Self {
            store,
            origin,
            ctx,
            config,
            logger,
        }
    }

    /// Serve one request through the cache.
    pub async fn handle(&self, request: &Request, timing: &TimingRecorder) -> Response {
        let path = request.uri().path().to_string();
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(&path);
        let key = CacheKey::for_request(path_and_query, &self.config.version.id);

        let is_refresh =
            query_param(request, REFRESH_PARAM).as_deref() == Some(self.config.admin_key.as_str());

        if is_refresh {
            self.logger
                .warn(format!("refresh secret detected, bypassing cache for {path}"));
        } else {
            let cached = match timing.measure(CACHE_LOOKUP, self.store.lookup(&key)).await {
                Ok(cached) => cached,
                Err(err) => {
                    // A broken entry or store hiccup degrades to a miss.
                    self.logger.error("cache lookup failed", &err);
                    None
                }
            };
            if let Some(entry) = cached {
                return self.serve_hit(request, entry, &key, timing);
            }
            self.logger.info(format!("cache MISS, running origin handler for {path}"));
        }

        self.fetch_origin(request, &key, timing).await
    }

    /// Serve a stored entry, answering conditionals and scheduling a
    /// refresh when the entry has gone stale.
    fn serve_hit(
        &self,
        request: &Request,
        entry: CachedEntry,
        key: &CacheKey,
        timing: &TimingRecorder,
    ) -> Response {
        let now = Utc::now();
        let policy = FreshnessPolicy::new(self.config.s_maxage);

        if policy.is_stale(&entry, now) {
            self.logger.info("data is stale, triggering background refresh");
            self.schedule_revalidation(request, key.clone(), timing.clone());
        }

        let client_tag = request
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(normalize_etag);
        let server_tag = entry.etag().map(normalize_etag);
        let tag_match = matches!((client_tag, server_tag), (Some(c), Some(s)) if c == s);

        // A matching validator short-circuits with an empty body even when
        // the entry is stale; the client's copy is still byte-identical.
        let mut response = entry.to_response();
        if tag_match {
            self.logger.info(format!("304 HIT: {}", request.uri().path()));
            *response.status_mut() = StatusCode::NOT_MODIFIED;
            *response.body_mut() = Bytes::new();
        } else {
            self.logger.info(format!("200 HIT: {}", request.uri().path()));
        }
        decorate(&mut response, CacheStatus::Hit, &self.config, now);
        response
    }

    /// Call the origin synchronously and detach the store write.
    async fn fetch_origin(
        &self,
        request: &Request,
        key: &CacheKey,
        timing: &TimingRecorder,
    ) -> Response {
        let result = timing
            .measure(ORIGIN_FETCH, self.origin.handle(request, &self.config, timing))
            .await;

        match result {
            Ok(mut response) => {
                let now = Utc::now();
                decorate(&mut response, CacheStatus::Miss, &self.config, now);
                self.schedule_store(key.clone(), CachedEntry::from_response(&response, now));
                self.logger.info("origin_fetch success");
                response
            }
            Err(err) => {
                self.logger.error("origin_fetch failed", &err);
                let mut response = service_unavailable();
                decorate(&mut response, CacheStatus::Miss, &self.config, Utc::now());
                response
            }
        }
    }

    /// Register a detached store write; failures are logged, never raised.
    fn schedule_store(&self, key: CacheKey, entry: CachedEntry) {
        let store = Arc::clone(&self.store);
        let logger = self.logger.clone();
        self.ctx.wait_until(Box::pin(async move {
            if let Err(err) = store.store(&key, entry).await {
                logger.error("cache store write failed", &err);
            }
        }));
    }

    /// Register a detached origin call that refreshes the stored entry.
    ///
    /// The response path never waits on this and never observes its
    /// outcome; a failed refresh leaves the stale entry in place.
    fn schedule_revalidation(&self, request: &Request, key: CacheKey, timing: TimingRecorder) {
        let origin = Arc::clone(&self.origin);
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let logger = self.logger.clone();
        let request = clone_request(request);

        self.ctx.wait_until(Box::pin(async move {
            let result = timing
                .measure(ORIGIN_REVALIDATE, origin.handle(&request, &config, &timing))
                .await;
            match result {
                Ok(response) => {
                    let entry = CachedEntry::from_response(&response, Utc::now());
                    match store.store(&key, entry).await {
                        Ok(()) => logger.info("origin_revalidate success"),
                        Err(err) => logger.error("cache store write failed", &err),
                    }
                }
                Err(err) => logger.error("origin_revalidate failed", &err),
            }
        }));
    }
}

// Rebuild an owned request for the detached origin call.
fn clone_request(request: &Request) -> Request {
    let mut copy = http::Request::new(request.body().clone());
    *copy.method_mut() = request.method().clone();
    *copy.uri_mut() = request.uri().clone();
    *copy.headers_mut() = request.headers().clone();
    copy
}

fn query_param(request: &Request, name: &str) -> Option<String> {
    let query = request.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// Fixed, user-safe payload for origin failures.
fn service_unavailable() -> Response {
    let body = json!({
        "error": "Service Unavailable",
        "message": "We're having trouble reaching our data source. Please try again shortly.",
    });
    let mut response = http::Response::new(Bytes::from(body.to_string()));
    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::future::BoxFuture;

    use crate::etag::generate_etag;
    use crate::store::MemoryStore;
    use pride_core::{Environment, LogLevel, OriginError, VersionMetadata};

    fn config() -> Arc<Config> {
        Arc::new(Config {
            s_maxage: 300,
            swr_ttl: 600,
            environment: Environment::Development,
            admin_key: "s3cret".into(),
            sheets_api_key: "a".into(),
            sheet_id: "s".into(),
            log_level: LogLevel::None,
            version: VersionMetadata {
                id: "v1".into(),
                tag: "".into(),
                timestamp: "t".into(),
            },
        })
    }

    /// Collects registered tasks so tests can drive them deterministically.
    #[derive(Default)]
    struct TestContext {
        tasks: Mutex<Vec<BoxFuture<'static, ()>>>,
    }

    impl TestContext {
        async fn drain(&self) {
            loop {
                let batch: Vec<_> = {
                    let mut tasks = self.tasks.lock().unwrap();
                    tasks.drain(..).collect()
                };
                if batch.is_empty() {
                    break;
                }
                for task in batch {
                    task.await;
                }
            }
        }
    }

    impl ExecutionContext for TestContext {
        fn wait_until(&self, task: BoxFuture<'static, ()>) {
            self.tasks.lock().unwrap().push(task);
        }
    }

    struct MockOrigin {
        calls: AtomicUsize,
        fail: bool,
        payload: &'static str,
    }

    impl MockOrigin {
        fn serving(payload: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                payload,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
                payload: "",
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OriginHandler for MockOrigin {
        async fn handle(
            &self,
            _request: &Request,
            _config: &Config,
            _timing: &TimingRecorder,
        ) -> Result<Response, OriginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OriginError::message("sheet fetch failed"));
            }
            let body = Bytes::from_static(self.payload.as_bytes());
            let mut response = http::Response::new(body.clone());
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
            response.headers_mut().insert(
                http::header::ETAG,
                HeaderValue::try_from(generate_etag(&body)).unwrap(),
            );
            Ok(response)
        }
    }

    struct Harness {
        cache: SwrCache<MemoryStore, MockOrigin>,
        store: Arc<MemoryStore>,
        origin: Arc<MockOrigin>,
        ctx: Arc<TestContext>,
    }

    fn harness(origin: MockOrigin) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let origin = Arc::new(origin);
        let ctx = Arc::new(TestContext::default());
        let cache = SwrCache::new(
            Arc::clone(&store),
            Arc::clone(&origin),
            Arc::clone(&ctx) as Arc<dyn ExecutionContext>,
            config(),
        );
        Harness {
            cache,
            store,
            origin,
            ctx,
        }
    }

    fn get(uri: &str) -> Request {
        let mut request = http::Request::new(Bytes::new());
        *request.uri_mut() = uri.parse().unwrap();
        request
    }

    fn get_conditional(uri: &str, tag: &str) -> Request {
        let mut request = get(uri);
        request
            .headers_mut()
            .insert(IF_NONE_MATCH, HeaderValue::try_from(tag).unwrap());
        request
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let h = harness(MockOrigin::serving("{\"performers\":[]}"));
        let timing = TimingRecorder::start();

        let first = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(header(&first, "x-cache"), Some("MISS"));

        h.ctx.drain().await;

        let second = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(header(&second, "x-cache"), Some("HIT"));
        assert_eq!(second.body().as_ref(), b"{\"performers\":[]}");
        assert_eq!(h.origin.calls(), 1);
    }

    #[tokio::test]
    async fn test_conditional_match_yields_304_with_empty_body() {
        let h = harness(MockOrigin::serving("{\"stages\":[]}"));
        let timing = TimingRecorder::start();

        let first = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        let tag = header(&first, "etag").unwrap().to_string();
        h.ctx.drain().await;

        let response = h
            .cache
            .handle(&get_conditional("/api/v1/pride-data", &tag), &timing)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.body().is_empty());
        assert_eq!(header(&response, "etag"), Some(tag.as_str()));
        assert_eq!(header(&response, "x-cache"), Some("HIT"));
    }

    #[tokio::test]
    async fn test_weak_validator_still_matches() {
        let h = harness(MockOrigin::serving("{\"events\":[]}"));
        let timing = TimingRecorder::start();

        let first = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        let weak = format!("W/{}", header(&first, "etag").unwrap());
        h.ctx.drain().await;

        let response = h
            .cache
            .handle(&get_conditional("/api/v1/pride-data", &weak), &timing)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_stale_entry_is_served_and_refreshed_in_background() {
        let h = harness(MockOrigin::serving("{\"fresh\":true}"));
        let timing = TimingRecorder::start();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");

        // Seed an entry well past the 300s threshold.
        let created = Utc::now() - chrono::Duration::seconds(1000);
        let mut headers = std::collections::BTreeMap::new();
        headers.insert("date".to_string(), created.to_rfc2822());
        headers.insert("etag".to_string(), "\"old\"".to_string());
        let stale = CachedEntry {
            body: b"{\"fresh\":false}".to_vec(),
            headers,
        };
        h.store.store(&key, stale).await.unwrap();

        let response = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-cache"), Some("HIT"));
        assert_eq!(response.body().as_ref(), b"{\"fresh\":false}");
        // The response did not wait for the origin.
        assert_eq!(h.origin.calls(), 0);

        h.ctx.drain().await;
        assert_eq!(h.origin.calls(), 1);
        let refreshed = h.store.lookup(&key).await.unwrap().unwrap();
        assert_eq!(refreshed.body, b"{\"fresh\":true}");
    }

    #[tokio::test]
    async fn test_stale_conditional_match_still_304s_and_refreshes() {
        let h = harness(MockOrigin::serving("{\"fresh\":true}"));
        let timing = TimingRecorder::start();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");

        let created = Utc::now() - chrono::Duration::seconds(1000);
        let mut headers = std::collections::BTreeMap::new();
        headers.insert("date".to_string(), created.to_rfc2822());
        headers.insert("etag".to_string(), "\"old\"".to_string());
        h.store
            .store(
                &key,
                CachedEntry {
                    body: b"{}".to_vec(),
                    headers,
                },
            )
            .await
            .unwrap();

        let response = h
            .cache
            .handle(&get_conditional("/api/v1/pride-data", "\"old\""), &timing)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.body().is_empty());

        h.ctx.drain().await;
        assert_eq!(h.origin.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_secret_bypasses_fresh_cache() {
        let h = harness(MockOrigin::serving("{\"n\":1}"));
        let timing = TimingRecorder::start();

        h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        h.ctx.drain().await;
        assert_eq!(h.origin.calls(), 1);

        let response = h
            .cache
            .handle(&get("/api/v1/pride-data?refresh=s3cret"), &timing)
            .await;
        assert_eq!(header(&response, "x-cache"), Some("MISS"));
        assert_eq!(h.origin.calls(), 2);
    }

    #[tokio::test]
    async fn test_wrong_refresh_secret_does_not_bypass() {
        let h = harness(MockOrigin::serving("{\"n\":1}"));
        let timing = TimingRecorder::start();

        h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        h.ctx.drain().await;

        let response = h
            .cache
            .handle(&get("/api/v1/pride-data?refresh=wrong"), &timing)
            .await;
        assert_eq!(header(&response, "x-cache"), Some("HIT"));
        assert_eq!(h.origin.calls(), 1);
    }

    #[tokio::test]
    async fn test_origin_failure_yields_branded_503_and_is_not_cached() {
        let h = harness(MockOrigin::failing());
        let timing = TimingRecorder::start();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");

        let response = h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            header(&response, "cache-control"),
            Some("no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0")
        );
        assert_eq!(header(&response, "x-cache"), Some("MISS"));

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Service Unavailable");
        assert!(body["message"].as_str().is_some());

        h.ctx.drain().await;
        assert!(!h.store.contains(&key).await);
    }

    #[tokio::test]
    async fn test_lookup_measured_under_one_label() {
        let h = harness(MockOrigin::serving("{}"));
        let timing = TimingRecorder::start();

        h.cache.handle(&get("/api/v1/pride-data"), &timing).await;
        h.ctx.drain().await;
        h.cache.handle(&get("/api/v1/pride-data"), &timing).await;

        let labels: Vec<String> = timing.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels.iter().filter(|l| l.as_str() == "cache_lookup").count(),
            1
        );
        assert!(labels.contains(&"origin_fetch".to_string()));
    }
}
