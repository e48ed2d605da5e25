//! Per-request pipeline composition.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

use pride_cache::{CacheStore, MemoryStore, SwrCache};
use pride_core::{Config, ExecutionContext, OriginHandler, Request, Response, TimingRecorder};
use pride_data::PrideDataHandler;
use pride_observability::{server_timing, Logger};

use crate::router::{RouteTarget, Router};
use crate::tasks::TokioSpawner;

/// Path serving the cached festival data payload.
pub const PRIDE_DATA_PATH: &str = "/api/v1/pride-data";

/// The assembled edge service.
///
/// Owns the validated configuration, the cache layer, and the detached
/// task context. Every response leaves through the timing pipeline:
/// measurements accumulated during the request are serialized into
/// `Server-Timing` and, for matched routes, logged as one structured
/// event.
pub struct App<S: CacheStore + 'static, H: OriginHandler + 'static> {
    router: Router,
    cache: SwrCache<S, H>,
    ctx: Arc<TokioSpawner>,
    timing_log: Logger,
}

impl<S, H> App<S, H>
where
    S: CacheStore + 'static,
    H: OriginHandler + 'static,
{
    /// Assemble the service for one deployment.
    pub fn new(config: Config, store: Arc<S>, origin: Arc<H>) -> Self {
        let config = Arc::new(config);
        let ctx = Arc::new(TokioSpawner::new());
        let cache = SwrCache::new(
            store,
            origin,
            Arc::clone(&ctx) as Arc<dyn ExecutionContext>,
            Arc::clone(&config),
        );
        let timing_log = Logger::new(&config, "timing");
        let router = Router::new().route(PRIDE_DATA_PATH, RouteTarget::PrideData);
        Self {
            router,
            cache,
            ctx,
            timing_log,
        }
    }

    /// Handle one request end to end.
    pub async fn handle(&self, request: Request) -> Response {
        let timing = TimingRecorder::start();

        let mut response = match self.router.find(request.uri().path()) {
            Some(RouteTarget::PrideData) => self.cache.handle(&request, &timing).await,
            None => not_found(),
        };

        // Unmatched routes stay out of the timing log but still carry the
        // header.
        if response.status() != StatusCode::NOT_FOUND {
            self.timing_log
                .info_meta("server-timing", server_timing::metrics_value(&timing));
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(server_timing::SERVER_TIMING),
            HeaderValue::try_from(server_timing::header_value(&timing)),
        ) {
            response.headers_mut().insert(name, value);
        }
        response
    }

    /// The execution context driving detached background work.
    pub fn execution_context(&self) -> &Arc<TokioSpawner> {
        &self.ctx
    }
}

/// Assemble the service with the spreadsheet-backed origin and the
/// in-memory store.
pub fn pride_app(config: Config) -> App<MemoryStore, PrideDataHandler> {
    App::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(PrideDataHandler::new()),
    )
}

fn not_found() -> Response {
    let mut response = http::Response::new(Bytes::from_static(b"Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
