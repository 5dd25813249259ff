//! Response cache middleware.
//!
//! Wraps a route: serves stored payloads on a hit, otherwise runs the handler
//! and stores its JSON payload when the payload's `success` field is truthy.
//! The payload the caller receives is never altered on a miss; on a hit it
//! gains `cached: true` and a `cacheTime` timestamp.
//!
//! Only GET requests take part; every other method goes straight to the
//! handler without a lookup. Concurrent misses for the same key all reach
//! the handler unless the cache was built with
//! [`ResponseCache::with_single_flight`].

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{Flight, FlightGroup, FlightGuard, SharedStore};
use crate::error::AppError;

// == Key Policy ==
/// How a request URI becomes a cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Path and query exactly as received. Reordered or re-cased query
    /// parameters produce distinct keys.
    #[default]
    Raw,
    /// Path plus query pairs sorted by their raw `name=value` text.
    /// Pairs are not decoded, so casing still matters.
    SortedQuery,
}

impl KeyPolicy {
    pub fn cache_key(self, uri: &Uri) -> String {
        match self {
            KeyPolicy::Raw => uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            KeyPolicy::SortedQuery => {
                let mut pairs: Vec<&str> = uri
                    .query()
                    .unwrap_or("")
                    .split('&')
                    .filter(|pair| !pair.is_empty())
                    .collect();
                if pairs.is_empty() {
                    return uri.path().to_string();
                }
                pairs.sort_unstable();
                format!("{}?{}", uri.path(), pairs.join("&"))
            }
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(KeyPolicy::Raw),
            "sorted" | "sorted-query" => Ok(KeyPolicy::SortedQuery),
            other => Err(format!("unknown cache key policy '{}'", other)),
        }
    }
}

// == Response Cache ==
/// Middleware state: which store to use and how to cache into it.
///
/// Cheap to clone; clones made with [`ResponseCache::with_ttl`] share the
/// store and the in-flight registry.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    store: SharedStore,
    ttl: Option<u64>,
    key_policy: KeyPolicy,
    flights: Option<Arc<FlightGroup>>,
}

impl ResponseCache {
    /// Caches into `store` with its default TTL and raw keys.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            ttl: None,
            key_policy: KeyPolicy::Raw,
            flights: None,
        }
    }

    /// Same cache, but entries written through it use `ttl_seconds`.
    pub fn with_ttl(&self, ttl_seconds: u64) -> Self {
        Self {
            ttl: Some(ttl_seconds),
            ..self.clone()
        }
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    /// Opt in to coalescing concurrent misses for the same key.
    pub fn with_single_flight(mut self) -> Self {
        self.flights = Some(Arc::new(FlightGroup::new()));
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Derives the cache key from the URI the client actually sent, before
    /// any router nesting stripped a prefix.
    pub fn key_for(&self, request: &Request) -> String {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or_else(|| request.uri());
        self.key_policy.cache_key(uri)
    }

    async fn lookup(&self, key: &str) -> Option<Value> {
        self.store.write().await.get(key)
    }

    /// Lookup that only counts when it finds a live entry, so a leader's
    /// re-check after a real miss does not count a second miss.
    async fn recheck(&self, key: &str) -> Option<Value> {
        let mut store = self.store.write().await;
        if store.contains_live(key) {
            store.get(key)
        } else {
            None
        }
    }

    /// Decides, after a miss, whether this request runs the handler.
    ///
    /// Without single-flight every miss runs. With it, a new leader re-checks
    /// the store first: the previous leader may have stored the value between
    /// our miss and our join. Followers wait for the leader, then either
    /// serve what it stored or run the handler themselves.
    async fn claim(&self, key: &str) -> Claim {
        let Some(flights) = self.flights.as_ref() else {
            return Claim::Run(None);
        };

        match flights.join(key) {
            Flight::Leader(guard) => match self.recheck(key).await {
                Some(hit) => Claim::Hit(hit),
                None => Claim::Run(Some(guard)),
            },
            Flight::Follower(waiter) => {
                waiter.wait().await;
                match self.lookup(key).await {
                    Some(hit) => Claim::Hit(hit),
                    None => Claim::Run(None),
                }
            }
        }
    }

    /// Buffers a handler response, storing its payload if cacheable, and
    /// hands back an equivalent response.
    async fn capture(&self, key: &str, response: Response) -> Response {
        if !response.status().is_success() {
            return response;
        }
        if !is_json(response.headers()) {
            debug!("Not caching {}: not a JSON response", key);
            return response;
        }

        let (parts, body) = response.into_parts();
        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Failed to read response body for {}: {}", key, err);
                return AppError::Internal(err.to_string()).into_response();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(payload) if is_cacheable(&payload) => {
                let mut store = self.store.write().await;
                let ttl = self.ttl.unwrap_or_else(|| store.default_ttl());
                store.set(key, payload, Some(ttl));
                info!("Stored in cache: {} (TTL: {}s)", key, ttl);
            }
            _ => debug!("Not caching {}: unsuccessful payload", key),
        }

        Response::from_parts(parts, Body::from(bytes))
    }
}

/// Axum middleware entry point; install with
/// `axum::middleware::from_fn_with_state(cache, response_cache)`.
pub async fn response_cache(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }
    let key = cache.key_for(&request);

    if let Some(hit) = cache.lookup(&key).await {
        debug!("Cache HIT for: {}", key);
        return hit_response(hit);
    }
    debug!("Cache MISS for: {}", key);

    let _leader = match cache.claim(&key).await {
        Claim::Hit(hit) => {
            debug!("Cache HIT for: {} (coalesced)", key);
            return hit_response(hit);
        }
        Claim::Run(guard) => guard,
    };

    let response = next.run(request).await;
    cache.capture(&key, response).await
}

/// Outcome of [`ResponseCache::claim`].
enum Claim {
    /// Someone else stored the value meanwhile
    Hit(Value),
    /// Run the handler, holding the flight guard if this request leads
    Run(Option<FlightGuard>),
}

/// Renders a stored payload with the two informational hit fields added.
pub fn hit_response(mut payload: Value) -> Response {
    if let Value::Object(fields) = &mut payload {
        fields.insert("cached".to_string(), Value::Bool(true));
        fields.insert(
            "cacheTime".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }
    Json(payload).into_response()
}

/// A payload is cacheable when its `success` field is truthy.
pub fn is_cacheable(payload: &Value) -> bool {
    payload.get("success").is_some_and(is_truthy)
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}
