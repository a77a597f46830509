//! Request middleware: request ids, bearer-key auth, and a per-client
//! rate limiter. Rejections are built through the [`ApiError`] envelope so
//! an error body looks the same whether it came from middleware or a
//! handler.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried through request extensions and echoed on the
/// response. Incoming `x-request-id` headers are honored so ids survive
/// proxy hops; otherwise a fresh `UUIDv4` is minted.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(incoming) if !incoming.is_empty() => incoming.to_string(),
        _ => Uuid::new_v4().to_string(),
    };
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// The request-id layer wraps everything, so the extension is present by
/// the time auth and rate limiting run.
fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

/// Bearer-key auth, configured from `DEALHAWK_API_KEYS` (comma-separated
/// tokens).
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No keys configured; every request passes. Development only.
    Disabled,
    Keys(Arc<HashSet<String>>),
}

impl AuthState {
    /// Reads the key set from the environment. An empty or missing set
    /// disables auth in development and fails startup everywhere else.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let keys = parse_keys(&std::env::var("DEALHAWK_API_KEYS").unwrap_or_default());
        if !keys.is_empty() {
            return Ok(Self::Keys(Arc::new(keys)));
        }
        if is_development {
            tracing::warn!("DEALHAWK_API_KEYS not set; bearer auth disabled in development");
            return Ok(Self::Disabled);
        }
        anyhow::bail!(
            "DEALHAWK_API_KEYS is required outside development; provide comma-separated bearer tokens"
        )
    }

    fn allows(&self, token: &str) -> bool {
        match self {
            Self::Disabled => true,
            Self::Keys(keys) => keys.contains(token),
        }
    }
}

fn parse_keys(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if matches!(auth, AuthState::Disabled) {
        return next.run(req).await;
    }

    let authorized = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .is_some_and(|token| auth.allows(token));

    if authorized {
        next.run(req).await
    } else {
        ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response()
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let token = value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

struct Window {
    started_at: Instant,
    count: usize,
}

/// Fixed-window request limiter with one window per client, so a single
/// noisy caller cannot starve everyone else.
#[derive(Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request against `key`'s current window; `false` means
    /// the window is exhausted.
    async fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Expired windows are dropped wholesale before inserting, which
        // both resets finished windows and keeps the map bounded by the
        // number of currently active clients.
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if limiter.try_acquire(&key).await {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, "rate limit exceeded");
        ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded").into_response()
    }
}

/// Client identity for rate limiting: the first `x-forwarded-for` hop when
/// a proxy set one, otherwise the peer address.
fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    if let Some(hop) = forwarded {
        return hop.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}
