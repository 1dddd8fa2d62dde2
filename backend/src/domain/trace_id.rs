//! Per-request correlation id.
//!
//! One [`TraceId`] is minted for every HTTP request. While the handler runs it
//! sits in a tokio task-local, so [`crate::domain::Error`] constructors and log
//! lines can reach it without an extra parameter. It leaves the process twice:
//! in the [`TRACE_ID_HEADER`] response header and as `traceId` in failure
//! envelopes.
//!
//! Task-locals do not follow `tokio::spawn`; re-enter [`TraceId::scope`] in
//! spawned work that should stay correlated.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use tracing::{Span, info_span};
use uuid::Uuid;

/// Response header echoing the request's [`TraceId`].
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Correlation id for one request, rendered as a hyphenated UUID.
///
/// ```
/// use ebuddy_backend::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id = TraceId::generate();
/// assert_eq!(TraceId::current(), None);
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the request being served, or `None` outside one.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }

    /// The `request` span every log line of this request is recorded under.
    pub fn request_span(&self, method: &str, path: &str) -> Span {
        info_span!("request", trace_id = %self, method, path)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self)
    }
}
