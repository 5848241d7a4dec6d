//! Per-request context for correlation and tracing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Context attached to each HTTP request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Authenticated subject, once known.
    pub user: Option<String>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context for a request.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: method.into(),
            path: path.into(),
            user: None,
            started_at: Utc::now(),
        }
    }

    /// Use a caller-supplied request id (e.g. from `x-request-id`).
    #[must_use]
    pub fn with_request_id(mut self, id: Uuid) -> Self {
        self.request_id = id;
        self
    }

    /// Record the authenticated subject.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// A `request` span carrying the method, path and request id.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
        )
    }

    /// Start a guard that logs completion when dropped.
    #[must_use]
    pub fn guard(&self) -> RequestGuard {
        RequestGuard {
            context: self.clone(),
            status: None,
        }
    }
}

/// Logs request completion with status and latency on drop.
#[derive(Debug)]
pub struct RequestGuard {
    context: RequestContext,
    status: Option<u16>,
}

impl RequestGuard {
    /// Record the response status.
    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    /// The request this guard tracks.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.context.elapsed_ms();
        match self.status {
            Some(status) if status >= 500 => tracing::warn!(
                request_id = %self.context.request_id,
                status,
                elapsed_ms,
                "Request failed"
            ),
            Some(status) => tracing::info!(
                request_id = %self.context.request_id,
                status,
                elapsed_ms,
                "Request completed"
            ),
            None => tracing::warn!(
                request_id = %self.context.request_id,
                elapsed_ms,
                "Request dropped before a response was produced"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let ctx = RequestContext::new("GET", "/apps/app1");
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.path, "/apps/app1");
        assert!(ctx.user.is_none());
        assert!(ctx.elapsed_ms() >= 0);
    }

    #[test]
    fn test_unique_ids() {
        let a = RequestContext::new("GET", "/");
        let b = RequestContext::new("GET", "/");
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_builders() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::new("POST", "/login")
            .with_request_id(id)
            .with_user("jimmy");
        assert_eq!(ctx.request_id, id);
        assert_eq!(ctx.user.as_deref(), Some("jimmy"));
    }

    #[test]
    fn test_guard_records_status() {
        let ctx = RequestContext::new("GET", "/health");
        let mut guard = ctx.guard();
        guard.set_status(200);
        assert_eq!(guard.context().request_id, ctx.request_id);
        drop(guard);
    }
}
