use serde::Serialize;

/// Snapshot of one active session, as shown by the `status` builtin and
/// the administrative surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionBrief {
    pub session_id: String,
    pub state: String,
    pub started_at_ms: u64,
    pub reconnect_attempts: u32,
}

/// Describes the currently active sessions.
///
/// Implemented by the session registry; the trait lives here so builtins
/// can consult it without a dependency cycle.
pub trait SessionStatusSource: Send + Sync {
    fn sessions(&self) -> Vec<SessionBrief>;
}
