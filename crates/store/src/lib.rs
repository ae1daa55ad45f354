//! Credential persistence for chat-account sessions.
//!
//! The store is deliberately forgiving: every operation degrades instead of
//! failing. `connect()` never errors, writes report success as a bool, and
//! reads return `None` both for absent records and for an unreachable
//! database, so a store outage costs durability but never a session.

pub mod monitor;

use {
    serde::{Deserialize, Serialize},
    sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions},
    tokio::sync::{Notify, RwLock},
    tracing::{debug, warn},
};

use {flock_common::now_ms, flock_config::StoreSettings, flock_wire::AuthState};

pub use monitor::spawn_monitor;

/// One persisted credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub session_id: String,
    pub auth: AuthState,
    pub updated_at_ms: i64,
    pub last_activity_ms: i64,
    pub status: String,
}

/// SQLite-backed credential store shared by all sessions.
///
/// One connection pool serves concurrent upserts to distinct session ids
/// without cross-session interference.
pub struct CredentialStore {
    settings: StoreSettings,
    pool: RwLock<Option<SqlitePool>>,
    retrigger: Notify,
}

impl CredentialStore {
    /// Create a disconnected store. Call [`connect`](Self::connect) (or let
    /// the [`monitor`] do it) before expecting durability.
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            pool: RwLock::new(None),
            retrigger: Notify::new(),
        }
    }

    /// Attempt to connect and run migrations. Idempotent; returns whether
    /// the store is connected afterwards. Failure leaves the store in
    /// degraded (non-durable) mode and is reported only through logs.
    pub async fn connect(&self) -> bool {
        let mut pool = self.pool.write().await;
        if pool.is_some() {
            return true;
        }

        let connected = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&self.settings.database_url)
            .await;

        match connected {
            Ok(p) => {
                if let Err(e) = run_migrations(&p).await {
                    warn!(error = %e, "credential store migration failed");
                    return false;
                }
                debug!(url = %self.settings.database_url, "credential store connected");
                *pool = Some(p);
                true
            },
            Err(e) => {
                warn!(
                    url = %self.settings.database_url,
                    error = %e,
                    "credential store unreachable, continuing without durability"
                );
                false
            },
        }
    }

    /// Whether the store currently holds a live pool.
    pub async fn is_connected(&self) -> bool {
        self.pool.read().await.is_some()
    }

    /// Re-arm the reconnection monitor after its attempt budget ran out.
    pub fn retrigger(&self) {
        self.retrigger.notify_one();
    }

    pub(crate) async fn retriggered(&self) {
        self.retrigger.notified().await;
    }

    pub(crate) fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Upsert the credential record for `session_id`. Returns `false` on
    /// any failure, including degraded mode; never errors.
    pub async fn save_session(&self, session_id: &str, auth: &AuthState) -> bool {
        let Some(pool) = self.pool.read().await.clone() else {
            debug!(session_id, "save skipped: credential store not connected");
            return false;
        };

        let (credentials, key_material) = match (
            serde_json::to_string(&auth.credentials),
            serde_json::to_string(&auth.key_material),
        ) {
            (Ok(c), Ok(k)) => (c, k),
            _ => {
                warn!(session_id, "failed to serialize auth state");
                return false;
            },
        };

        let now = now_ms() as i64;
        let result = sqlx::query(
            "INSERT INTO session_credentials
               (session_id, credentials, key_material, updated_at_ms, last_activity_ms, status)
             VALUES (?, ?, ?, ?, ?, 'active')
             ON CONFLICT(session_id) DO UPDATE SET
               credentials      = excluded.credentials,
               key_material     = excluded.key_material,
               updated_at_ms    = excluded.updated_at_ms,
               last_activity_ms = excluded.last_activity_ms,
               status           = excluded.status",
        )
        .bind(session_id)
        .bind(&credentials)
        .bind(&key_material)
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(session_id, error = %e, "failed to save session credentials");
                false
            },
        }
    }

    /// Fetch the credential record for `session_id`. Returns `None` both
    /// when absent and when the store is unreachable.
    pub async fn get_session(&self, session_id: &str) -> Option<CredentialRecord> {
        let pool = self.pool.read().await.clone()?;

        let row = sqlx::query(
            "SELECT session_id, credentials, key_material, updated_at_ms, last_activity_ms, status
             FROM session_credentials WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&pool)
        .await;

        let row = match row {
            Ok(r) => r?,
            Err(e) => {
                warn!(session_id, error = %e, "failed to load session credentials");
                return None;
            },
        };

        let credentials: String = row.get("credentials");
        let key_material: String = row.get("key_material");
        let auth = match (
            serde_json::from_str(&credentials),
            serde_json::from_str(&key_material),
        ) {
            (Ok(c), Ok(k)) => AuthState {
                credentials: c,
                key_material: k,
            },
            _ => {
                warn!(session_id, "stored auth state is malformed, ignoring");
                return None;
            },
        };

        Some(CredentialRecord {
            session_id: row.get("session_id"),
            auth,
            updated_at_ms: row.get("updated_at_ms"),
            last_activity_ms: row.get("last_activity_ms"),
            status: row.get("status"),
        })
    }

    /// Delete the record for `session_id` (explicit logout/cleanup only).
    /// Returns whether a record was removed.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let Some(pool) = self.pool.read().await.clone() else {
            return false;
        };

        match sqlx::query("DELETE FROM session_credentials WHERE session_id = ?")
            .bind(session_id)
            .execute(&pool)
            .await
        {
            Ok(r) => r.rows_affected() > 0,
            Err(e) => {
                warn!(session_id, error = %e, "failed to delete session credentials");
                false
            },
        }
    }

    /// Best-effort status update for `session_id`.
    pub async fn set_status(&self, session_id: &str, status: &str) -> bool {
        let Some(pool) = self.pool.read().await.clone() else {
            return false;
        };

        match sqlx::query(
            "UPDATE session_credentials SET status = ?, last_activity_ms = ? WHERE session_id = ?",
        )
        .bind(status)
        .bind(now_ms() as i64)
        .bind(session_id)
        .execute(&pool)
        .await
        {
            Ok(r) => r.rows_affected() > 0,
            Err(e) => {
                warn!(session_id, error = %e, "failed to update session status");
                false
            },
        }
    }
}

async fn run_migrations(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS session_credentials (
            session_id       TEXT PRIMARY KEY,
            credentials      TEXT NOT NULL,
            key_material     TEXT NOT NULL,
            updated_at_ms    INTEGER NOT NULL,
            last_activity_ms INTEGER NOT NULL,
            status           TEXT NOT NULL DEFAULT 'active'
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
