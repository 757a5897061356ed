//! MySQL implementation of the RefreshSessionStore trait.
//!
//! Rows live in a `refresh_sessions` table:
//!
//! ```sql
//! CREATE TABLE refresh_sessions (
//!     id             CHAR(36)     NOT NULL PRIMARY KEY,
//!     user_id        CHAR(36)     NOT NULL,
//!     jti            VARCHAR(64)  NOT NULL,
//!     token_hash     CHAR(64)     NOT NULL UNIQUE,
//!     device_info    TEXT         NOT NULL,
//!     ip_address     VARCHAR(45)  NULL,
//!     user_agent     VARCHAR(512) NULL,
//!     created_at     DATETIME(6)  NOT NULL,
//!     expires_at     DATETIME(6)  NOT NULL,
//!     last_used_at   DATETIME(6)  NULL,
//!     is_active      BOOLEAN      NOT NULL DEFAULT TRUE,
//!     revoked_at     DATETIME(6)  NULL,
//!     revoked_reason VARCHAR(32)  NULL,
//!     INDEX idx_refresh_sessions_user (user_id, is_active, expires_at)
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sg_core::domain::entities::session::{DeviceInfo, RefreshSession, RevocationReason};
use sg_core::errors::DomainError;
use sg_core::repositories::RefreshSessionStore;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, jti, token_hash, device_info, ip_address, user_agent,
           created_at, expires_at, last_used_at, is_active, revoked_at, revoked_reason
    FROM refresh_sessions
"#;

/// MySQL implementation of RefreshSessionStore
///
/// `revoke` is a single conditional `UPDATE`, so concurrent rotations of the
/// same token across instances have exactly one winner.
pub struct MySqlRefreshSessionStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshSessionStore {
    /// Create a new MySQL refresh session store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshSession entity
    fn row_to_session(row: &sqlx::mysql::MySqlRow) -> Result<RefreshSession, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::storage("Failed to get id", e))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| DomainError::storage("Failed to get user_id", e))?;
        let device_info: String = row
            .try_get("device_info")
            .map_err(|e| DomainError::storage("Failed to get device_info", e))?;

        Ok(RefreshSession {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::storage("Invalid session UUID", e))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::storage("Invalid user UUID", e))?,
            jti: row
                .try_get("jti")
                .map_err(|e| DomainError::storage("Failed to get jti", e))?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| DomainError::storage("Failed to get token_hash", e))?,
            device_info: decode_device_info(&device_info)?,
            ip_address: row
                .try_get("ip_address")
                .map_err(|e| DomainError::storage("Failed to get ip_address", e))?,
            user_agent: row
                .try_get("user_agent")
                .map_err(|e| DomainError::storage("Failed to get user_agent", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::storage("Failed to get created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::storage("Failed to get expires_at", e))?,
            last_used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_used_at")
                .map_err(|e| DomainError::storage("Failed to get last_used_at", e))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| DomainError::storage("Failed to get is_active", e))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| DomainError::storage("Failed to get revoked_at", e))?,
            revoked_reason: row
                .try_get("revoked_reason")
                .map_err(|e| DomainError::storage("Failed to get revoked_reason", e))?,
        })
    }

    fn rows_to_sessions(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<RefreshSession>, DomainError> {
        rows.iter().map(Self::row_to_session).collect()
    }
}

/// Device info is stored as a JSON document in a text column
pub(crate) fn encode_device_info(info: &DeviceInfo) -> Result<String, DomainError> {
    serde_json::to_string(info).map_err(|e| DomainError::storage("Failed to encode device_info", e))
}

pub(crate) fn decode_device_info(raw: &str) -> Result<DeviceInfo, DomainError> {
    if raw.trim().is_empty() {
        return Ok(DeviceInfo::new());
    }
    serde_json::from_str(raw).map_err(|e| DomainError::storage("Invalid device_info", e))
}

#[async_trait]
impl RefreshSessionStore for MySqlRefreshSessionStore {
    async fn create(&self, session: RefreshSession) -> Result<Uuid, DomainError> {
        let query = r#"
            INSERT INTO refresh_sessions (
                id, user_id, jti, token_hash, device_info, ip_address, user_agent,
                created_at, expires_at, last_used_at, is_active, revoked_at, revoked_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(&session.jti)
            .bind(&session.token_hash)
            .bind(encode_device_info(&session.device_info)?)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .bind(session.created_at)
            .bind(session.expires_at)
            .bind(session.last_used_at)
            .bind(session.is_active)
            .bind(session.revoked_at)
            .bind(&session.revoked_reason)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to save refresh session", e))?;

        Ok(session.id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find session by id", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find session by token", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_active = TRUE AND revoked_at IS NULL AND expires_at > ? \
             ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find user sessions", e))?;

        Self::rows_to_sessions(&rows)
    }

    async fn find_active_by_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_active = TRUE AND revoked_at IS NULL AND expires_at > ? \
             AND JSON_UNQUOTE(JSON_EXTRACT(device_info, '$.device_id')) = ? \
             ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find device sessions", e))?;

        Self::rows_to_sessions(&rows)
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_sessions
            SET is_active = FALSE, revoked_at = ?, revoked_reason = ?
            WHERE id = ? AND is_active = TRUE AND revoked_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(reason.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to revoke session", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE refresh_sessions
            SET is_active = FALSE, revoked_at = ?, revoked_reason = ?
            WHERE user_id = ? AND is_active = TRUE AND revoked_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(reason.as_str())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to revoke user sessions", e))?;

        Ok(result.rows_affected())
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE refresh_sessions SET last_used_at = ? WHERE id = ?")
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to update last_used_at", e))?;

        Ok(())
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let query = r#"
            DELETE FROM refresh_sessions
            WHERE expires_at < ? OR (revoked_at IS NOT NULL AND revoked_at < ?)
        "#;

        let result = sqlx::query(query)
            .bind(cutoff)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to delete stale sessions", e))?;

        Ok(result.rows_affected())
    }
}
