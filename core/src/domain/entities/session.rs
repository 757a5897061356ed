//! Refresh session entity and its lifecycle states.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque device description supplied by the client at login
pub type DeviceInfo = HashMap<String, serde_json::Value>;

/// Key inside [`DeviceInfo`] identifying a device across logins
pub const DEVICE_ID_KEY: &str = "device_id";

/// Request metadata recorded with every session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub device_info: DeviceInfo,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_info
            .insert(DEVICE_ID_KEY.to_string(), serde_json::Value::String(device_id.into()));
        self
    }

    pub fn with_device_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.device_info.insert(key.into(), value);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Why a session left the ACTIVE state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Logout,
    LogoutAll,
    PasswordChange,
    AccountDeletion,
    Rotation,
    DeviceLogout,
    Admin,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Logout => "logout",
            RevocationReason::LogoutAll => "logout_all",
            RevocationReason::PasswordChange => "password_change",
            RevocationReason::AccountDeletion => "account_deletion",
            RevocationReason::Rotation => "rotation",
            RevocationReason::DeviceLogout => "device_logout",
            RevocationReason::Admin => "admin",
        }
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logout" => Ok(RevocationReason::Logout),
            "logout_all" => Ok(RevocationReason::LogoutAll),
            "password_change" => Ok(RevocationReason::PasswordChange),
            "account_deletion" => Ok(RevocationReason::AccountDeletion),
            "rotation" => Ok(RevocationReason::Rotation),
            "device_logout" => Ok(RevocationReason::DeviceLogout),
            "admin" => Ok(RevocationReason::Admin),
            other => Err(format!("Unknown revocation reason: {}", other)),
        }
    }
}

/// Lifecycle state of a refresh session. Every state but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Active,
    Rotated,
    Revoked,
    Expired,
}

/// Persisted record of one issued refresh token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSession {
    /// Unique identifier for the session row
    pub id: Uuid,

    /// Owner of the session
    pub user_id: Uuid,

    /// `jti` claim of the refresh token
    pub jti: String,

    /// SHA-256 of the refresh token; the raw token is never stored
    pub token_hash: String,

    pub device_info: DeviceInfo,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,

    pub is_active: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
}

impl RefreshSession {
    /// Creates a new ACTIVE session
    ///
    /// An expiry past the representable range saturates.
    pub fn new(
        user_id: Uuid,
        jti: String,
        token_hash: String,
        metadata: SessionMetadata,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            jti,
            token_hash,
            device_info: metadata.device_info,
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
            created_at,
            expires_at: created_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_used_at: None,
            is_active: true,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    /// `isActive && revokedAt == null && now < expiresAt`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.revoked_at.is_none() && now < self.expires_at
    }

    /// Whether the ACTIVE→terminal transition has already happened
    pub fn is_revoked(&self) -> bool {
        !self.is_active || self.revoked_at.is_some()
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_revoked() {
            match self.revoked_reason.as_deref() {
                Some("rotation") => SessionState::Rotated,
                _ => SessionState::Revoked,
            }
        } else if now >= self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    /// Conditional revoke: only flips a session that has not been revoked yet.
    /// Returns whether this call performed the transition.
    pub fn revoke(&mut self, reason: RevocationReason, at: DateTime<Utc>) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.is_active = false;
        self.revoked_at = Some(at);
        self.revoked_reason = Some(reason.as_str().to_string());
        true
    }

    /// Device identifier from the device info map, if the client sent one
    pub fn device_id(&self) -> Option<&str> {
        self.device_info.get(DEVICE_ID_KEY).and_then(|v| v.as_str())
    }

    pub fn to_view(&self) -> SessionView {
        SessionView {
            id: self.id,
            device_info: self.device_info.clone(),
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            expires_at: self.expires_at,
        }
    }
}

/// What a user sees when listing their sessions; carries no token material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub device_info: DeviceInfo,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}
