//! Unit tests for refresh session entity

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{
    RefreshSession, RevocationReason, SessionMetadata, SessionState,
};

fn session() -> RefreshSession {
    RefreshSession::new(
        Uuid::new_v4(),
        Uuid::new_v4().to_string(),
        "hash".to_string(),
        SessionMetadata::new()
            .with_device_id("phone-1")
            .with_ip("10.0.0.1")
            .with_user_agent("test-agent"),
        Utc::now(),
        Duration::days(7),
    )
}

#[test]
fn test_new_session_is_active() {
    let session = session();
    let now = session.created_at;

    assert!(session.is_valid_at(now));
    assert_eq!(session.state_at(now), SessionState::Active);
    assert_eq!(session.device_id(), Some("phone-1"));
    assert_eq!(session.ip_address.as_deref(), Some("10.0.0.1"));
}

#[test]
fn test_revoke_happens_once() {
    let mut session = session();
    let now = Utc::now();

    assert!(session.revoke(RevocationReason::Logout, now));
    assert!(!session.revoke(RevocationReason::LogoutAll, now));
    assert_eq!(session.revoked_reason.as_deref(), Some("logout"));
    assert_eq!(session.state_at(now), SessionState::Revoked);
    assert!(!session.is_valid_at(now));
}

#[test]
fn test_rotation_state() {
    let mut session = session();
    let now = Utc::now();
    session.revoke(RevocationReason::Rotation, now);
    assert_eq!(session.state_at(now), SessionState::Rotated);
}

#[test]
fn test_expired_state() {
    let session = session();
    let later = session.expires_at + Duration::seconds(1);
    assert_eq!(session.state_at(later), SessionState::Expired);
    assert!(!session.is_valid_at(session.expires_at));
}

#[test]
fn test_view_has_no_token_material() {
    let session = session();
    let json = serde_json::to_value(session.to_view()).unwrap();
    assert!(json.get("token_hash").is_none());
    assert!(json.get("jti").is_none());
    assert_eq!(json["device_info"]["device_id"], "phone-1");
}

#[test]
fn test_reason_round_trips_through_str() {
    for reason in [
        RevocationReason::Logout,
        RevocationReason::PasswordChange,
        RevocationReason::AccountDeletion,
        RevocationReason::DeviceLogout,
    ] {
        assert_eq!(reason.as_str().parse::<RevocationReason>().unwrap(), reason);
    }
    assert!("stolen".parse::<RevocationReason>().is_err());
}

#[test]
fn test_unrepresentable_expiry_saturates() {
    let session = RefreshSession::new(
        Uuid::new_v4(),
        Uuid::new_v4().to_string(),
        "hash".to_string(),
        SessionMetadata::new(),
        Utc::now(),
        Duration::days(365 * 300_000),
    );
    assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
    assert!(session.is_valid_at(Utc::now()));
}
