//! Domain entities of the token and session subsystem.

pub mod revocation;
pub mod session;
pub mod special_token;
pub mod token;
pub mod user;

#[cfg(test)]
mod tests;

pub use revocation::RevocationEntry;
pub use session::{
    DeviceInfo, RefreshSession, RevocationReason, SessionMetadata, SessionState, SessionView,
    DEVICE_ID_KEY,
};
pub use special_token::{SpecialTokenKind, SpecialTokenMarker};
pub use token::{Claims, IssuedToken, RotationResponse, TokenPair, TokenType, BEARER_TOKEN_TYPE};
pub use user::TokenSubject;
