//! JWT encoding and decoding

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::entities::token::{Claims, IssuedToken, TokenType};
use crate::domain::entities::user::TokenSubject;
use sg_shared::utils::validation::not_blank;

use crate::errors::{DomainError, TokenError};

use super::config::TokenConfig;
use super::key_manager::Rs256KeyManager;

/// Hex SHA-256 of a token string
///
/// Refresh tokens are stored under this hash and single-use markers are keyed
/// by it, so raw tokens never reach a store.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signs and parses JWTs with one fixed algorithm and key
///
/// Parsing checks signature, algorithm, issuer and audience only. Expiry is
/// judged by [`super::TokenVerifier`] against the injected clock.
pub struct TokenCodec {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.config.algorithm)
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec, loading RS256 keys from disk when configured
    pub fn new(config: TokenConfig) -> Result<Self, DomainError> {
        match config.load_key_manager()? {
            Some(manager) => Ok(Self::with_rs256_keys(config, manager)),
            None => {
                let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
                let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
                Ok(Self::build(config, encoding_key, decoding_key))
            }
        }
    }

    /// Creates an RS256 codec with an already loaded key pair
    pub fn with_rs256_keys(mut config: TokenConfig, key_manager: Rs256KeyManager) -> Self {
        config.algorithm = Algorithm::RS256;
        let encoding_key = key_manager.encoding_key().clone();
        let decoding_key = key_manager.decoding_key().clone();
        Self::build(config, encoding_key, decoding_key)
    }

    fn build(config: TokenConfig, encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    /// Signs `claims` as-is
    ///
    /// Fails with [`TokenError::Encoding`] when a required claim is empty, the
    /// expiry does not follow the issue time, or a refresh token lacks a `jti`.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        check_claims(claims)?;

        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key).map_err(|e| TokenError::Encoding {
            message: e.to_string(),
        })
    }

    /// Builds claims for `subject` and signs them
    pub fn issue(
        &self,
        subject: &TokenSubject,
        token_type: TokenType,
        jti: Option<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::for_subject(
            subject,
            token_type,
            jti,
            issued_at,
            ttl,
            &self.config.issuer,
            &self.config.audience,
        )?;
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Decodes a token and checks its signature, algorithm, issuer and audience
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName
                    | ErrorKind::InvalidIssuer
                    | ErrorKind::InvalidAudience
                    | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
                    _ => TokenError::Malformed,
                };
                debug!(reason = ?e.kind(), kind = error.kind(), "Token parse failed");
                error
            })
    }

    /// Blacklist key of a token: its `jti`, or the token hash when it has none
    pub fn token_identifier(token: &str, claims: &Claims) -> String {
        match &claims.jti {
            Some(jti) if !jti.is_empty() => jti.clone(),
            _ => hash_token(token),
        }
    }
}

fn check_claims(claims: &Claims) -> Result<(), TokenError> {
    let missing = if !not_blank(&claims.sub) {
        Some("sub")
    } else if !not_blank(&claims.email) {
        Some("email")
    } else if !not_blank(&claims.iss) {
        Some("iss")
    } else if !not_blank(&claims.aud) {
        Some("aud")
    } else if claims.token_type == TokenType::Refresh
        && !claims.jti.as_deref().map(not_blank).unwrap_or(false)
    {
        Some("jti")
    } else {
        None
    };

    if let Some(claim) = missing {
        return Err(TokenError::Encoding {
            message: format!("missing required claim: {}", claim),
        });
    }

    if claims.exp <= claims.iat {
        return Err(TokenError::Encoding {
            message: "expiry must be after issue time".to_string(),
        });
    }

    Ok(())
}
