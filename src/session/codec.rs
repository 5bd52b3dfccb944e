//! Bearer token decoding.
//!
//! Two strategies exist and they are not equally strong:
//! - `Signature`: the HMAC-SHA256 signature is verified against a shared
//!   secret before any claim is trusted. This is the default.
//! - `Structural`: the token only has to be three non-empty dot-separated
//!   segments with a decodable payload. A forged cookie passes this check,
//!   so it is reserved for local development without a secret.
//!
//! Decoding never fails loudly. Anything wrong with a token (shape, payload,
//! signature, expiry) yields `None`.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::VerificationMode;

/// Account role carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Trainer,
    Nutritionist,
    Admin,
}

impl Role {
    /// Trainers and nutritionists.
    pub fn is_professional(self) -> bool {
        matches!(self, Role::Trainer | Role::Nutritionist)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Trainer => "TRAINER",
            Role::Nutritionist => "NUTRITIONIST",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity claims of a verified, unexpired token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub subject: String,
    pub email: String,
    pub role: Role,
    /// Seconds since the Unix epoch.
    pub issued_at: Option<u64>,
    /// Seconds since the Unix epoch.
    pub expires_at: Option<u64>,
}

impl Session {
    /// True when an expiry claim exists and lies strictly in the past.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        let Some(exp) = self.expires_at else {
            return false;
        };
        let now_ms = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        u128::from(exp) * 1000 < now_ms
    }
}

/// Wire shape of the token payload.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    iat: Option<u64>,
    exp: Option<u64>,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// True when the token has exactly three non-empty dot-separated segments.
pub fn is_well_formed(token: &str) -> bool {
    let mut segments = 0;
    for segment in token.split('.') {
        if segment.is_empty() {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

/// Decodes session tokens with one configured strategy.
#[derive(Clone)]
pub struct SessionCodec {
    mode: VerificationMode,
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Codec that verifies HMAC-SHA256 signatures with `secret`.
    pub fn with_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        relax_claim_checks(&mut validation);
        Self {
            mode: VerificationMode::Signature,
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Codec that trusts any well-formed token without checking its signature.
    pub fn structural() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        relax_claim_checks(&mut validation);
        validation.insecure_disable_signature_validation();
        Self {
            mode: VerificationMode::Structural,
            key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Decode a token into a live session, or `None`.
    pub fn decode(&self, token: &str) -> Option<Session> {
        self.decode_at(token, SystemTime::now())
    }

    /// Decode against an explicit clock.
    pub fn decode_at(&self, token: &str, now: SystemTime) -> Option<Session> {
        if !is_well_formed(token) {
            return None;
        }

        let data = match jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, mode = ?self.mode, "Rejected session token");
                return None;
            }
        };

        let session = Session::from(data.claims);
        if session.is_expired_at(now) {
            tracing::debug!(subject = %session.subject, "Session token expired");
            return None;
        }
        Some(session)
    }
}

// Expiry is checked by `Session::is_expired_at` so that tokens without an
// `exp` claim stay valid and there is no leeway.
fn relax_claim_checks(validation: &mut Validation) {
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
}
