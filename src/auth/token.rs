use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Identifier of the user the token was issued to.
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token id, so two tokens issued in the same second still differ.
    pub jti: Uuid,
}

/// Signing material and lifetime for session tokens, built once from the config.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_hours: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_hours,
        }
    }

    /// Generates a signed token for `user_id`, expiring after the configured lifetime.
    ///
    /// # Returns
    /// The encoded JWT, or `AppError::InternalServerError` if encoding fails or the
    /// lifetime does not fit in a timestamp.
    pub fn generate_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expires_at = chrono::Duration::try_hours(self.lifetime_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "Token lifetime of {} hours is out of range",
                    self.lifetime_hours
                ))
            })?;
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of `token` and decodes its claims.
    ///
    /// This only proves the token was issued by this server. Whether it is still in
    /// the user's token list is checked by the auth middleware.
    ///
    /// # Returns
    /// The decoded `Claims`, or `AppError::Unauthorized` if the token is malformed,
    /// carries a bad signature, or has expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {:?}", e.kind())))
    }
}
