use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, error};
use uuid::Uuid;

use murmur_types::api::Claims;
use murmur_types::models::User;

use crate::error::CoreError;

/// Issues and checks signed session tokens.
///
/// Tokens are stateless except for logout: a revoked token's `jti` is kept
/// until the token would have expired anyway.
pub struct SessionManager {
    secret: String,
    ttl: Duration,
    revoked: Mutex<HashMap<String, usize>>,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            revoked: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, CoreError> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: (Utc::now() + self.ttl).timestamp().max(0) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to sign session token: {}", e);
            CoreError::Internal
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, CoreError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!("Rejected session token: {}", e);
            CoreError::Auth
        })?;

        let revoked = self.revoked.lock().map_err(|_| CoreError::Internal)?;
        if revoked.contains_key(&token_data.claims.jti) {
            debug!(user_id = token_data.claims.sub, "Rejected revoked session token");
            return Err(CoreError::Auth);
        }

        Ok(token_data.claims)
    }

    /// End the session behind `claims`.
    pub fn revoke(&self, claims: &Claims) -> Result<(), CoreError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let mut revoked = self.revoked.lock().map_err(|_| CoreError::Internal)?;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
        debug!(user_id = claims.sub, "Session revoked");
        Ok(())
    }
}
