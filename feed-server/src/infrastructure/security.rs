use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Clone)]
pub struct JwtKeys {
    secret: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: String, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.ttl.num_seconds()) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Resolves a bearer token to the user id it was issued for.
    pub fn identify(&self, token: &str) -> Result<Uuid, DomainError> {
        let claims = self
            .verify_token(token)
            .map_err(|_| DomainError::Unauthenticated)?;
        Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthenticated)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    let argon2 = Argon2::default();
    Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret".into(), Duration::hours(1))
    }

    fn sign(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_identifies_user() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.generate_token(user_id).unwrap();
        assert_eq!(keys.identify(&token).unwrap(), user_id);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = JwtKeys::new("other".into(), Duration::hours(1))
            .generate_token(Uuid::new_v4())
            .unwrap();
        assert!(matches!(
            keys().identify(&token),
            Err(DomainError::Unauthenticated)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(
            "test-secret",
            &Claims {
                sub: Uuid::new_v4().to_string(),
                exp: (now - 3600) as usize,
                iat: (now - 7200) as usize,
            },
        );
        assert!(keys().identify(&token).is_err());
    }

    #[test]
    fn malformed_token_or_subject_is_rejected() {
        assert!(keys().identify("not-a-jwt").is_err());

        let now = Utc::now().timestamp();
        let token = sign(
            "test-secret",
            &Claims {
                sub: "user-123".into(),
                exp: (now + 3600) as usize,
                iat: now as usize,
            },
        );
        assert!(keys().identify(&token).is_err());
    }

    #[test]
    fn password_hash_verifies_only_the_original_secret() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }
}
