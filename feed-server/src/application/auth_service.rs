use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::user::{
    User, normalize_email, validate_email, validate_name, validate_password,
};
use crate::domain::error::DomainError;
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

// Verified against when the email is unknown, so both login failures cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("feed-server-dummy-password").ok());

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        bio: Option<String>,
    ) -> Result<Session, DomainError> {
        let name = validate_name(&name)?;
        let email = validate_email(&email)?;
        validate_password(&password)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(DomainError::validation("email", "user already exists"));
        }

        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = self.repo.create(User::new(name, email, hash, bio)).await?;
        let token = self.issue(&user)?;

        info!(user_id = %user.id, "user registered");
        Ok(Session { user, token })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let Some(user) = self.repo.find_by_email(&normalize_email(email)).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(DomainError::InvalidCredentials);
        };

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(Session { user, token })
    }

    fn issue(&self, user: &User) -> Result<String, DomainError> {
        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}
