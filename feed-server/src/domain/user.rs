use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, bio: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            bio,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
    }
}

/// Mutable part of a profile. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn validated(self) -> Result<Self, DomainError> {
        let name = self.name.map(|name| validate_name(&name)).transpose()?;
        Ok(Self {
            name,
            bio: self.bio,
        })
    }
}

/// Emails are compared case-insensitively, so they are stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name", "name is required"));
    }
    Ok(name.to_string())
}

pub fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::validation(
            "email",
            "please include a valid email",
        )),
    }
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}
