use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{ProfileUpdate, User};

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        caller_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, DomainError> {
        let update = update.validated()?;
        self.repo
            .update_profile(caller_id, update)
            .await?
            .ok_or(DomainError::UserNotFound(caller_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryUserRepository;

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = repo
            .create(User::new(
                "Ada".into(),
                "a@x.com".into(),
                "hash".into(),
                Some("first".into()),
            ))
            .await
            .unwrap();
        let service = ProfileService::new(repo);

        let updated = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: Some("Ada Lovelace".into()),
                    bio: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.bio.as_deref(), Some("first"));
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(service.get_profile(user.id).await.unwrap().name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn unknown_caller_is_not_found() {
        let service = ProfileService::new(Arc::new(InMemoryUserRepository::new()));
        let result = service
            .update_profile(Uuid::new_v4(), ProfileUpdate::default())
            .await;
        assert!(matches!(result, Err(DomainError::UserNotFound(_))));
    }
}
