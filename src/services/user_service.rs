use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::{User, UserChanges, UserRepository};
use crate::services::pagination::ListParams;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<User>, ServiceError> {
        Ok(self
            .user_repo
            .find_paginated(params.offset(), params.limit_or(50, 100))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Applies `changes` to a user. Only admins may change role or active status.
    #[instrument(skip(self, changes), fields(id = %id, by_admin = by_admin))]
    pub async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        by_admin: bool,
    ) -> Result<User, ServiceError> {
        if !by_admin && (changes.role.is_some() || changes.is_active.is_some()) {
            return Err(ServiceError::Forbidden(
                "Only admins can change role or active status".to_string(),
            ));
        }

        let mut user = self.get(id).await?;

        if let Some(username) = &changes.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(ServiceError::Invalid("Username must not be empty".to_string()));
            }
            user.username = username.to_string();
        }
        if let Some(email) = &changes.email {
            let email = email.trim();
            user.email = (!email.is_empty()).then(|| email.to_string());
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(panchayat_id) = changes.panchayat_id {
            user.panchayat_id = Some(panchayat_id);
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }

        self.user_repo
            .update(&user)
            .await
            .map_err(|e| ServiceError::from_write(e, "Username or email already registered"))
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.user_repo.delete(id).await? {
            return Err(ServiceError::not_found("User"));
        }
        info!("Deleted user {}", id);
        Ok(())
    }
}
