use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::Role;
use crate::entities::user_profile::{self, Entity as UserProfile};
use crate::errors::ServiceError;

/// Service for operator profiles. There is no authentication here: identity
/// arrives from the upstream proxy and this table only supplies the display
/// name and role claim.
#[derive(Clone)]
pub struct ProfileService {
    db_pool: Arc<DbPool>,
}

impl ProfileService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<user_profile::Model>, ServiceError> {
        let db = &*self.db_pool;
        let profiles = UserProfile::find()
            .order_by_asc(user_profile::Column::FullName)
            .all(db)
            .await?;
        Ok(profiles)
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(
        &self,
        email: &str,
    ) -> Result<Option<user_profile::Model>, ServiceError> {
        let db = &*self.db_pool;
        let profile = UserProfile::find()
            .filter(user_profile::Column::Email.eq(email.to_lowercase()))
            .one(db)
            .await?;
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
    ) -> Result<user_profile::Model, ServiceError> {
        let db = &*self.db_pool;
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::Validation("email must not be empty".into()));
        }
        if self.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "profile {email} already exists"
            )));
        }

        let profile = user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            full_name: Set(full_name.trim().to_string()),
            role: Set(role.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        full_name: Option<String>,
        role: Option<Role>,
    ) -> Result<user_profile::Model, ServiceError> {
        let db = &*self.db_pool;
        let profile = UserProfile::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("profile {id} not found")))?;

        let mut active: user_profile::ActiveModel = profile.into();
        if let Some(name) = full_name {
            active.full_name = Set(name.trim().to_string());
        }
        if let Some(role) = role {
            active.role = Set(role.to_string());
        }
        Ok(active.update(db).await?)
    }
}
