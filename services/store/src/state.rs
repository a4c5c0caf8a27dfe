use std::path::PathBuf;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use neurarig_auth_types::identity::JwtSecret;

use crate::infra::cache::MokaBuilderCache;
use crate::infra::db::{
    DbBrandRepository, DbCartRepository, DbCategoryRepository, DbOrderRepository,
    DbProductRepository, DbUserRepository,
};
use crate::infra::llm::OpenAiChatClient;
use crate::infra::password::Argon2Passwords;
use crate::infra::storage::LocalImageStorage;
use crate::usecase::builder::RetryPolicy;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub upload_dir: PathBuf,
    /// `None` when no LLM API key is configured.
    pub llm: Option<OpenAiChatClient>,
    pub llm_retry: RetryPolicy,
    pub builder_cache: MokaBuilderCache,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn brand_repo(&self) -> DbBrandRepository {
        DbBrandRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn passwords(&self) -> Argon2Passwords {
        Argon2Passwords
    }

    pub fn image_storage(&self) -> LocalImageStorage {
        LocalImageStorage {
            dir: self.upload_dir.clone(),
        }
    }
}
