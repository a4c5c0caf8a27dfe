use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::catalog::SpecDefinition;

use crate::domain::types::Category;
use crate::error::StoreError;
use crate::handlers::{parse_id, require_admin};
use crate::state::AppState;
use crate::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryInput, UpdateCategoryUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: Vec<SpecDefinition>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image: c.image,
            specifications: c.specifications,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// ── GET /api/categories ──────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, StoreError> {
    let usecase = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

// ── GET /api/categories/{id-or-slug} ─────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CategoryResponse>, StoreError> {
    let usecase = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    Ok(Json(usecase.execute(&key).await?.into()))
}

// ── POST /api/categories (admin) ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub specifications: Vec<SpecDefinition>,
}

pub async fn create_category(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), StoreError> {
    require_admin(&identity)?;
    let usecase = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase
        .execute(CreateCategoryInput {
            name: body.name,
            description: body.description,
            image: body.image,
            specifications: body.specifications,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

// ── PUT /api/categories/{id} (admin) ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: Option<Vec<SpecDefinition>>,
}

pub async fn update_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::CategoryNotFound)?;
    let usecase = UpdateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase
        .execute(
            id,
            UpdateCategoryInput {
                name: body.name,
                description: body.description,
                image: body.image,
                specifications: body.specifications,
            },
        )
        .await?;
    Ok(Json(category.into()))
}

// ── DELETE /api/categories/{id} (admin) ──────────────────────────────────────

pub async fn delete_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::CategoryNotFound)?;
    let usecase = DeleteCategoryUseCase {
        repo: state.category_repo(),
        products: state.product_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
