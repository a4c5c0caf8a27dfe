use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;

use crate::domain::types::Brand;
use crate::error::StoreError;
use crate::handlers::{parse_id, require_admin};
use crate::state::AppState;
use crate::usecase::brand::{
    CreateBrandInput, CreateBrandUseCase, DeleteBrandUseCase, GetBrandUseCase, ListBrandsUseCase,
    UpdateBrandInput, UpdateBrandUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Brand> for BrandResponse {
    fn from(b: Brand) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            description: b.description,
            logo: b.logo,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// ── GET /api/brands ──────────────────────────────────────────────────────────

pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<Vec<BrandResponse>>, StoreError> {
    let usecase = ListBrandsUseCase {
        repo: state.brand_repo(),
    };
    let brands = usecase.execute().await?;
    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

// ── GET /api/brands/{id-or-slug} ─────────────────────────────────────────────

pub async fn get_brand(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<BrandResponse>, StoreError> {
    let usecase = GetBrandUseCase {
        repo: state.brand_repo(),
    };
    Ok(Json(usecase.execute(&key).await?.into()))
}

// ── POST /api/brands (admin) ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

pub async fn create_brand(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateBrandRequest>,
) -> Result<(StatusCode, Json<BrandResponse>), StoreError> {
    require_admin(&identity)?;
    let usecase = CreateBrandUseCase {
        repo: state.brand_repo(),
    };
    let brand = usecase
        .execute(CreateBrandInput {
            name: body.name,
            description: body.description,
            logo: body.logo,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(brand.into())))
}

// ── PUT /api/brands/{id} (admin) ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
}

pub async fn update_brand(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBrandRequest>,
) -> Result<Json<BrandResponse>, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::BrandNotFound)?;
    let usecase = UpdateBrandUseCase {
        repo: state.brand_repo(),
    };
    let brand = usecase
        .execute(
            id,
            UpdateBrandInput {
                name: body.name,
                description: body.description,
                logo: body.logo,
            },
        )
        .await?;
    Ok(Json(brand.into()))
}

// ── DELETE /api/brands/{id} (admin) ──────────────────────────────────────────

pub async fn delete_brand(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::BrandNotFound)?;
    let usecase = DeleteBrandUseCase {
        repo: state.brand_repo(),
        products: state.product_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
