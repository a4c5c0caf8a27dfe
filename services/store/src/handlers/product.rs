use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::catalog::{ProductSortBy, ProductSpec};
use neurarig_domain::pagination::{PageRequest, Paged};

use crate::domain::types::{Product, ProductWithRefs, RefSummary};
use crate::error::StoreError;
use crate::handlers::brand::BrandResponse;
use crate::handlers::category::CategoryResponse;
use crate::handlers::{parse_id, require_admin};
use crate::state::AppState;
use crate::usecase::product::{
    CreateProductInput, CreateProductUseCase, DeleteProductUseCase, FeaturedProductsUseCase,
    GetProductUseCase, ListProductsInput, ListProductsUseCase, ProductDetail,
    UpdateProductInput, UpdateProductUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Fields shared by the list and detail shapes.
#[derive(Serialize)]
pub struct ProductFields {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Cents.
    pub price: i64,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub images: Vec<String>,
    pub specifications: Vec<ProductSpec>,
    pub stock: i32,
    pub rating: f64,
    pub featured: bool,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductFields {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category_id: p.category_id,
            brand_id: p.brand_id,
            images: p.images,
            specifications: p.specifications,
            stock: p.stock,
            rating: p.rating,
            featured: p.featured,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: ProductFields,
    pub category: Option<RefSummary>,
    pub brand: Option<RefSummary>,
}

impl From<ProductWithRefs> for ProductResponse {
    fn from(p: ProductWithRefs) -> Self {
        Self {
            product: p.product.into(),
            category: p.category,
            brand: p.brand,
        }
    }
}

#[derive(Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductFields,
    pub category: Option<CategoryResponse>,
    pub brand: Option<BrandResponse>,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(d: ProductDetail) -> Self {
        Self {
            product: d.product.into(),
            category: d.category.map(Into::into),
            brand: d.brand.map(Into::into),
        }
    }
}

// ── GET /api/products ────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Paged<ProductResponse>>, StoreError> {
    let sort_by = match query.sort_by.as_deref() {
        None | Some("") => ProductSortBy::default(),
        Some(s) => ProductSortBy::from_kebab_case(s)
            .ok_or_else(|| StoreError::invalid_input(format!("unknown sort-by: {s}")))?,
    };
    let usecase = ListProductsUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        brands: state.brand_repo(),
    };
    let page = usecase
        .execute(ListProductsInput {
            category: query.category,
            brand: query.brand,
            featured: query.featured,
            in_stock: query.in_stock.unwrap_or(false),
            search: query.search,
            min_price: query.min_price,
            max_price: query.max_price,
            sort_by,
            page: PageRequest::from_parts(query.per_page, query.page),
        })
        .await?;
    Ok(Json(page.map(ProductResponse::from)))
}

// ── GET /api/products/featured ───────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct FeaturedQuery {
    pub limit: Option<u64>,
}

pub async fn featured_products(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    let usecase = FeaturedProductsUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        brands: state.brand_repo(),
    };
    let products = usecase.execute(query.limit).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

// ── GET /api/products/{id} ───────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetailResponse>, StoreError> {
    let id = parse_id(&id, StoreError::ProductNotFound)?;
    let usecase = GetProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        brands: state.brand_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── POST /api/products (admin) ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(alias = "category")]
    pub category_id: Uuid,
    #[serde(alias = "brand")]
    pub brand_id: Uuid,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<ProductSpec>,
    #[serde(default)]
    pub stock: i32,
    pub rating: Option<f64>,
    #[serde(default)]
    pub featured: bool,
}

pub async fn create_product(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductFields>), StoreError> {
    require_admin(&identity)?;
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        brands: state.brand_repo(),
    };
    let product = usecase
        .execute(CreateProductInput {
            name: body.name,
            description: body.description,
            price: body.price,
            category_id: body.category_id,
            brand_id: body.brand_id,
            images: body.images,
            specifications: body.specifications,
            stock: body.stock,
            rating: body.rating,
            featured: body.featured,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

// ── PUT /api/products/{id} (admin) ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    #[serde(alias = "category")]
    pub category_id: Option<Uuid>,
    #[serde(alias = "brand")]
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub specifications: Option<Vec<ProductSpec>>,
    pub stock: Option<i32>,
    pub rating: Option<f64>,
    pub featured: Option<bool>,
}

pub async fn update_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductFields>, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::ProductNotFound)?;
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        brands: state.brand_repo(),
    };
    let product = usecase
        .execute(
            id,
            UpdateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                category_id: body.category_id,
                brand_id: body.brand_id,
                images: body.images,
                specifications: body.specifications,
                stock: body.stock,
                rating: body.rating,
                featured: body.featured,
            },
        )
        .await?;
    Ok(Json(product.into()))
}

// ── DELETE /api/products/{id} (admin) ────────────────────────────────────────

pub async fn delete_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::ProductNotFound)?;
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
        storage: state.image_storage(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
