use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;

use crate::domain::types::CartView;
use crate::error::StoreError;
use crate::handlers::parse_id;
use crate::state::AppState;
use crate::usecase::cart::{
    AddCartItemUseCase, ClearCartUseCase, GetCartUseCase, RemoveCartItemUseCase,
    UpdateCartItemUseCase,
};

// ── GET /api/cart ────────────────────────────────────────────────────────────

pub async fn get_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<CartView>, StoreError> {
    let usecase = GetCartUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    Ok(Json(usecase.execute(identity.user_id).await?))
}

// ── POST /api/cart/items ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

pub async fn add_item(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>, StoreError> {
    let usecase = AddCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let cart = usecase
        .execute(identity.user_id, body.product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

// ── PUT /api/cart/items/{product_id} ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

pub async fn update_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, StoreError> {
    let product_id = parse_id(&product_id, StoreError::CartItemNotFound)?;
    let usecase = UpdateCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let cart = usecase
        .execute(identity.user_id, product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

// ── DELETE /api/cart/items/{product_id} ──────────────────────────────────────

pub async fn remove_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<CartView>, StoreError> {
    let product_id = parse_id(&product_id, StoreError::CartItemNotFound)?;
    let usecase = RemoveCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    Ok(Json(usecase.execute(identity.user_id, product_id).await?))
}

// ── DELETE /api/cart ─────────────────────────────────────────────────────────

pub async fn clear_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, StoreError> {
    let usecase = ClearCartUseCase {
        carts: state.cart_repo(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
