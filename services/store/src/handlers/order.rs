use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::order::{OrderStatus, PaymentMethod};
use neurarig_domain::pagination::{PageRequest, Paged};

use crate::domain::types::{Order, OrderItem, ShippingAddress};
use crate::error::StoreError;
use crate::handlers::{PageQuery, parse_id, require_admin};
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderUseCase, CheckoutInput, CheckoutUseCase, GetOrderUseCase, ListMyOrdersUseCase,
    ListOrdersUseCase, UpdateOrderStatusUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
    pub subtotal: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            subtotal: item.price * i64::from(item.quantity),
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub total: i64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            items: o.items.into_iter().map(Into::into).collect(),
            total: o.total,
            shipping_address: o.shipping_address,
            payment_method: o.payment_method,
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, StoreError> {
    raw.parse()
        .map_err(|e: neurarig_domain::order::UnknownOrderStatus| {
            StoreError::invalid_input(e.to_string())
        })
}

// ── POST /api/orders ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

pub async fn checkout(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), StoreError> {
    let payment_method: PaymentMethod = body
        .payment_method
        .parse()
        .map_err(|e: neurarig_domain::order::UnknownPaymentMethod| {
            StoreError::invalid_input(e.to_string())
        })?;
    let usecase = CheckoutUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
        orders: state.order_repo(),
    };
    let order = usecase
        .execute(
            identity.user_id,
            CheckoutInput {
                shipping_address: body.shipping_address,
                payment_method,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

// ── GET /api/orders/mine ─────────────────────────────────────────────────────

pub async fn list_my_orders(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<OrderResponse>>, StoreError> {
    let usecase = ListMyOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase
        .execute(identity.user_id, query.page_request())
        .await?;
    Ok(Json(orders.map(OrderResponse::from)))
}

// ── GET /api/orders (admin) ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_orders(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Paged<OrderResponse>>, StoreError> {
    require_admin(&identity)?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase
        .execute(status, PageRequest::from_parts(query.per_page, query.page))
        .await?;
    Ok(Json(orders.map(OrderResponse::from)))
}

// ── GET /api/orders/{id} ─────────────────────────────────────────────────────

pub async fn get_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, StoreError> {
    let id = parse_id(&id, StoreError::OrderNotFound)?;
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

// ── PUT /api/orders/{id}/cancel ──────────────────────────────────────────────

pub async fn cancel_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, StoreError> {
    let id = parse_id(&id, StoreError::OrderNotFound)?;
    let usecase = CancelOrderUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

// ── PUT /api/orders/{id}/status (admin) ──────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, StoreError> {
    require_admin(&identity)?;
    let id = parse_id(&id, StoreError::OrderNotFound)?;
    let status = parse_status(&body.status)?;
    let usecase = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(usecase.execute(id, status).await?.into()))
}
