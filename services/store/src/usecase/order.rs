use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::order::{OrderStatus, PaymentMethod};
use neurarig_domain::pagination::{PageRequest, Paged};

use crate::domain::repository::{CartRepository, OrderRepository, ProductRepository};
use crate::domain::types::{CartLine, Order, OrderItem, Product, ShippingAddress};
use crate::error::StoreError;

/// Order lines priced from the current catalog, and their total in cents.
fn price_lines(
    lines: &[CartLine],
    products: &HashMap<Uuid, Product>,
) -> Result<(Vec<OrderItem>, i64), StoreError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;
    for line in lines {
        let product = products
            .get(&line.product_id)
            .ok_or(StoreError::ProductNotFound)?;
        if line.quantity > product.stock {
            return Err(StoreError::InsufficientStock);
        }
        let next_total = product
            .price
            .checked_mul(i64::from(line.quantity))
            .and_then(|s| total.checked_add(s))
            .ok_or_else(|| StoreError::invalid_input("order total overflows"))?;
        total = next_total;
        items.push(OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: line.quantity,
            price: product.price,
        });
    }
    Ok((items, total))
}

async fn load_order<O: OrderRepository>(orders: &O, id: Uuid) -> Result<Order, StoreError> {
    orders
        .find_by_id(id)
        .await?
        .ok_or(StoreError::OrderNotFound)
}

// ── Checkout ─────────────────────────────────────────────────────────────────

pub struct CheckoutInput {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

pub struct CheckoutUseCase<C: CartRepository, P: ProductRepository, O: OrderRepository> {
    pub carts: C,
    pub products: P,
    pub orders: O,
}

impl<C: CartRepository, P: ProductRepository, O: OrderRepository> CheckoutUseCase<C, P, O> {
    /// Turn the caller's cart into a `processing` order.
    pub async fn execute(&self, user_id: Uuid, input: CheckoutInput) -> Result<Order, StoreError> {
        let shipping_address = input
            .shipping_address
            .normalized()
            .map_err(|field| StoreError::invalid_input(format!("{field} is required")))?;

        let lines = self.carts.lines(user_id).await?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .products
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let (items, total) = price_lines(&lines, &products)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            user_id,
            items,
            total,
            shipping_address,
            payment_method: input.payment_method,
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        };
        self.orders.place(&order).await?;
        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = order.total,
            items = order.items.len(),
            "order placed"
        );
        Ok(order)
    }
}

// ── GetOrder ─────────────────────────────────────────────────────────────────

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(&self, caller: &Identity, id: Uuid) -> Result<Order, StoreError> {
        let order = load_order(&self.orders, id).await?;
        if !caller.owns_or_admin(order.user_id) {
            return Err(StoreError::Forbidden);
        }
        Ok(order)
    }
}

// ── ListMyOrders ─────────────────────────────────────────────────────────────

pub struct ListMyOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListMyOrdersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid, page: PageRequest) -> Result<Paged<Order>, StoreError> {
        let page = page.clamped();
        let (orders, total) = self.orders.list_by_user(user_id, page).await?;
        Ok(Paged::new(orders, total, page))
    }
}

// ── ListOrders ───────────────────────────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Paged<Order>, StoreError> {
        let page = page.clamped();
        let (orders, total) = self.orders.list(status, page).await?;
        Ok(Paged::new(orders, total, page))
    }
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

pub struct CancelOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CancelOrderUseCase<O> {
    /// Cancel a `processing` order and put its stock back.
    pub async fn execute(&self, caller: &Identity, id: Uuid) -> Result<Order, StoreError> {
        let order = load_order(&self.orders, id).await?;
        if !caller.owns_or_admin(order.user_id) {
            return Err(StoreError::Forbidden);
        }
        if !order.status.can_be_cancelled_by_owner() {
            return Err(StoreError::InvalidStatusTransition);
        }
        if !self
            .orders
            .transition(id, order.status, OrderStatus::Cancelled)
            .await?
        {
            return Err(StoreError::InvalidStatusTransition);
        }
        tracing::info!(order_id = %id, by = %caller.user_id, "order cancelled");
        load_order(&self.orders, id).await
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    pub async fn execute(&self, id: Uuid, next: OrderStatus) -> Result<Order, StoreError> {
        let order = load_order(&self.orders, id).await?;
        if !order.status.can_transition_to(next) {
            return Err(StoreError::InvalidStatusTransition);
        }
        if !self.orders.transition(id, order.status, next).await? {
            return Err(StoreError::InvalidStatusTransition);
        }
        if next == OrderStatus::Cancelled {
            tracing::info!(order_id = %id, from = %order.status, "order cancelled by admin");
        }
        load_order(&self.orders, id).await
    }
}
