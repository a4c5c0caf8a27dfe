use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::types::{CartItemView, CartLine, CartView, Product};
use crate::error::StoreError;

/// Populate stored lines with current product details. Lines whose product
/// is gone are dropped.
pub(crate) async fn cart_view<C: CartRepository, P: ProductRepository>(
    carts: &C,
    products: &P,
    user_id: Uuid,
) -> Result<CartView, StoreError> {
    let lines = carts.lines(user_id).await?;
    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let by_id: HashMap<Uuid, Product> = products
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut items = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;
    for line in lines {
        let Some(product) = by_id.get(&line.product_id) else {
            continue;
        };
        let subtotal = line_subtotal(&line)?;
        total = add_to_total(total, subtotal)?;
        items.push(CartItemView {
            product_id: line.product_id,
            name: product.name.clone(),
            image: product.images.first().cloned(),
            stock: product.stock,
            price: line.price,
            quantity: line.quantity,
            subtotal,
        });
    }
    Ok(CartView { items, total })
}

fn line_subtotal(line: &CartLine) -> Result<i64, StoreError> {
    line.price
        .checked_mul(i64::from(line.quantity))
        .ok_or_else(|| StoreError::invalid_input("cart line total overflows"))
}

fn add_to_total(total: i64, subtotal: i64) -> Result<i64, StoreError> {
    total
        .checked_add(subtotal)
        .ok_or_else(|| StoreError::invalid_input("cart total overflows"))
}

/// Reject `line` if storing it would leave a cart whose total cannot be
/// represented.
fn check_cart_total(lines: &[CartLine], line: &CartLine) -> Result<(), StoreError> {
    lines
        .iter()
        .filter(|l| l.product_id != line.product_id)
        .chain(std::iter::once(line))
        .try_fold(0i64, |total, l| add_to_total(total, line_subtotal(l)?))
        .map(|_| ())
}

fn check_quantity(quantity: i32) -> Result<(), StoreError> {
    if quantity < 1 {
        return Err(StoreError::invalid_input("quantity must be at least 1"));
    }
    Ok(())
}

// ── GetCart ──────────────────────────────────────────────────────────────────

pub struct GetCartUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> GetCartUseCase<C, P> {
    pub async fn execute(&self, user_id: Uuid) -> Result<CartView, StoreError> {
        cart_view(&self.carts, &self.products, user_id).await
    }
}

// ── AddCartItem ──────────────────────────────────────────────────────────────

pub struct AddCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> AddCartItemUseCase<C, P> {
    /// Add `quantity` to the line for `product_id`, creating it if needed.
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, StoreError> {
        check_quantity(quantity)?;
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound)?;

        let lines = self.carts.lines(user_id).await?;
        let existing = lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity);
        let quantity = existing
            .checked_add(quantity)
            .ok_or(StoreError::InsufficientStock)?;
        if quantity > product.stock {
            return Err(StoreError::InsufficientStock);
        }

        let line = CartLine {
            product_id,
            quantity,
            price: product.price,
        };
        check_cart_total(&lines, &line)?;
        self.carts.upsert_line(user_id, &line).await?;
        cart_view(&self.carts, &self.products, user_id).await
    }
}

// ── UpdateCartItem ───────────────────────────────────────────────────────────

pub struct UpdateCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> UpdateCartItemUseCase<C, P> {
    /// Set the quantity of an existing line.
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, StoreError> {
        check_quantity(quantity)?;
        let lines = self.carts.lines(user_id).await?;
        if !lines.iter().any(|l| l.product_id == product_id) {
            return Err(StoreError::CartItemNotFound);
        }
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound)?;
        if quantity > product.stock {
            return Err(StoreError::InsufficientStock);
        }

        let line = CartLine {
            product_id,
            quantity,
            price: product.price,
        };
        check_cart_total(&lines, &line)?;
        self.carts.upsert_line(user_id, &line).await?;
        cart_view(&self.carts, &self.products, user_id).await
    }
}

// ── RemoveCartItem ───────────────────────────────────────────────────────────

pub struct RemoveCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> RemoveCartItemUseCase<C, P> {
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, StoreError> {
        if !self.carts.remove_line(user_id, product_id).await? {
            return Err(StoreError::CartItemNotFound);
        }
        cart_view(&self.carts, &self.products, user_id).await
    }
}

// ── ClearCart ────────────────────────────────────────────────────────────────

pub struct ClearCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> ClearCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.carts.clear(user_id).await
    }
}
