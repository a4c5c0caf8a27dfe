use std::sync::Mutex;

use neurarig_domain::order::{OrderStatus, PaymentMethod};
use neurarig_domain::pagination::PageRequest;
use neurarig_store::domain::repository::CartRepository;
use neurarig_store::domain::types::{CartLine, Order};
use neurarig_store::error::StoreError;
use neurarig_store::usecase::cart::AddCartItemUseCase;
use neurarig_store::usecase::order::{
    CancelOrderUseCase, CheckoutInput, CheckoutUseCase, GetOrderUseCase, ListMyOrdersUseCase,
    ListOrdersUseCase, UpdateOrderStatusUseCase,
};
use uuid::Uuid;

use crate::helpers::{
    MemStore, address, admin, customer, seed_brand, seed_category, seed_product,
};

fn checkout(store: &MemStore) -> CheckoutUseCase<MemStore, MemStore, MemStore> {
    CheckoutUseCase {
        carts: store.clone(),
        products: store.clone(),
        orders: store.clone(),
    }
}

fn input() -> CheckoutInput {
    CheckoutInput {
        shipping_address: address(),
        payment_method: PaymentMethod::CreditCard,
    }
}

/// Stock a CPU and a GPU, put 1 CPU and 2 GPUs in `user_id`'s cart.
async fn cart_with_parts(store: &MemStore, user_id: Uuid) -> (Uuid, Uuid) {
    let cpus = seed_category(store, "Processors", vec![]);
    let gpus = seed_category(store, "Graphics Cards", vec![]);
    let brand = seed_brand(store, "AMD");
    let cpu = seed_product(store, "Ryzen 7 7800X3D", &cpus, &brand, 44_900, 5, 4.9);
    let gpu = seed_product(store, "Radeon RX 7900 GRE", &gpus, &brand, 54_900, 3, 4.6);
    let add = AddCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    };
    add.execute(user_id, cpu.id, 1).await.unwrap();
    add.execute(user_id, gpu.id, 2).await.unwrap();
    (cpu.id, gpu.id)
}

async fn placed_order(store: &MemStore, user_id: Uuid) -> Order {
    cart_with_parts(store, user_id).await;
    checkout(store).execute(user_id, input()).await.unwrap()
}

// ── Checkout ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_place_order_decrement_stock_and_clear_cart() {
    let store = MemStore::new();
    let user = customer();
    let (cpu_id, gpu_id) = cart_with_parts(&store, user.user_id).await;

    let order = checkout(&store).execute(user.user_id, input()).await.unwrap();

    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.total, 44_900 + 2 * 54_900);
    assert_eq!(order.items.len(), 2);
    assert_eq!(store.product(cpu_id).unwrap().stock, 4);
    assert_eq!(store.product(gpu_id).unwrap().stock, 1);
    assert_eq!(store.cart_len(user.user_id), 0);
}

/// Cart whose owner adds `late` right after checkout has read the lines.
struct LateAddCart {
    store: MemStore,
    late: Mutex<Option<CartLine>>,
}

impl CartRepository for LateAddCart {
    async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, StoreError> {
        let lines = self.store.lines(user_id).await?;
        let late = self.late.lock().unwrap().take();
        if let Some(line) = late {
            self.store.upsert_line(user_id, &line).await?;
        }
        Ok(lines)
    }

    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> Result<(), StoreError> {
        self.store.upsert_line(user_id, line).await
    }

    async fn remove_line(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        self.store.remove_line(user_id, product_id).await
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.store.clear(user_id).await
    }
}

#[tokio::test]
async fn should_keep_cart_lines_added_during_checkout() {
    let store = MemStore::new();
    let user = customer();
    cart_with_parts(&store, user.user_id).await;
    let memory = seed_category(&store, "Memory", vec![]);
    let corsair = seed_brand(&store, "Corsair");
    let ram = seed_product(&store, "Vengeance 32GB", &memory, &corsair, 9_900, 4, 4.6);

    let usecase = CheckoutUseCase {
        carts: LateAddCart {
            store: store.clone(),
            late: Mutex::new(Some(CartLine {
                product_id: ram.id,
                quantity: 1,
                price: ram.price,
            })),
        },
        products: store.clone(),
        orders: store.clone(),
    };
    let order = usecase.execute(user.user_id, input()).await.unwrap();

    assert_eq!(order.items.len(), 2);
    assert!(order.items.iter().all(|i| i.product_id != ram.id));
    let left = store.lines(user.user_id).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].product_id, ram.id);
    assert_eq!(store.product(ram.id).unwrap().stock, 4);
}

#[tokio::test]
async fn should_charge_current_price_not_cart_snapshot() {
    let store = MemStore::new();
    let user = customer();
    let (cpu_id, _) = cart_with_parts(&store, user.user_id).await;
    {
        let mut data = store.data.lock().unwrap();
        let cpu = data.products.iter_mut().find(|p| p.id == cpu_id).unwrap();
        cpu.price = 39_900;
    }

    let order = checkout(&store).execute(user.user_id, input()).await.unwrap();
    assert_eq!(order.total, 39_900 + 2 * 54_900);
}

#[tokio::test]
async fn should_reject_empty_cart() {
    let store = MemStore::new();
    let result = checkout(&store).execute(customer().user_id, input()).await;
    assert!(
        matches!(result, Err(StoreError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_blank_shipping_field() {
    let store = MemStore::new();
    let user = customer();
    cart_with_parts(&store, user.user_id).await;
    let mut bad = input();
    bad.shipping_address.city = "   ".into();

    let result = checkout(&store).execute(user.user_id, bad).await;
    match result {
        Err(StoreError::InvalidInput(msg)) => assert_eq!(msg, "city is required"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(store.cart_len(user.user_id), 2);
}

#[tokio::test]
async fn should_leave_everything_untouched_when_stock_ran_out() {
    let store = MemStore::new();
    let user = customer();
    let (cpu_id, gpu_id) = cart_with_parts(&store, user.user_id).await;
    {
        let mut data = store.data.lock().unwrap();
        let gpu = data.products.iter_mut().find(|p| p.id == gpu_id).unwrap();
        gpu.stock = 1;
    }

    let result = checkout(&store).execute(user.user_id, input()).await;
    assert!(matches!(result, Err(StoreError::InsufficientStock)));
    assert_eq!(store.product(cpu_id).unwrap().stock, 5);
    assert_eq!(store.cart_len(user.user_id), 2);
    assert!(store.data.lock().unwrap().orders.is_empty());
}

// ── Access ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_order_from_other_customers_but_not_admins() {
    let store = MemStore::new();
    let owner = customer();
    let order = placed_order(&store, owner.user_id).await;
    let get = GetOrderUseCase {
        orders: store.clone(),
    };

    assert!(matches!(
        get.execute(&customer(), order.id).await,
        Err(StoreError::Forbidden)
    ));
    assert_eq!(get.execute(&owner, order.id).await.unwrap().id, order.id);
    assert_eq!(get.execute(&admin(), order.id).await.unwrap().id, order.id);
}

#[tokio::test]
async fn should_list_only_own_orders() {
    let store = MemStore::new();
    let alice = customer();
    let bob = customer();
    placed_order(&store, alice.user_id).await;

    let mine = ListMyOrdersUseCase {
        orders: store.clone(),
    };
    let page = PageRequest::default();
    assert_eq!(mine.execute(alice.user_id, page).await.unwrap().total, 1);
    assert_eq!(mine.execute(bob.user_id, page).await.unwrap().total, 0);

    let all = ListOrdersUseCase {
        orders: store.clone(),
    };
    let shipped = all
        .execute(Some(OrderStatus::Shipped), page)
        .await
        .unwrap();
    assert_eq!(shipped.total, 0);
    let processing = all
        .execute(Some(OrderStatus::Processing), page)
        .await
        .unwrap();
    assert_eq!(processing.total, 1);
}

// ── Cancel / status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cancel_processing_order_and_restore_stock() {
    let store = MemStore::new();
    let owner = customer();
    let order = placed_order(&store, owner.user_id).await;
    let gpu_id = order.items[1].product_id;
    assert_eq!(store.product(gpu_id).unwrap().stock, 1);

    let cancel = CancelOrderUseCase {
        orders: store.clone(),
    };
    let cancelled = cancel.execute(&owner, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(store.product(gpu_id).unwrap().stock, 3);

    let again = cancel.execute(&owner, order.id).await;
    assert!(matches!(again, Err(StoreError::InvalidStatusTransition)));
}

#[tokio::test]
async fn should_not_let_owner_cancel_confirmed_order() {
    let store = MemStore::new();
    let owner = customer();
    let order = placed_order(&store, owner.user_id).await;
    UpdateOrderStatusUseCase {
        orders: store.clone(),
    }
    .execute(order.id, OrderStatus::Confirmed)
    .await
    .unwrap();

    let result = CancelOrderUseCase {
        orders: store.clone(),
    }
    .execute(&owner, order.id)
    .await;
    assert!(matches!(result, Err(StoreError::InvalidStatusTransition)));
}

#[tokio::test]
async fn should_forbid_cancelling_someone_elses_order() {
    let store = MemStore::new();
    let order = placed_order(&store, customer().user_id).await;
    let result = CancelOrderUseCase {
        orders: store.clone(),
    }
    .execute(&customer(), order.id)
    .await;
    assert!(matches!(result, Err(StoreError::Forbidden)));
}

#[tokio::test]
async fn should_only_move_status_forward() {
    let store = MemStore::new();
    let order = placed_order(&store, customer().user_id).await;
    let update = UpdateOrderStatusUseCase {
        orders: store.clone(),
    };

    let shipped = update.execute(order.id, OrderStatus::Shipped).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let back = update.execute(order.id, OrderStatus::Confirmed).await;
    assert!(matches!(back, Err(StoreError::InvalidStatusTransition)));

    let cancel_shipped = update.execute(order.id, OrderStatus::Cancelled).await;
    assert!(matches!(cancel_shipped, Err(StoreError::InvalidStatusTransition)));

    let missing = update.execute(Uuid::now_v7(), OrderStatus::Shipped).await;
    assert!(matches!(missing, Err(StoreError::OrderNotFound)));
}
