use neurarig_store::error::StoreError;
use neurarig_store::usecase::cart::{
    AddCartItemUseCase, GetCartUseCase, RemoveCartItemUseCase, UpdateCartItemUseCase,
};
use uuid::Uuid;

use crate::helpers::{MemStore, customer, seed_brand, seed_category, seed_product};

fn add(store: &MemStore) -> AddCartItemUseCase<MemStore, MemStore> {
    AddCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    }
}

#[tokio::test]
async fn should_merge_repeated_adds_into_one_line() {
    let store = MemStore::new();
    let category = seed_category(&store, "Memory", vec![]);
    let brand = seed_brand(&store, "Corsair");
    let ram = seed_product(&store, "Vengeance 32GB", &category, &brand, 9_900, 5, 4.6);
    let user = customer();

    add(&store).execute(user.user_id, ram.id, 1).await.unwrap();
    let cart = add(&store).execute(user.user_id, ram.id, 2).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].subtotal, 29_700);
    assert_eq!(cart.total, 29_700);
    assert_eq!(cart.items[0].image.as_deref(), Some("/uploads/vengeance-32gb.png"));
}

#[tokio::test]
async fn should_reject_quantity_above_stock() {
    let store = MemStore::new();
    let category = seed_category(&store, "Graphics Cards", vec![]);
    let brand = seed_brand(&store, "ASUS");
    let gpu = seed_product(&store, "RX 7800 XT", &category, &brand, 52_900, 2, 4.7);
    let user = customer();

    add(&store).execute(user.user_id, gpu.id, 2).await.unwrap();
    let over = add(&store).execute(user.user_id, gpu.id, 1).await;
    assert!(
        matches!(over, Err(StoreError::InsufficientStock)),
        "expected InsufficientStock, got {over:?}"
    );

    let update = UpdateCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    };
    let over = update.execute(user.user_id, gpu.id, 3).await;
    assert!(matches!(over, Err(StoreError::InsufficientStock)));
}

#[tokio::test]
async fn should_reject_unknown_product_and_zero_quantity() {
    let store = MemStore::new();
    let user = customer();

    let unknown = add(&store).execute(user.user_id, Uuid::now_v7(), 1).await;
    assert!(matches!(unknown, Err(StoreError::ProductNotFound)));

    let zero = add(&store).execute(user.user_id, Uuid::now_v7(), 0).await;
    assert!(matches!(zero, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn should_report_missing_line_on_update_and_remove() {
    let store = MemStore::new();
    let category = seed_category(&store, "Storage", vec![]);
    let brand = seed_brand(&store, "Samsung");
    let ssd = seed_product(&store, "990 Pro 2TB", &category, &brand, 17_900, 10, 4.9);
    let user = customer();

    let update = UpdateCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    };
    let remove = RemoveCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    };
    assert!(matches!(
        update.execute(user.user_id, ssd.id, 1).await,
        Err(StoreError::CartItemNotFound)
    ));
    assert!(matches!(
        remove.execute(user.user_id, ssd.id).await,
        Err(StoreError::CartItemNotFound)
    ));
}

#[tokio::test]
async fn should_hide_lines_whose_product_was_deleted() {
    let store = MemStore::new();
    let category = seed_category(&store, "Cases", vec![]);
    let brand = seed_brand(&store, "Fractal Design");
    let case = seed_product(&store, "North", &category, &brand, 13_900, 4, 4.7);
    let user = customer();
    add(&store).execute(user.user_id, case.id, 1).await.unwrap();

    store.data.lock().unwrap().products.clear();

    let cart = GetCartUseCase {
        carts: store.clone(),
        products: store.clone(),
    }
    .execute(user.user_id)
    .await
    .unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
}

#[tokio::test]
async fn should_keep_carts_separate_per_user() {
    let store = MemStore::new();
    let category = seed_category(&store, "Cooling", vec![]);
    let brand = seed_brand(&store, "Noctua");
    let cooler = seed_product(&store, "NH-U12A", &category, &brand, 9_900, 10, 4.8);
    let alice = customer();
    let bob = customer();

    add(&store).execute(alice.user_id, cooler.id, 2).await.unwrap();
    assert_eq!(store.cart_len(alice.user_id), 1);
    assert_eq!(store.cart_len(bob.user_id), 0);
}

#[tokio::test]
async fn should_reject_line_whose_total_overflows() {
    let store = MemStore::new();
    let category = seed_category(&store, "Graphics Cards", vec![]);
    let brand = seed_brand(&store, "NVIDIA");
    let gpu = seed_product(&store, "Halo GPU", &category, &brand, i64::MAX / 2 + 1, 5, 5.0);
    let user = customer();

    let result = add(&store).execute(user.user_id, gpu.id, 2).await;
    assert!(
        matches!(result, Err(StoreError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
    assert_eq!(store.cart_len(user.user_id), 0);

    add(&store).execute(user.user_id, gpu.id, 1).await.unwrap();
    let update = UpdateCartItemUseCase {
        carts: store.clone(),
        products: store.clone(),
    };
    let result = update.execute(user.user_id, gpu.id, 3).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));

    let cart = GetCartUseCase {
        carts: store.clone(),
        products: store.clone(),
    }
    .execute(user.user_id)
    .await
    .unwrap();
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, i64::MAX / 2 + 1);
}

#[tokio::test]
async fn should_reject_second_line_that_overflows_cart_total() {
    let store = MemStore::new();
    let category = seed_category(&store, "Processors", vec![]);
    let brand = seed_brand(&store, "AMD");
    let first = seed_product(&store, "Halo CPU", &category, &brand, i64::MAX / 2 + 1, 5, 5.0);
    let second = seed_product(&store, "Halo APU", &category, &brand, i64::MAX / 2 + 1, 5, 5.0);
    let user = customer();

    add(&store).execute(user.user_id, first.id, 1).await.unwrap();
    let result = add(&store).execute(user.user_id, second.id, 1).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    assert_eq!(store.cart_len(user.user_id), 1);
}
