#![allow(async_fn_in_trait)]

use std::sync::Arc;

use uuid::Uuid;

use neurarig_domain::catalog::ProductSortBy;
use neurarig_domain::order::OrderStatus;
use neurarig_domain::pagination::PageRequest;
use neurarig_domain::user::UserRole;

use crate::domain::builder::{BuilderReply, ChatMessage};
use crate::domain::types::{
    Brand, CartLine, CatalogEntry, Category, Order, Product, ProductFilter, User,
};
use crate::error::StoreError;

/// Repository for store accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Lookup by already-lowercased email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), StoreError>;
    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), StoreError>;
    /// Returns `false` if no such user.
    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, StoreError>;
    /// Returns `false` if no such user.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Repository for product categories.
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, StoreError>;
    /// Whether `slug` is taken by a category other than `exclude`.
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError>;
    async fn create(&self, category: &Category) -> Result<(), StoreError>;
    async fn update(&self, category: &Category) -> Result<(), StoreError>;
    /// Returns `false` if no such category.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Repository for brands.
pub trait BrandRepository: Send + Sync {
    /// All brands ordered by name.
    async fn list(&self) -> Result<Vec<Brand>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Brand>, StoreError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Brand>, StoreError>;
    /// Case-insensitive name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Brand>, StoreError>;
    /// Whether `slug` is taken by a brand other than `exclude`.
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError>;
    async fn create(&self, brand: &Brand) -> Result<(), StoreError>;
    async fn update(&self, brand: &Brand) -> Result<(), StoreError>;
    /// Returns `false` if no such brand.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Repository for catalog products.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), StoreError>;
    /// Featured products, newest first.
    async fn featured(&self, limit: u64) -> Result<Vec<Product>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError>;
    async fn create(&self, product: &Product) -> Result<(), StoreError>;
    async fn update(&self, product: &Product) -> Result<(), StoreError>;
    /// Returns `false` if no such product.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, StoreError>;
    async fn count_by_brand(&self, brand_id: Uuid) -> Result<u64, StoreError>;
    /// In-stock products with category and brand names, for the PC builder.
    async fn catalog_snapshot(&self) -> Result<Vec<CatalogEntry>, StoreError>;
}

/// Repository for per-user carts. A cart row is created on first write.
pub trait CartRepository: Send + Sync {
    /// Lines of the user's cart; empty when the user has none.
    async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, StoreError>;
    /// Insert or overwrite the line for `line.product_id`.
    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> Result<(), StoreError>;
    /// Returns `false` if the line did not exist.
    async fn remove_line(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError>;
    async fn clear(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Repository for orders.
pub trait OrderRepository: Send + Sync {
    /// Atomically decrement stock for every item (guarded by `stock >= quantity`),
    /// insert the order, and remove the ordered products from the owner's cart.
    ///
    /// Any shortfall rolls everything back with `InsufficientStock`.
    async fn place(&self, order: &Order) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError>;
    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError>;
    /// Move the order from `from` to `to` if it is still in `from`.
    /// Moving to `Cancelled` restores item stock in the same transaction.
    ///
    /// Returns `false` if the order was no longer in `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError>;
}

/// Password hashing and verification.
pub trait PasswordPort: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, StoreError>;
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, StoreError>;
}

/// Chat-completions client.
pub trait LlmPort: Send + Sync {
    /// Reply text for `messages`. One attempt; retries are the caller's.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, StoreError>;
}

/// In-memory caches used by the PC builder. Entries expire after a fixed TTL.
pub trait BuilderCache: Send + Sync {
    fn snapshot(&self) -> Option<Arc<Vec<CatalogEntry>>>;
    fn store_snapshot(&self, snapshot: Arc<Vec<CatalogEntry>>);
    fn reply(&self, key: &str) -> Option<BuilderReply>;
    fn store_reply(&self, key: String, reply: BuilderReply);
}

/// Storage for uploaded product images.
pub trait ImageStorage: Send + Sync {
    /// Persist `bytes` under a fresh name with `extension`; returns the public URL.
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, StoreError>;
    /// Remove a previously saved image by its public URL. URLs not served by
    /// this storage are ignored.
    async fn remove(&self, url: &str) -> Result<(), StoreError>;
}
