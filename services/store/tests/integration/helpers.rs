use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::catalog::{ProductSortBy, SpecDefinition};
use neurarig_domain::order::OrderStatus;
use neurarig_domain::pagination::{PageRequest, Sort};
use neurarig_domain::user::UserRole;
use neurarig_store::domain::repository::{
    BrandRepository, CartRepository, CategoryRepository, OrderRepository, PasswordPort,
    ProductRepository, UserRepository,
};
use neurarig_store::domain::types::{
    Brand, CartLine, CatalogEntry, Category, Order, Product, ProductFilter, ShippingAddress, User,
};
use neurarig_store::error::StoreError;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

// ── MemStore ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemData {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub products: Vec<Product>,
    /// `(user_id, line)` pairs.
    pub cart_lines: Vec<(Uuid, CartLine)>,
    pub orders: Vec<Order>,
}

/// In-memory stand-in for every repository. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemStore {
    pub data: Arc<Mutex<MemData>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self, id: Uuid) -> Option<Product> {
        self.data
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn cart_len(&self, user_id: Uuid) -> usize {
        self.data
            .lock()
            .unwrap()
            .cart_lines
            .iter()
            .filter(|(u, _)| *u == user_id)
            .count()
    }
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

impl UserRepository for MemStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.data.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.data.lock().unwrap().users.push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        if let Some(u) = data.users.iter_mut().find(|u| u.id == id) {
            if let Some(name) = name {
                u.name = name.to_owned();
            }
            if let Some(hash) = password_hash {
                u.password_hash = hash.to_owned();
            }
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), StoreError> {
        let data = self.data.lock().unwrap();
        Ok((page_slice(&data.users, page), data.users.len() as u64))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .map(|u| u.role = role)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        Ok(data.users.len() < before)
    }
}

impl CategoryRepository for MemStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.data.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .categories
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != exclude))
    }

    async fn create(&self, category: &Category) -> Result<(), StoreError> {
        self.data.lock().unwrap().categories.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        if let Some(c) = data.categories.iter_mut().find(|c| c.id == category.id) {
            *c = category.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let before = data.categories.len();
        data.categories.retain(|c| c.id != id);
        Ok(data.categories.len() < before)
    }
}

impl BrandRepository for MemStore {
    async fn list(&self) -> Result<Vec<Brand>, StoreError> {
        let mut brands = self.data.lock().unwrap().brands.clone();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Brand>, StoreError> {
        Ok(self.data.lock().unwrap().brands.iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Brand>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .brands
            .iter()
            .find(|b| b.slug == slug)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        let name = name.to_lowercase();
        Ok(self
            .data
            .lock()
            .unwrap()
            .brands
            .iter()
            .find(|b| b.name.to_lowercase() == name)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Brand>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .brands
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .brands
            .iter()
            .any(|b| b.slug == slug && Some(b.id) != exclude))
    }

    async fn create(&self, brand: &Brand) -> Result<(), StoreError> {
        self.data.lock().unwrap().brands.push(brand.clone());
        Ok(())
    }

    async fn update(&self, brand: &Brand) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        if let Some(b) = data.brands.iter_mut().find(|b| b.id == brand.id) {
            *b = brand.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let before = data.brands.len();
        data.brands.retain(|b| b.id != id);
        Ok(data.brands.len() < before)
    }
}

impl ProductRepository for MemStore {
    async fn list(
        &self,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), StoreError> {
        let data = self.data.lock().unwrap();
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut matched: Vec<Product> = data
            .products
            .iter()
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| filter.brand_id.is_none_or(|id| p.brand_id == id))
            .filter(|p| filter.featured.is_none_or(|f| p.featured == f))
            .filter(|p| !filter.in_stock || p.stock > 0)
            .filter(|p| {
                search
                    .as_deref()
                    .is_none_or(|s| p.name.to_lowercase().contains(s))
            })
            .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
            .cloned()
            .collect();
        match sort_by {
            ProductSortBy::CreatedAt(Sort::Desc) => {
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            ProductSortBy::CreatedAt(Sort::Asc) => {
                matched.sort_by(|a, b| a.created_at.cmp(&b.created_at))
            }
            ProductSortBy::Price(Sort::Desc) => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSortBy::Price(Sort::Asc) => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            ProductSortBy::RatingDesc => matched.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            ProductSortBy::NameAsc => matched.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        let total = matched.len() as u64;
        Ok((page_slice(&matched, page), total))
    }

    async fn featured(&self, limit: u64) -> Result<Vec<Product>, StoreError> {
        let mut featured: Vec<Product> = self
            .data
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| p.featured)
            .cloned()
            .collect();
        featured.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        featured.truncate(limit as usize);
        Ok(featured)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.product(id))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, product: &Product) -> Result<(), StoreError> {
        self.data.lock().unwrap().products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        if let Some(p) = data.products.iter_mut().find(|p| p.id == product.id) {
            *p = product.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let before = data.products.len();
        data.products.retain(|p| p.id != id);
        Ok(data.products.len() < before)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, StoreError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }

    async fn count_by_brand(&self, brand_id: Uuid) -> Result<u64, StoreError> {
        let data = self.data.lock().unwrap();
        Ok(data.products.iter().filter(|p| p.brand_id == brand_id).count() as u64)
    }

    async fn catalog_snapshot(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let data = self.data.lock().unwrap();
        let name_of = |id: Uuid, names: &[(Uuid, String)]| {
            names
                .iter()
                .find(|(i, _)| *i == id)
                .map(|(_, n)| n.clone())
                .unwrap_or_default()
        };
        let categories: Vec<(Uuid, String)> =
            data.categories.iter().map(|c| (c.id, c.name.clone())).collect();
        let brands: Vec<(Uuid, String)> =
            data.brands.iter().map(|b| (b.id, b.name.clone())).collect();
        Ok(data
            .products
            .iter()
            .filter(|p| p.stock > 0)
            .map(|p| CatalogEntry {
                id: p.id,
                name: p.name.clone(),
                category: name_of(p.category_id, &categories),
                brand: name_of(p.brand_id, &brands),
                price: p.price,
                stock: p.stock,
                rating: p.rating,
                image: p.images.first().cloned(),
            })
            .collect())
    }
}

impl CartRepository for MemStore {
    async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .cart_lines
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, l)| l.clone())
            .collect())
    }

    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        match data
            .cart_lines
            .iter_mut()
            .find(|(u, l)| *u == user_id && l.product_id == line.product_id)
        {
            Some((_, existing)) => *existing = line.clone(),
            None => data.cart_lines.push((user_id, line.clone())),
        }
        Ok(())
    }

    async fn remove_line(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let before = data.cart_lines.len();
        data.cart_lines
            .retain(|(u, l)| !(*u == user_id && l.product_id == product_id));
        Ok(data.cart_lines.len() < before)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.data
            .lock()
            .unwrap()
            .cart_lines
            .retain(|(u, _)| *u != user_id);
        Ok(())
    }
}

impl OrderRepository for MemStore {
    async fn place(&self, order: &Order) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap();
        for item in &order.items {
            let enough = data
                .products
                .iter()
                .any(|p| p.id == item.product_id && p.stock >= item.quantity);
            if !enough {
                return Err(StoreError::InsufficientStock);
            }
        }
        for item in &order.items {
            if let Some(p) = data.products.iter_mut().find(|p| p.id == item.product_id) {
                p.stock -= item.quantity;
            }
        }
        data.orders.push(order.clone());
        data.cart_lines.retain(|(u, line)| {
            *u != order.user_id || !order.items.iter().any(|i| i.product_id == line.product_id)
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.data.lock().unwrap().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError> {
        let data = self.data.lock().unwrap();
        let mut mine: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((page_slice(&mine, page), mine.len() as u64))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError> {
        let data = self.data.lock().unwrap();
        let mut orders: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((page_slice(&orders, page), orders.len() as u64))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().unwrap();
        let Some(order) = data
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == from)
        else {
            return Ok(false);
        };
        order.status = to;
        order.updated_at = Utc::now();
        let restock: Vec<(Uuid, i32)> = if to == OrderStatus::Cancelled {
            order.items.iter().map(|i| (i.product_id, i.quantity)).collect()
        } else {
            vec![]
        };
        for (product_id, quantity) in restock {
            if let Some(p) = data.products.iter_mut().find(|p| p.id == product_id) {
                p.stock += quantity;
            }
        }
        Ok(true)
    }
}

// ── PlainPasswords ───────────────────────────────────────────────────────────

pub struct PlainPasswords;

impl PasswordPort for PlainPasswords {
    async fn hash(&self, password: &str) -> Result<String, StoreError> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, StoreError> {
        Ok(hash == format!("plain:{password}"))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn customer() -> Identity {
    Identity {
        user_id: Uuid::now_v7(),
        role: UserRole::User,
    }
}

pub fn admin() -> Identity {
    Identity {
        user_id: Uuid::now_v7(),
        role: UserRole::Admin,
    }
}

pub fn seed_category(store: &MemStore, name: &str, specifications: Vec<SpecDefinition>) -> Category {
    let now = Utc::now();
    let category = Category {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        slug: neurarig_domain::slug::slugify(name),
        description: None,
        image: None,
        specifications,
        created_at: now,
        updated_at: now,
    };
    store.data.lock().unwrap().categories.push(category.clone());
    category
}

pub fn seed_brand(store: &MemStore, name: &str) -> Brand {
    let now = Utc::now();
    let brand = Brand {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        slug: neurarig_domain::slug::slugify(name),
        description: None,
        logo: None,
        created_at: now,
        updated_at: now,
    };
    store.data.lock().unwrap().brands.push(brand.clone());
    brand
}

pub fn seed_product(
    store: &MemStore,
    name: &str,
    category: &Category,
    brand: &Brand,
    price: i64,
    stock: i32,
    rating: f64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        description: String::new(),
        price,
        category_id: category.id,
        brand_id: brand.id,
        images: vec![format!("/uploads/{}.png", neurarig_domain::slug::slugify(name))],
        specifications: vec![],
        stock,
        rating,
        featured: false,
        created_at: now,
        updated_at: now,
    };
    store.data.lock().unwrap().products.push(product.clone());
    product
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Grace Hopper".into(),
        address: "1 Harbor Way".into(),
        city: "Arlington".into(),
        postal_code: "22201".into(),
        country: "US".into(),
        phone: None,
    }
}
