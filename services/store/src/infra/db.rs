use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionError,
    TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, OnConflict},
};
use uuid::Uuid;

use neurarig_domain::catalog::ProductSortBy;
use neurarig_domain::order::OrderStatus;
use neurarig_domain::pagination::{PageRequest, Sort};
use neurarig_domain::user::UserRole;
use neurarig_store_schema::{
    brands, cart_items, carts, categories, order_items, orders, products, users,
};

use crate::domain::repository::{
    BrandRepository, CartRepository, CategoryRepository, OrderRepository, ProductRepository,
    UserRepository,
};
use crate::domain::types::{
    Brand, CartLine, CatalogEntry, Category, Order, OrderItem, Product, ProductFilter, User,
};
use crate::error::StoreError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(new_name) = name {
            am.name = Set(new_name.to_owned());
        }
        if let Some(new_hash) = password_hash {
            am.password_hash = Set(new_hash.to_owned());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update user profile")?;
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), StoreError> {
        let total = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok((models.into_iter().map(user_from_model).collect(), total))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<bool, StoreError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(i16::from(role.as_u8())))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set user role")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: UserRole::from_u8(model.role as u8).unwrap_or(UserRole::User),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models
            .into_iter()
            .map(category_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model).transpose()?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find category by slug")?;
        Ok(model.map(category_from_model).transpose()?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find categories by ids")?;
        Ok(models
            .into_iter()
            .map(category_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        let mut query = categories::Entity::find().filter(categories::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(categories::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("check category slug")?;
        Ok(count > 0)
    }

    async fn create(&self, category: &Category) -> Result<(), StoreError> {
        category_to_active(category)?
            .insert(&self.db)
            .await
            .context("create category")?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), StoreError> {
        category_to_active(category)?
            .update(&self.db)
            .await
            .context("update category")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(result.rows_affected > 0)
    }
}

fn category_to_active(category: &Category) -> anyhow::Result<categories::ActiveModel> {
    Ok(categories::ActiveModel {
        id: Set(category.id),
        name: Set(category.name.clone()),
        slug: Set(category.slug.clone()),
        description: Set(category.description.clone()),
        image: Set(category.image.clone()),
        specifications: Set(serde_json::to_value(&category.specifications)
            .context("encode category spec schema")?),
        created_at: Set(category.created_at),
        updated_at: Set(category.updated_at),
    })
}

fn category_from_model(model: categories::Model) -> anyhow::Result<Category> {
    Ok(Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        image: model.image,
        specifications: serde_json::from_value(model.specifications)
            .with_context(|| format!("decode spec schema of category {}", model.id))?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Brand repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBrandRepository {
    pub db: DatabaseConnection,
}

impl BrandRepository for DbBrandRepository {
    async fn list(&self) -> Result<Vec<Brand>, StoreError> {
        let models = brands::Entity::find()
            .order_by_asc(brands::Column::Name)
            .all(&self.db)
            .await
            .context("list brands")?;
        Ok(models.into_iter().map(brand_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Brand>, StoreError> {
        let model = brands::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find brand by id")?;
        Ok(model.map(brand_from_model))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Brand>, StoreError> {
        let model = brands::Entity::find()
            .filter(brands::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find brand by slug")?;
        Ok(model.map(brand_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        let model = brands::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(brands::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(&self.db)
            .await
            .context("find brand by name")?;
        Ok(model.map(brand_from_model))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Brand>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = brands::Entity::find()
            .filter(brands::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find brands by ids")?;
        Ok(models.into_iter().map(brand_from_model).collect())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        let mut query = brands::Entity::find().filter(brands::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(brands::Column::Id.ne(id));
        }
        let count = query.count(&self.db).await.context("check brand slug")?;
        Ok(count > 0)
    }

    async fn create(&self, brand: &Brand) -> Result<(), StoreError> {
        brand_to_active(brand)
            .insert(&self.db)
            .await
            .context("create brand")?;
        Ok(())
    }

    async fn update(&self, brand: &Brand) -> Result<(), StoreError> {
        brand_to_active(brand)
            .update(&self.db)
            .await
            .context("update brand")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = brands::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete brand")?;
        Ok(result.rows_affected > 0)
    }
}

fn brand_to_active(brand: &Brand) -> brands::ActiveModel {
    brands::ActiveModel {
        id: Set(brand.id),
        name: Set(brand.name.clone()),
        slug: Set(brand.slug.clone()),
        description: Set(brand.description.clone()),
        logo: Set(brand.logo.clone()),
        created_at: Set(brand.created_at),
        updated_at: Set(brand.updated_at),
    }
}

fn brand_from_model(model: brands::Model) -> Brand {
    Brand {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        logo: model.logo,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

/// Lowercased `%term%` with LIKE metacharacters escaped by `\`.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), StoreError> {
        let mut query = products::Entity::find();
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(brand_id) = filter.brand_id {
            query = query.filter(products::Column::BrandId.eq(brand_id));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(products::Column::Featured.eq(featured));
        }
        if filter.in_stock {
            query = query.filter(products::Column::Stock.gt(0));
        }
        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                    .like(LikeExpr::new(contains_pattern(search)).escape('\\')),
            );
        }
        if let Some(min) = filter.min_price {
            query = query.filter(products::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(products::Column::Price.lte(max));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count products")?;

        query = match sort_by {
            ProductSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(products::Column::CreatedAt),
            ProductSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(products::Column::CreatedAt),
            ProductSortBy::Price(Sort::Desc) => query.order_by_desc(products::Column::Price),
            ProductSortBy::Price(Sort::Asc) => query.order_by_asc(products::Column::Price),
            ProductSortBy::RatingDesc => query.order_by_desc(products::Column::Rating),
            ProductSortBy::NameAsc => query.order_by_asc(products::Column::Name),
        };
        let models = query
            .order_by_asc(products::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list products")?;
        let items = models
            .into_iter()
            .map(product_from_model)
            .collect::<anyhow::Result<_>>()?;
        Ok((items, total))
    }

    async fn featured(&self, limit: u64) -> Result<Vec<Product>, StoreError> {
        let models = products::Entity::find()
            .filter(products::Column::Featured.eq(true))
            .order_by_desc(products::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list featured products")?;
        Ok(models
            .into_iter()
            .map(product_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product by id")?;
        Ok(model.map(product_from_model).transpose()?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = products::Entity::find()
            .filter(products::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find products by ids")?;
        Ok(models
            .into_iter()
            .map(product_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, product: &Product) -> Result<(), StoreError> {
        product_to_active(product)?
            .insert(&self.db)
            .await
            .context("create product")?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        product_to_active(product)?
            .update(&self.db)
            .await
            .context("update product")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, StoreError> {
        let count = products::Entity::find()
            .filter(products::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .context("count products by category")?;
        Ok(count)
    }

    async fn count_by_brand(&self, brand_id: Uuid) -> Result<u64, StoreError> {
        let count = products::Entity::find()
            .filter(products::Column::BrandId.eq(brand_id))
            .count(&self.db)
            .await
            .context("count products by brand")?;
        Ok(count)
    }

    async fn catalog_snapshot(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let models = products::Entity::find()
            .filter(products::Column::Stock.gt(0))
            .order_by_desc(products::Column::Rating)
            .order_by_asc(products::Column::Price)
            .all(&self.db)
            .await
            .context("load catalog snapshot")?;
        let category_names: HashMap<Uuid, String> = categories::Entity::find()
            .all(&self.db)
            .await
            .context("load category names")?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let brand_names: HashMap<Uuid, String> = brands::Entity::find()
            .all(&self.db)
            .await
            .context("load brand names")?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let images: Vec<String> = serde_json::from_value(model.images)
                    .with_context(|| format!("decode images of product {}", model.id))?;
                Ok(CatalogEntry {
                    id: model.id,
                    name: model.name,
                    category: category_names
                        .get(&model.category_id)
                        .cloned()
                        .unwrap_or_default(),
                    brand: brand_names.get(&model.brand_id).cloned().unwrap_or_default(),
                    price: model.price,
                    stock: model.stock,
                    rating: model.rating,
                    image: images.into_iter().next(),
                })
            })
            .collect::<anyhow::Result<_>>()
            .map_err(StoreError::from)
    }
}

fn product_to_active(product: &Product) -> anyhow::Result<products::ActiveModel> {
    Ok(products::ActiveModel {
        id: Set(product.id),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        price: Set(product.price),
        category_id: Set(product.category_id),
        brand_id: Set(product.brand_id),
        images: Set(serde_json::to_value(&product.images).context("encode product images")?),
        specifications: Set(serde_json::to_value(&product.specifications)
            .context("encode product specifications")?),
        stock: Set(product.stock),
        rating: Set(product.rating),
        featured: Set(product.featured),
        created_at: Set(product.created_at),
        updated_at: Set(product.updated_at),
    })
}

fn product_from_model(model: products::Model) -> anyhow::Result<Product> {
    Ok(Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        brand_id: model.brand_id,
        images: serde_json::from_value(model.images)
            .with_context(|| format!("decode images of product {}", model.id))?,
        specifications: serde_json::from_value(model.specifications)
            .with_context(|| format!("decode specifications of product {}", model.id))?,
        stock: model.stock,
        rating: model.rating,
        featured: model.featured,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

async fn cart_id_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Option<Uuid>, DbErr> {
    let cart = carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(cart.map(|c| c.id))
}

impl CartRepository for DbCartRepository {
    async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, StoreError> {
        let Some(cart_id) = cart_id_of(&self.db, user_id).await.context("find cart")? else {
            return Ok(vec![]);
        };
        let models = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cart items")?;
        Ok(models
            .into_iter()
            .map(|m| CartLine {
                product_id: m.product_id,
                quantity: m.quantity,
                price: m.price,
            })
            .collect())
    }

    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> Result<(), StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let line = line.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    carts::Entity::insert(carts::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        user_id: Set(user_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                    })
                    .on_conflict(
                        OnConflict::column(carts::Column::UserId)
                            .update_column(carts::Column::UpdatedAt)
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    let cart_id = cart_id_of(txn, user_id)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("cart of {user_id}")))?;

                    cart_items::Entity::insert(cart_items::ActiveModel {
                        cart_id: Set(cart_id),
                        product_id: Set(line.product_id),
                        quantity: Set(line.quantity),
                        price: Set(line.price),
                        created_at: Set(now),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            cart_items::Column::CartId,
                            cart_items::Column::ProductId,
                        ])
                        .update_columns([cart_items::Column::Quantity, cart_items::Column::Price])
                        .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("upsert cart line")?;
        Ok(())
    }

    async fn remove_line(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        let Some(cart_id) = cart_id_of(&self.db, user_id).await.context("find cart")? else {
            return Ok(false);
        };
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await
            .context("remove cart line")?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), StoreError> {
        if let Some(cart_id) = cart_id_of(&self.db, user_id).await.context("find cart")? {
            cart_items::Entity::delete_many()
                .filter(cart_items::Column::CartId.eq(cart_id))
                .exec(&self.db)
                .await
                .context("clear cart")?;
        }
        Ok(())
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl DbOrderRepository {
    /// Attach items to a page of order rows with one extra query.
    async fn with_items(&self, models: Vec<orders::Model>) -> Result<Vec<Order>, StoreError> {
        if models.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(ids))
            .order_by_asc(order_items::Column::Name)
            .all(&self.db)
            .await
            .context("list order items")?
        {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(order_item_from_model(item));
        }
        Ok(models
            .into_iter()
            .map(|m| {
                let items = items_by_order.remove(&m.id).unwrap_or_default();
                order_from_model(m, items)
            })
            .collect::<anyhow::Result<_>>()?)
    }
}

impl OrderRepository for DbOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), StoreError> {
        let shipping_address =
            serde_json::to_value(&order.shipping_address).context("encode shipping address")?;
        self.db
            .transaction::<_, (), StoreError>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    for item in &order.items {
                        let result = products::Entity::update_many()
                            .col_expr(
                                products::Column::Stock,
                                Expr::col(products::Column::Stock).sub(item.quantity),
                            )
                            .col_expr(products::Column::UpdatedAt, Expr::value(order.created_at))
                            .filter(products::Column::Id.eq(item.product_id))
                            .filter(products::Column::Stock.gte(item.quantity))
                            .exec(txn)
                            .await
                            .context("decrement product stock")?;
                        if result.rows_affected == 0 {
                            return Err(StoreError::InsufficientStock);
                        }
                    }

                    orders::ActiveModel {
                        id: Set(order.id),
                        user_id: Set(order.user_id),
                        total: Set(order.total),
                        shipping_address: Set(shipping_address),
                        payment_method: Set(order.payment_method.as_str().to_owned()),
                        status: Set(order.status.as_str().to_owned()),
                        created_at: Set(order.created_at),
                        updated_at: Set(order.updated_at),
                    }
                    .insert(txn)
                    .await
                    .context("insert order")?;

                    if !order.items.is_empty() {
                        order_items::Entity::insert_many(order.items.iter().map(|item| {
                            order_items::ActiveModel {
                                order_id: Set(order.id),
                                product_id: Set(item.product_id),
                                name: Set(item.name.clone()),
                                quantity: Set(item.quantity),
                                price: Set(item.price),
                            }
                        }))
                        .exec_without_returning(txn)
                        .await
                        .context("insert order items")?;
                    }

                    if let Some(cart_id) = cart_id_of(txn, order.user_id)
                        .await
                        .context("find cart")?
                    {
                        // Lines added after the cart was read stay in the cart.
                        cart_items::Entity::delete_many()
                            .filter(cart_items::Column::CartId.eq(cart_id))
                            .filter(
                                cart_items::Column::ProductId
                                    .is_in(order.items.iter().map(|i| i.product_id)),
                            )
                            .exec(txn)
                            .await
                            .context("remove ordered cart lines")?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => {
                    StoreError::Internal(anyhow::Error::new(e).context("place order"))
                }
                TransactionError::Transaction(e) => e,
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_items(vec![model]).await?.pop())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError> {
        let query = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count user orders")?;
        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list user orders")?;
        Ok((self.with_items(models).await?, total))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), StoreError> {
        let mut query = orders::Entity::find();
        if let Some(status) = status {
            query = query.filter(orders::Column::Status.eq(status.as_str()));
        }
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count orders")?;
        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list orders")?;
        Ok((self.with_items(models).await?, total))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        let moved = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let result = orders::Entity::update_many()
                        .col_expr(orders::Column::Status, Expr::value(to.as_str()))
                        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
                        .filter(orders::Column::Id.eq(id))
                        .filter(orders::Column::Status.eq(from.as_str()))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    if to == OrderStatus::Cancelled {
                        let items = order_items::Entity::find()
                            .filter(order_items::Column::OrderId.eq(id))
                            .all(txn)
                            .await?;
                        // Products deleted since checkout are skipped.
                        for item in items {
                            products::Entity::update_many()
                                .col_expr(
                                    products::Column::Stock,
                                    Expr::col(products::Column::Stock).add(item.quantity),
                                )
                                .col_expr(products::Column::UpdatedAt, Expr::value(now))
                                .filter(products::Column::Id.eq(item.product_id))
                                .exec(txn)
                                .await?;
                        }
                    }
                    Ok(true)
                })
            })
            .await
            .context("transition order status")?;
        Ok(moved)
    }
}

fn order_item_from_model(model: order_items::Model) -> OrderItem {
    OrderItem {
        product_id: model.product_id,
        name: model.name,
        quantity: model.quantity,
        price: model.price,
    }
}

fn order_from_model(model: orders::Model, items: Vec<OrderItem>) -> anyhow::Result<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        items,
        total: model.total,
        shipping_address: serde_json::from_value(model.shipping_address)
            .with_context(|| format!("decode shipping address of order {}", model.id))?,
        payment_method: model.payment_method.parse()?,
        status: model.status.parse()?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
