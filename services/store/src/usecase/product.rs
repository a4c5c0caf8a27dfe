use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use neurarig_domain::catalog::{ProductSortBy, ProductSpec};
use neurarig_domain::pagination::{PageRequest, Paged};

use crate::domain::repository::{
    BrandRepository, CategoryRepository, ImageStorage, ProductRepository,
};
use crate::domain::types::{
    Brand, Category, Product, ProductFilter, ProductWithRefs, RefSummary, clean_product_specs,
};
use crate::error::StoreError;
use crate::usecase::brand::find_brand;
use crate::usecase::category::find_category;

pub const FEATURED_DEFAULT_LIMIT: u64 = 8;
pub const FEATURED_MAX_LIMIT: u64 = 50;
pub const MAX_RATING: f64 = 5.0;
/// Ten billion dollars, in cents.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Attach category and brand summaries using one batch lookup each.
pub(crate) async fn with_refs<C: CategoryRepository, B: BrandRepository>(
    categories: &C,
    brands: &B,
    products: Vec<Product>,
) -> Result<Vec<ProductWithRefs>, StoreError> {
    let mut category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();
    let mut brand_ids: Vec<Uuid> = products.iter().map(|p| p.brand_id).collect();
    brand_ids.sort_unstable();
    brand_ids.dedup();

    let category_map: HashMap<Uuid, RefSummary> = categories
        .find_many(&category_ids)
        .await?
        .iter()
        .map(|c| (c.id, RefSummary::from(c)))
        .collect();
    let brand_map: HashMap<Uuid, RefSummary> = brands
        .find_many(&brand_ids)
        .await?
        .iter()
        .map(|b| (b.id, RefSummary::from(b)))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| ProductWithRefs {
            category: category_map.get(&product.category_id).cloned(),
            brand: brand_map.get(&product.brand_id).cloned(),
            product,
        })
        .collect())
}

fn check_price(price: i64) -> Result<(), StoreError> {
    if price < 0 {
        return Err(StoreError::invalid_input("price must not be negative"));
    }
    if price > MAX_PRICE {
        return Err(StoreError::invalid_input(format!(
            "price must not exceed {MAX_PRICE} cents"
        )));
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), StoreError> {
    if stock < 0 {
        return Err(StoreError::invalid_input("stock must not be negative"));
    }
    Ok(())
}

fn check_rating(rating: f64) -> Result<(), StoreError> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(StoreError::invalid_input(format!(
            "rating must be between 0 and {MAX_RATING}"
        )));
    }
    Ok(())
}

fn clean_images(images: Vec<String>) -> Vec<String> {
    images
        .into_iter()
        .map(|i| i.trim().to_owned())
        .filter(|i| !i.is_empty())
        .collect()
}

// ── ListProducts ─────────────────────────────────────────────────────────────

/// Listing query as received; category and brand may be ids or slugs.
#[derive(Debug, Default)]
pub struct ListProductsInput {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: bool,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: ProductSortBy,
    pub page: PageRequest,
}

pub struct ListProductsUseCase<P: ProductRepository, C: CategoryRepository, B: BrandRepository> {
    pub products: P,
    pub categories: C,
    pub brands: B,
}

impl<P: ProductRepository, C: CategoryRepository, B: BrandRepository> ListProductsUseCase<P, C, B> {
    pub async fn execute(
        &self,
        input: ListProductsInput,
    ) -> Result<Paged<ProductWithRefs>, StoreError> {
        let page = input.page.clamped();
        if input.min_price.is_some_and(|p| p < 0) || input.max_price.is_some_and(|p| p < 0) {
            return Err(StoreError::invalid_input("price filters must not be negative"));
        }
        if let (Some(min), Some(max)) = (input.min_price, input.max_price) {
            if min > max {
                return Err(StoreError::invalid_input(
                    "min_price must not exceed max_price",
                ));
            }
        }

        let mut filter = ProductFilter {
            featured: input.featured,
            in_stock: input.in_stock,
            search: input
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            min_price: input.min_price,
            max_price: input.max_price,
            ..Default::default()
        };
        // An unknown category or brand matches nothing.
        if let Some(key) = input.category.as_deref().filter(|k| !k.is_empty()) {
            match find_category(&self.categories, key).await? {
                Some(category) => filter.category_id = Some(category.id),
                None => return Ok(Paged::new(vec![], 0, page)),
            }
        }
        if let Some(key) = input.brand.as_deref().filter(|k| !k.is_empty()) {
            match find_brand(&self.brands, key).await? {
                Some(brand) => filter.brand_id = Some(brand.id),
                None => return Ok(Paged::new(vec![], 0, page)),
            }
        }

        let (products, total) = self.products.list(&filter, input.sort_by, page).await?;
        let items = with_refs(&self.categories, &self.brands, products).await?;
        Ok(Paged::new(items, total, page))
    }
}

// ── FeaturedProducts ─────────────────────────────────────────────────────────

pub struct FeaturedProductsUseCase<P: ProductRepository, C: CategoryRepository, B: BrandRepository>
{
    pub products: P,
    pub categories: C,
    pub brands: B,
}

impl<P: ProductRepository, C: CategoryRepository, B: BrandRepository>
    FeaturedProductsUseCase<P, C, B>
{
    pub async fn execute(&self, limit: Option<u64>) -> Result<Vec<ProductWithRefs>, StoreError> {
        let limit = limit
            .unwrap_or(FEATURED_DEFAULT_LIMIT)
            .clamp(1, FEATURED_MAX_LIMIT);
        let products = self.products.featured(limit).await?;
        with_refs(&self.categories, &self.brands, products).await
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

/// Product with its full category (including spec schema) and brand.
#[derive(Debug)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
}

pub struct GetProductUseCase<P: ProductRepository, C: CategoryRepository, B: BrandRepository> {
    pub products: P,
    pub categories: C,
    pub brands: B,
}

impl<P: ProductRepository, C: CategoryRepository, B: BrandRepository> GetProductUseCase<P, C, B> {
    pub async fn execute(&self, id: Uuid) -> Result<ProductDetail, StoreError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound)?;
        let category = self.categories.find_by_id(product.category_id).await?;
        let brand = self.brands.find_by_id(product.brand_id).await?;
        Ok(ProductDetail {
            product,
            category,
            brand,
        })
    }
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub images: Vec<String>,
    pub specifications: Vec<ProductSpec>,
    pub stock: i32,
    pub rating: Option<f64>,
    pub featured: bool,
}

pub struct CreateProductUseCase<P: ProductRepository, C: CategoryRepository, B: BrandRepository> {
    pub products: P,
    pub categories: C,
    pub brands: B,
}

impl<P: ProductRepository, C: CategoryRepository, B: BrandRepository>
    CreateProductUseCase<P, C, B>
{
    pub async fn execute(&self, input: CreateProductInput) -> Result<Product, StoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid_input("name is required"));
        }
        check_price(input.price)?;
        check_stock(input.stock)?;
        let rating = input.rating.unwrap_or(0.0);
        check_rating(rating)?;

        if self.categories.find_by_id(input.category_id).await?.is_none() {
            return Err(StoreError::CategoryNotFound);
        }
        if self.brands.find_by_id(input.brand_id).await?.is_none() {
            return Err(StoreError::BrandNotFound);
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            description: input.description.unwrap_or_default().trim().to_owned(),
            price: input.price,
            category_id: input.category_id,
            brand_id: input.brand_id,
            images: clean_images(input.images),
            specifications: clean_product_specs(input.specifications),
            stock: input.stock,
            rating,
            featured: input.featured,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&product).await?;
        Ok(product)
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub specifications: Option<Vec<ProductSpec>>,
    pub stock: Option<i32>,
    pub rating: Option<f64>,
    pub featured: Option<bool>,
}

impl UpdateProductInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.brand_id.is_none()
            && self.images.is_none()
            && self.specifications.is_none()
            && self.stock.is_none()
            && self.rating.is_none()
            && self.featured.is_none()
    }
}

pub struct UpdateProductUseCase<P: ProductRepository, C: CategoryRepository, B: BrandRepository> {
    pub products: P,
    pub categories: C,
    pub brands: B,
}

impl<P: ProductRepository, C: CategoryRepository, B: BrandRepository>
    UpdateProductUseCase<P, C, B>
{
    pub async fn execute(&self, id: Uuid, input: UpdateProductInput) -> Result<Product, StoreError> {
        if input.is_empty() {
            return Err(StoreError::MissingData);
        }
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound)?;

        if let Some(name) = input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::invalid_input("name must not be empty"));
            }
            product.name = name.to_owned();
        }
        if let Some(description) = input.description {
            product.description = description.trim().to_owned();
        }
        if let Some(price) = input.price {
            check_price(price)?;
            product.price = price;
        }
        if let Some(stock) = input.stock {
            check_stock(stock)?;
            product.stock = stock;
        }
        if let Some(rating) = input.rating {
            check_rating(rating)?;
            product.rating = rating;
        }
        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(StoreError::CategoryNotFound);
            }
            product.category_id = category_id;
        }
        if let Some(brand_id) = input.brand_id {
            if self.brands.find_by_id(brand_id).await?.is_none() {
                return Err(StoreError::BrandNotFound);
            }
            product.brand_id = brand_id;
        }
        if let Some(images) = input.images {
            product.images = clean_images(images);
        }
        if let Some(specs) = input.specifications {
            product.specifications = clean_product_specs(specs);
        }
        if let Some(featured) = input.featured {
            product.featured = featured;
        }
        product.updated_at = Utc::now();
        self.products.update(&product).await?;
        Ok(product)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

pub struct DeleteProductUseCase<P: ProductRepository, S: ImageStorage> {
    pub products: P,
    pub storage: S,
}

impl<P: ProductRepository, S: ImageStorage> DeleteProductUseCase<P, S> {
    pub async fn execute(&self, id: Uuid) -> Result<(), StoreError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound)?;
        if !self.products.delete(id).await? {
            return Err(StoreError::ProductNotFound);
        }
        for url in &product.images {
            if let Err(e) = self.storage.remove(url).await {
                tracing::warn!(error = %e, product_id = %id, url, "failed to remove product image");
            }
        }
        Ok(())
    }
}
