use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use neurarig_domain::catalog::{ProductSortBy, ProductSpec, SpecDefinition};
use neurarig_domain::pagination::PageRequest;

use crate::domain::repository::{BrandRepository, CategoryRepository, ProductRepository};
use crate::domain::types::ProductFilter;
use crate::error::StoreError;
use crate::usecase::brand::{CreateBrandInput, CreateBrandUseCase};
use crate::usecase::category::{CreateCategoryInput, CreateCategoryUseCase};
use crate::usecase::product::{CreateProductInput, CreateProductUseCase};

/// Catalog seed file. Products reference their category and brand by name.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub brands: Vec<BrandSeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub specifications: Vec<SpecDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct BrandSeed {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub description: Option<String>,
    /// Cents.
    pub price: i64,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<ProductSpec>,
    pub stock: i32,
    pub rating: Option<f64>,
    #[serde(default)]
    pub featured: bool,
}

/// Counts of created and already-present records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub brands_created: usize,
    pub products_created: usize,
    pub skipped: usize,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ── ImportCatalog ────────────────────────────────────────────────────────────

pub struct ImportCatalogUseCase<C, B, P>
where
    C: CategoryRepository + Clone,
    B: BrandRepository + Clone,
    P: ProductRepository + Clone,
{
    pub categories: C,
    pub brands: B,
    pub products: P,
}

impl<C, B, P> ImportCatalogUseCase<C, B, P>
where
    C: CategoryRepository + Clone,
    B: BrandRepository + Clone,
    P: ProductRepository + Clone,
{
    /// Create whatever is missing. Records are matched by case-insensitive
    /// name, so running the same file twice creates nothing new.
    pub async fn execute(&self, file: CatalogFile) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();

        let mut category_ids: HashMap<String, Uuid> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (key(&c.name), c.id))
            .collect();
        let create_category = CreateCategoryUseCase {
            repo: self.categories.clone(),
        };
        for seed in file.categories {
            if category_ids.contains_key(&key(&seed.name)) {
                summary.skipped += 1;
                continue;
            }
            let category = create_category
                .execute(CreateCategoryInput {
                    name: seed.name,
                    description: seed.description,
                    image: seed.image,
                    specifications: seed.specifications,
                })
                .await?;
            tracing::info!(slug = %category.slug, "category created");
            category_ids.insert(key(&category.name), category.id);
            summary.categories_created += 1;
        }

        let mut brand_ids: HashMap<String, Uuid> = self
            .brands
            .list()
            .await?
            .into_iter()
            .map(|b| (key(&b.name), b.id))
            .collect();
        let create_brand = CreateBrandUseCase {
            repo: self.brands.clone(),
        };
        for seed in file.brands {
            if brand_ids.contains_key(&key(&seed.name)) {
                summary.skipped += 1;
                continue;
            }
            let brand = create_brand
                .execute(CreateBrandInput {
                    name: seed.name,
                    description: seed.description,
                    logo: seed.logo,
                })
                .await?;
            tracing::info!(slug = %brand.slug, "brand created");
            brand_ids.insert(key(&brand.name), brand.id);
            summary.brands_created += 1;
        }

        let create_product = CreateProductUseCase {
            products: self.products.clone(),
            categories: self.categories.clone(),
            brands: self.brands.clone(),
        };
        for seed in file.products {
            let category_id = *category_ids.get(&key(&seed.category)).ok_or_else(|| {
                StoreError::invalid_input(format!(
                    "product {:?} references unknown category {:?}",
                    seed.name, seed.category
                ))
            })?;
            let brand_id = *brand_ids.get(&key(&seed.brand)).ok_or_else(|| {
                StoreError::invalid_input(format!(
                    "product {:?} references unknown brand {:?}",
                    seed.name, seed.brand
                ))
            })?;
            if self.product_exists(category_id, &seed.name).await? {
                summary.skipped += 1;
                continue;
            }
            let product = create_product
                .execute(CreateProductInput {
                    name: seed.name,
                    description: seed.description,
                    price: seed.price,
                    category_id,
                    brand_id,
                    images: seed.images,
                    specifications: seed.specifications,
                    stock: seed.stock,
                    rating: seed.rating,
                    featured: seed.featured,
                })
                .await?;
            tracing::debug!(product_id = %product.id, name = %product.name, "product created");
            summary.products_created += 1;
        }

        Ok(summary)
    }

    async fn product_exists(&self, category_id: Uuid, name: &str) -> Result<bool, StoreError> {
        let filter = ProductFilter {
            category_id: Some(category_id),
            search: Some(name.trim().to_owned()),
            ..ProductFilter::default()
        };
        let page = PageRequest {
            per_page: 100,
            page: 1,
        };
        let (matches, _) = self
            .products
            .list(&filter, ProductSortBy::default(), page)
            .await?;
        Ok(matches.iter().any(|p| key(&p.name) == key(name)))
    }
}
