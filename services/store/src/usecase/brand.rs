use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{BrandRepository, ProductRepository};
use crate::domain::types::Brand;
use crate::error::StoreError;
use crate::usecase::{first_free_slug, non_blank};

/// Brand by UUID, falling back to slug lookup.
pub async fn find_brand<R: BrandRepository>(
    repo: &R,
    id_or_slug: &str,
) -> Result<Option<Brand>, StoreError> {
    match id_or_slug.parse::<Uuid>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_slug(id_or_slug).await,
    }
}

/// Trimmed, non-empty name not used by another brand (case-insensitive).
async fn available_name<R: BrandRepository>(
    repo: &R,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::invalid_input("name is required"));
    }
    if let Some(existing) = repo.find_by_name(name).await? {
        if Some(existing.id) != exclude {
            return Err(StoreError::BrandAlreadyExists);
        }
    }
    Ok(name.to_owned())
}

// ── ListBrands ───────────────────────────────────────────────────────────────

pub struct ListBrandsUseCase<R: BrandRepository> {
    pub repo: R,
}

impl<R: BrandRepository> ListBrandsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Brand>, StoreError> {
        self.repo.list().await
    }
}

// ── GetBrand ─────────────────────────────────────────────────────────────────

pub struct GetBrandUseCase<R: BrandRepository> {
    pub repo: R,
}

impl<R: BrandRepository> GetBrandUseCase<R> {
    pub async fn execute(&self, id_or_slug: &str) -> Result<Brand, StoreError> {
        find_brand(&self.repo, id_or_slug)
            .await?
            .ok_or(StoreError::BrandNotFound)
    }
}

// ── CreateBrand ──────────────────────────────────────────────────────────────

pub struct CreateBrandInput {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

pub struct CreateBrandUseCase<R: BrandRepository> {
    pub repo: R,
}

impl<R: BrandRepository> CreateBrandUseCase<R> {
    pub async fn execute(&self, input: CreateBrandInput) -> Result<Brand, StoreError> {
        let name = available_name(&self.repo, &input.name, None).await?;
        let repo = &self.repo;
        let slug = first_free_slug(&name, move |slug| async move {
            repo.slug_taken(&slug, None).await
        })
        .await?;

        let now = Utc::now();
        let brand = Brand {
            id: Uuid::now_v7(),
            name,
            slug,
            description: non_blank(input.description),
            logo: non_blank(input.logo),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&brand).await?;
        Ok(brand)
    }
}

// ── UpdateBrand ──────────────────────────────────────────────────────────────

/// Partial update. Blank `description`/`logo` clear the field.
#[derive(Default)]
pub struct UpdateBrandInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
}

pub struct UpdateBrandUseCase<R: BrandRepository> {
    pub repo: R,
}

impl<R: BrandRepository> UpdateBrandUseCase<R> {
    pub async fn execute(&self, id: Uuid, input: UpdateBrandInput) -> Result<Brand, StoreError> {
        if input.name.is_none() && input.description.is_none() && input.logo.is_none() {
            return Err(StoreError::MissingData);
        }
        let mut brand = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(StoreError::BrandNotFound)?;

        if let Some(ref name) = input.name {
            let name = available_name(&self.repo, name, Some(id)).await?;
            let repo = &self.repo;
            brand.slug = first_free_slug(&name, move |slug| async move {
                repo.slug_taken(&slug, Some(id)).await
            })
            .await?;
            brand.name = name;
        }
        if input.description.is_some() {
            brand.description = non_blank(input.description);
        }
        if input.logo.is_some() {
            brand.logo = non_blank(input.logo);
        }
        brand.updated_at = Utc::now();
        self.repo.update(&brand).await?;
        Ok(brand)
    }
}

// ── DeleteBrand ──────────────────────────────────────────────────────────────

pub struct DeleteBrandUseCase<R: BrandRepository, P: ProductRepository> {
    pub repo: R,
    pub products: P,
}

impl<R: BrandRepository, P: ProductRepository> DeleteBrandUseCase<R, P> {
    pub async fn execute(&self, id: Uuid) -> Result<(), StoreError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(StoreError::BrandNotFound);
        }
        if self.products.count_by_brand(id).await? > 0 {
            return Err(StoreError::BrandInUse);
        }
        if !self.repo.delete(id).await? {
            return Err(StoreError::BrandNotFound);
        }
        Ok(())
    }
}
