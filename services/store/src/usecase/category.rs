use chrono::Utc;
use uuid::Uuid;

use neurarig_domain::catalog::{SpecDefinition, validate_spec_schema};

use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::domain::types::Category;
use crate::error::StoreError;
use crate::usecase::{first_free_slug, non_blank};

/// Category by UUID, falling back to slug lookup.
pub async fn find_category<R: CategoryRepository>(
    repo: &R,
    id_or_slug: &str,
) -> Result<Option<Category>, StoreError> {
    match id_or_slug.parse::<Uuid>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_slug(id_or_slug).await,
    }
}

/// Trim names, options and units, then validate the schema.
fn normalize_schema(specs: Vec<SpecDefinition>) -> Result<Vec<SpecDefinition>, StoreError> {
    let specs: Vec<SpecDefinition> = specs
        .into_iter()
        .map(|s| SpecDefinition {
            name: s.name.trim().to_owned(),
            kind: s.kind,
            options: s
                .options
                .into_iter()
                .map(|o| o.trim().to_owned())
                .filter(|o| !o.is_empty())
                .collect(),
            required: s.required,
            unit: non_blank(s.unit),
        })
        .collect();
    validate_spec_schema(&specs).map_err(|e| StoreError::invalid_input(e.to_string()))?;
    Ok(specs)
}

fn required_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::invalid_input("name is required"));
    }
    Ok(name.to_owned())
}

// ── ListCategories ───────────────────────────────────────────────────────────

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Category>, StoreError> {
        self.repo.list().await
    }
}

// ── GetCategory ──────────────────────────────────────────────────────────────

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, id_or_slug: &str) -> Result<Category, StoreError> {
        find_category(&self.repo, id_or_slug)
            .await?
            .ok_or(StoreError::CategoryNotFound)
    }
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: Vec<SpecDefinition>,
}

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(&self, input: CreateCategoryInput) -> Result<Category, StoreError> {
        let name = required_name(&input.name)?;
        let specifications = normalize_schema(input.specifications)?;
        let repo = &self.repo;
        let slug = first_free_slug(&name, move |slug| async move {
            repo.slug_taken(&slug, None).await
        })
        .await?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name,
            slug,
            description: non_blank(input.description),
            image: non_blank(input.image),
            specifications,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&category).await?;
        Ok(category)
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

/// Partial update. Blank `description`/`image` clear the field.
#[derive(Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: Option<Vec<SpecDefinition>>,
}

pub struct UpdateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> UpdateCategoryUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<Category, StoreError> {
        if input.name.is_none()
            && input.description.is_none()
            && input.image.is_none()
            && input.specifications.is_none()
        {
            return Err(StoreError::MissingData);
        }
        let mut category = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CategoryNotFound)?;

        if let Some(ref name) = input.name {
            let name = required_name(name)?;
            let repo = &self.repo;
            category.slug = first_free_slug(&name, move |slug| async move {
                repo.slug_taken(&slug, Some(id)).await
            })
            .await?;
            category.name = name;
        }
        if let Some(specs) = input.specifications {
            category.specifications = normalize_schema(specs)?;
        }
        if input.description.is_some() {
            category.description = non_blank(input.description);
        }
        if input.image.is_some() {
            category.image = non_blank(input.image);
        }
        category.updated_at = Utc::now();
        self.repo.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<R: CategoryRepository, P: ProductRepository> {
    pub repo: R,
    pub products: P,
}

impl<R: CategoryRepository, P: ProductRepository> DeleteCategoryUseCase<R, P> {
    pub async fn execute(&self, id: Uuid) -> Result<(), StoreError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(StoreError::CategoryNotFound);
        }
        if self.products.count_by_category(id).await? > 0 {
            return Err(StoreError::CategoryInUse);
        }
        if !self.repo.delete(id).await? {
            return Err(StoreError::CategoryNotFound);
        }
        Ok(())
    }
}
