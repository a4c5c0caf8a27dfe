use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_domain::catalog::{ProductSpec, SpecDefinition};
use neurarig_domain::order::{OrderStatus, PaymentMethod};
use neurarig_domain::user::UserRole;

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Store account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product category with its specification schema.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: Vec<SpecDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog product. `price` is in cents.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub images: Vec<String>,
    pub specifications: Vec<ProductSpec>,
    pub stock: i32,
    pub rating: f64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for the product listing. Category and brand are already resolved
/// to ids.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub in_stock: bool,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

/// A product together with the names of its category and brand.
#[derive(Debug, Clone)]
pub struct ProductWithRefs {
    pub product: Product,
    pub category: Option<RefSummary>,
    pub brand: Option<RefSummary>,
}

/// Populated reference to a category or brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for RefSummary {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

impl From<&Brand> for RefSummary {
    fn from(b: &Brand) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            slug: b.slug.clone(),
        }
    }
}

/// Stored cart line. `price` is the unit price snapshot in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

/// Cart line populated with current product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: i64,
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Trim every field; empty required fields are reported by name.
    pub fn normalized(self) -> Result<Self, &'static str> {
        fn required(value: String, field: &'static str) -> Result<String, &'static str> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(field)
            } else {
                Ok(trimmed.to_owned())
            }
        }
        Ok(Self {
            full_name: required(self.full_name, "full_name")?,
            address: required(self.address, "address")?,
            city: required(self.city, "city")?,
            postal_code: required(self.postal_code, "postal_code")?,
            country: required(self.country, "country")?,
            phone: self
                .phone
                .map(|p| p.trim().to_owned())
                .filter(|p| !p.is_empty()),
        })
    }
}

/// Order line with the product name and unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-stock product as seen by the PC builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: i64,
    pub stock: i32,
    pub rating: f64,
    pub image: Option<String>,
}

/// Loose `local@domain.tld` check.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Keep spec entries with a non-empty name, trimming name and unit.
pub fn clean_product_specs(specs: Vec<ProductSpec>) -> Vec<ProductSpec> {
    specs
        .into_iter()
        .filter_map(|s| {
            let name = s.name.trim();
            if name.is_empty() {
                return None;
            }
            Some(ProductSpec {
                name: name.to_owned(),
                value: s.value.trim().to_owned(),
                unit: s.unit.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty()),
            })
        })
        .collect()
}
