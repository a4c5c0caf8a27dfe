//! Bootstrap a store database: ensure an admin account and import a catalog.
//!
//! ```bash
//! cargo run -p neurarig-store --bin seed -- \
//!     --admin-email admin@neurarig.dev --admin-password changeme \
//!     --catalog services/store/seed/catalog.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sea_orm::Database;
use tracing::info;

use neurarig_store::infra::db::{
    DbBrandRepository, DbCategoryRepository, DbProductRepository, DbUserRepository,
};
use neurarig_store::infra::password::Argon2Passwords;
use neurarig_store::usecase::catalog_import::{CatalogFile, ImportCatalogUseCase};
use neurarig_store::usecase::user::{EnsureAdminInput, EnsureAdminUseCase};

#[derive(Parser)]
#[command(about = "Create the admin account and import catalog data")]
struct Args {
    /// PostgreSQL URL; falls back to `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Admin account email; created, or promoted if it already exists
    #[arg(long, env = "SEED_ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Password for a newly created admin account
    #[arg(long, env = "SEED_ADMIN_PASSWORD")]
    admin_password: Option<String>,

    #[arg(long, default_value = "Administrator")]
    admin_name: String,

    /// Catalog JSON file with categories, brands and products
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    neurarig_core::tracing::init_tracing();

    let args = Args::parse();
    let db = Database::connect(&args.database_url)
        .await
        .context("failed to connect to database")?;

    if let Some(email) = args.admin_email {
        let usecase = EnsureAdminUseCase {
            users: DbUserRepository { db: db.clone() },
            passwords: Argon2Passwords,
        };
        let outcome = usecase
            .execute(EnsureAdminInput {
                name: args.admin_name,
                email: email.clone(),
                password: args.admin_password.unwrap_or_default(),
            })
            .await
            .with_context(|| format!("failed to ensure admin {email}"))?;
        info!(email = %email, ?outcome, "admin account ready");
    }

    if let Some(path) = args.catalog {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let usecase = ImportCatalogUseCase {
            categories: DbCategoryRepository { db: db.clone() },
            brands: DbBrandRepository { db: db.clone() },
            products: DbProductRepository { db },
        };
        let summary = usecase
            .execute(file)
            .await
            .context("catalog import failed")?;
        info!(
            categories = summary.categories_created,
            brands = summary.brands_created,
            products = summary.products_created,
            skipped = summary.skipped,
            "catalog imported"
        );
    }

    Ok(())
}
