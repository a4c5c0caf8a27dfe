use neurarig_store::error::StoreError;
use neurarig_store::usecase::catalog_import::{CatalogFile, ImportCatalogUseCase, ImportSummary};
use neurarig_testing::fixture::Fixture;

use crate::helpers::MemStore;

const CATALOG: &str = "services/store/seed/catalog.json";

fn importer(store: &MemStore) -> ImportCatalogUseCase<MemStore, MemStore, MemStore> {
    ImportCatalogUseCase {
        categories: store.clone(),
        brands: store.clone(),
        products: store.clone(),
    }
}

fn load_catalog() -> CatalogFile {
    serde_json::from_str(&Fixture::read(CATALOG)).expect("seed catalog parses")
}

#[tokio::test]
async fn should_import_bundled_catalog_once() {
    let store = MemStore::new();
    let file = load_catalog();
    let (categories, brands, products) =
        (file.categories.len(), file.brands.len(), file.products.len());

    let first = importer(&store).execute(file).await.unwrap();
    assert_eq!(
        first,
        ImportSummary {
            categories_created: categories,
            brands_created: brands,
            products_created: products,
            skipped: 0,
        }
    );

    let second = importer(&store).execute(load_catalog()).await.unwrap();
    assert_eq!(second.categories_created, 0);
    assert_eq!(second.brands_created, 0);
    assert_eq!(second.products_created, 0);
    assert_eq!(second.skipped, categories + brands + products);

    let data = store.data.lock().unwrap();
    assert_eq!(data.products.len(), products);
    assert!(data.products.iter().all(|p| {
        data.categories.iter().any(|c| c.id == p.category_id)
            && data.brands.iter().any(|b| b.id == p.brand_id)
    }));
}

#[tokio::test]
async fn should_reject_product_with_unknown_brand_name() {
    let store = MemStore::new();
    let file: CatalogFile = serde_json::from_value(serde_json::json!({
        "categories": [{ "name": "Cases" }],
        "products": [{
            "name": "Meshify 2",
            "price": 15900,
            "category": "cases",
            "brand": "Fractal Design",
            "stock": 4
        }]
    }))
    .unwrap();

    let result = importer(&store).execute(file).await;
    assert!(
        matches!(result, Err(StoreError::InvalidInput(ref msg)) if msg.contains("Fractal Design")),
        "expected InvalidInput naming the brand, got {result:?}"
    );
}
