use neurarig_domain::catalog::{ProductSortBy, SpecDefinition, SpecKind};
use neurarig_domain::pagination::{PageRequest, Sort};
use neurarig_store::error::StoreError;
use neurarig_store::usecase::brand::{CreateBrandInput, CreateBrandUseCase, DeleteBrandUseCase};
use neurarig_store::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
};
use neurarig_store::usecase::product::{
    CreateProductInput, CreateProductUseCase, GetProductUseCase, ListProductsInput,
    ListProductsUseCase, MAX_PRICE,
};

use crate::helpers::{MemStore, seed_brand, seed_category, seed_product};

fn category_input(name: &str) -> CreateCategoryInput {
    CreateCategoryInput {
        name: name.into(),
        description: None,
        image: None,
        specifications: vec![SpecDefinition {
            name: " Socket ".into(),
            kind: SpecKind::Select,
            options: vec!["AM5".into(), " ".into()],
            required: true,
            unit: None,
        }],
    }
}

// ── Categories ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_suffix_slug_when_name_collides() {
    let store = MemStore::new();
    let create = CreateCategoryUseCase { repo: store.clone() };

    let first = create.execute(category_input("Graphics Cards")).await.unwrap();
    let second = create.execute(category_input("graphics cards!")).await.unwrap();

    assert_eq!(first.slug, "graphics-cards");
    assert_eq!(second.slug, "graphics-cards-1");
    assert_eq!(first.specifications[0].name, "Socket");
    assert_eq!(first.specifications[0].options, vec!["AM5"]);
}

#[tokio::test]
async fn should_find_category_by_id_or_slug() {
    let store = MemStore::new();
    let category = seed_category(&store, "Power Supplies", vec![]);
    let get = GetCategoryUseCase { repo: store };

    let by_slug = get.execute("power-supplies").await.unwrap();
    let by_id = get.execute(&category.id.to_string()).await.unwrap();
    assert_eq!(by_slug.id, category.id);
    assert_eq!(by_id.id, category.id);
    assert!(matches!(
        get.execute("missing").await,
        Err(StoreError::CategoryNotFound)
    ));
}

#[tokio::test]
async fn should_reject_select_spec_without_options() {
    let store = MemStore::new();
    let create = CreateCategoryUseCase { repo: store };
    let mut input = category_input("Cases");
    input.specifications[0].options.clear();
    let result = create.execute(input).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn should_refuse_to_delete_category_or_brand_in_use() {
    let store = MemStore::new();
    let category = seed_category(&store, "Memory", vec![]);
    let brand = seed_brand(&store, "G.Skill");
    seed_product(&store, "Trident Z5", &category, &brand, 11_900, 3, 4.8);

    let delete_category = DeleteCategoryUseCase {
        repo: store.clone(),
        products: store.clone(),
    };
    let delete_brand = DeleteBrandUseCase {
        repo: store.clone(),
        products: store.clone(),
    };
    assert!(matches!(
        delete_category.execute(category.id).await,
        Err(StoreError::CategoryInUse)
    ));
    assert!(matches!(
        delete_brand.execute(brand.id).await,
        Err(StoreError::BrandInUse)
    ));
}

// ── Brands ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_brand_name_differing_only_in_case() {
    let store = MemStore::new();
    let create = CreateBrandUseCase { repo: store };
    let input = |name: &str| CreateBrandInput {
        name: name.into(),
        description: None,
        logo: None,
    };
    create.execute(input("Noctua")).await.unwrap();
    let dup = create.execute(input("  NOCTUA ")).await;
    assert!(
        matches!(dup, Err(StoreError::BrandAlreadyExists)),
        "expected BrandAlreadyExists, got {dup:?}"
    );
}

// ── Products ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_and_sort_product_listing() {
    let store = MemStore::new();
    let gpus = seed_category(&store, "Graphics Cards", vec![]);
    let cpus = seed_category(&store, "Processors", vec![]);
    let msi = seed_brand(&store, "MSI");
    let amd = seed_brand(&store, "AMD");
    seed_product(&store, "RTX 4070 Super", &gpus, &msi, 59_900, 4, 4.8);
    seed_product(&store, "RTX 4060", &gpus, &msi, 29_900, 0, 4.4);
    seed_product(&store, "Ryzen 5 7600", &cpus, &amd, 19_900, 8, 4.6);

    let list = ListProductsUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store.clone(),
    };
    let page = list
        .execute(ListProductsInput {
            category: Some("graphics-cards".into()),
            in_stock: true,
            ..ListProductsInput::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product.name, "RTX 4070 Super");
    assert_eq!(page.items[0].brand.as_ref().unwrap().name, "MSI");

    let cheapest_first = list
        .execute(ListProductsInput {
            max_price: Some(30_000),
            sort_by: ProductSortBy::Price(Sort::Asc),
            page: PageRequest {
                per_page: 10,
                page: 1,
            },
            ..ListProductsInput::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = cheapest_first
        .items
        .iter()
        .map(|p| p.product.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ryzen 5 7600", "RTX 4060"]);
}

#[tokio::test]
async fn should_return_empty_page_for_unknown_category() {
    let store = MemStore::new();
    let category = seed_category(&store, "Storage", vec![]);
    let brand = seed_brand(&store, "Samsung");
    seed_product(&store, "990 Pro", &category, &brand, 17_900, 5, 4.9);

    let list = ListProductsUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store.clone(),
    };
    let page = list
        .execute(ListProductsInput {
            category: Some("no-such-category".into()),
            ..ListProductsInput::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn should_reject_inverted_price_range() {
    let store = MemStore::new();
    let list = ListProductsUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store,
    };
    let result = list
        .execute(ListProductsInput {
            min_price: Some(500),
            max_price: Some(100),
            ..ListProductsInput::default()
        })
        .await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn should_create_product_and_populate_references() {
    let store = MemStore::new();
    let category = seed_category(&store, "Cooling", vec![]);
    let brand = seed_brand(&store, "Noctua");
    let create = CreateProductUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store.clone(),
    };
    let product = create
        .execute(CreateProductInput {
            name: " NH-D15 ".into(),
            description: None,
            price: 11_900,
            category_id: category.id,
            brand_id: brand.id,
            images: vec![" /uploads/a.png ".into(), "".into()],
            specifications: vec![],
            stock: 3,
            rating: None,
            featured: true,
        })
        .await
        .unwrap();
    assert_eq!(product.name, "NH-D15");
    assert_eq!(product.images, vec!["/uploads/a.png"]);
    assert_eq!(product.rating, 0.0);

    let get = GetProductUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store,
    };
    let detail = get.execute(product.id).await.unwrap();
    assert_eq!(detail.category.unwrap().id, category.id);
    assert_eq!(detail.brand.unwrap().id, brand.id);
}

#[tokio::test]
async fn should_reject_product_with_unknown_brand() {
    let store = MemStore::new();
    let category = seed_category(&store, "Cases", vec![]);
    let create = CreateProductUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store,
    };
    let result = create
        .execute(CreateProductInput {
            name: "North".into(),
            description: None,
            price: 13_900,
            category_id: category.id,
            brand_id: uuid::Uuid::now_v7(),
            images: vec![],
            specifications: vec![],
            stock: 1,
            rating: Some(4.5),
            featured: false,
        })
        .await;
    assert!(matches!(result, Err(StoreError::BrandNotFound)));
}

#[tokio::test]
async fn should_reject_price_above_ceiling() {
    let store = MemStore::new();
    let category = seed_category(&store, "Cases", vec![]);
    let brand = seed_brand(&store, "Fractal Design");
    let create = CreateProductUseCase {
        products: store.clone(),
        categories: store.clone(),
        brands: store.clone(),
    };
    let product = |price| CreateProductInput {
        name: "North".into(),
        description: None,
        price,
        category_id: category.id,
        brand_id: brand.id,
        images: vec![],
        specifications: vec![],
        stock: 1,
        rating: None,
        featured: false,
    };

    let result = create.execute(product(MAX_PRICE + 1)).await;
    assert!(
        matches!(result, Err(StoreError::InvalidInput(ref msg)) if msg.contains("price")),
        "expected InvalidInput, got {result:?}"
    );
    assert_eq!(create.execute(product(MAX_PRICE)).await.unwrap().price, MAX_PRICE);
}
