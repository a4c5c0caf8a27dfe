use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use neurarig_core::health::healthz;
use neurarig_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    brand::{create_brand, delete_brand, get_brand, list_brands, update_brand},
    builder::chat,
    cart::{add_item, clear_cart, get_cart, remove_item, update_item},
    category::{create_category, delete_category, get_category, list_categories, update_category},
    health::readyz,
    order::{
        cancel_order, checkout, get_order, list_my_orders, list_orders, update_order_status,
    },
    product::{
        create_product, delete_product, featured_products, get_product, list_products,
        update_product,
    },
    upload::upload_images,
    user::{delete_user, get_me, list_users, login, register, set_role, update_me},
};
use crate::infra::storage::UPLOADS_URL_PREFIX;
use crate::state::AppState;
use crate::usecase::upload::{MAX_FILE_BYTES, MAX_FILES};

/// Multipart framing overhead allowed on top of the image bytes.
const UPLOAD_SLACK_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    let api = Router::new()
        // Users
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(get_me).put(update_me))
        .route("/users", get(list_users))
        .route("/users/{id}/role", put(set_role))
        .route("/users/{id}", delete(delete_user))
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        // Brands
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/{id}",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
        // Products
        .route("/products", get(list_products).post(create_product))
        .route("/products/featured", get(featured_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Cart
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/{product_id}",
            put(update_item).delete(remove_item),
        )
        // Orders
        .route("/orders", post(checkout).get(list_orders))
        .route("/orders/mine", get(list_my_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/orders/{id}/cancel", put(cancel_order))
        // Builder
        .route("/builder/chat", post(chat))
        // Uploads
        .route(
            "/uploads",
            post(upload_images).layer(DefaultBodyLimit::max(
                MAX_FILES * MAX_FILE_BYTES + UPLOAD_SLACK_BYTES,
            )),
        );

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .with_state(state)
        .layer(cors_layer(cors_origin))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}

/// Any origin when `origin` is unset or not a valid header value.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            tracing::warn!("CORS_ORIGIN is not a valid header value, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}
