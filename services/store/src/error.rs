use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Store service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("missing data")]
    MissingData,
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid status transition")]
    InvalidStatusTransition,
    #[error("{0}")]
    InvalidUpload(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("brand not found")]
    BrandNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("cart item not found")]
    CartItemNotFound,
    #[error("email already exists")]
    EmailAlreadyExists,
    #[error("brand already exists")]
    BrandAlreadyExists,
    #[error("category is in use")]
    CategoryInUse,
    #[error("brand is in use")]
    BrandInUse,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::MissingData => "MISSING_DATA",
            Self::InsufficientStock => "INSUFFICIENT_STOCK",
            Self::EmptyCart => "EMPTY_CART",
            Self::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::BrandNotFound => "BRAND_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::CartItemNotFound => "CART_ITEM_NOT_FOUND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::BrandAlreadyExists => "BRAND_ALREADY_EXISTS",
            Self::CategoryInUse => "CATEGORY_IN_USE",
            Self::BrandInUse => "BRAND_IN_USE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_)
            | Self::MissingData
            | Self::InsufficientStock
            | Self::EmptyCart
            | Self::InvalidStatusTransition
            | Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::CategoryNotFound
            | Self::BrandNotFound
            | Self::ProductNotFound
            | Self::OrderNotFound
            | Self::CartItemNotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyExists
            | Self::BrandAlreadyExists
            | Self::CategoryInUse
            | Self::BrandInUse => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
