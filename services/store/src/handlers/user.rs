use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::pagination::Paged;
use neurarig_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::StoreError;
use crate::handlers::{PageQuery, parse_id, require_admin};
use crate::state::AppState;
use crate::usecase::user::{
    AuthOutput, DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, LoginInput, LoginUseCase,
    RegisterInput, RegisterUseCase, SetRoleUseCase, UpdateMeInput, UpdateMeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "neurarig_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    /// Unix seconds.
    pub expires_at: u64,
}

impl From<AuthOutput> for AuthResponse {
    fn from(out: AuthOutput) -> Self {
        Self {
            user: out.user.into(),
            token: out.token,
            expires_at: out.expires_at,
        }
    }
}

// ── POST /api/users/register ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), StoreError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
        jwt_secret: state.jwt_secret.as_str().to_owned(),
    };
    let out = usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(out.into())))
}

// ── POST /api/users/login ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, StoreError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
        jwt_secret: state.jwt_secret.as_str().to_owned(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(out.into()))
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, StoreError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}

// ── PUT /api/users/me ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, StoreError> {
    let usecase = UpdateMeUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            UpdateMeInput {
                name: body.name,
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── GET /api/users (admin) ───────────────────────────────────────────────────

pub async fn list_users(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<UserResponse>>, StoreError> {
    require_admin(&identity)?;
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let users = usecase.execute(query.page_request()).await?;
    Ok(Json(users.map(UserResponse::from)))
}

// ── PUT /api/users/{id}/role (admin) ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

pub async fn set_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, StoreError> {
    require_admin(&identity)?;
    let target = parse_id(&id, StoreError::UserNotFound)?;
    let usecase = SetRoleUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id, target, body.role).await?;
    Ok(Json(user.into()))
}

// ── DELETE /api/users/{id} (admin) ───────────────────────────────────────────

pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StoreError> {
    require_admin(&identity)?;
    let target = parse_id(&id, StoreError::UserNotFound)?;
    let usecase = DeleteUserUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(identity.user_id, target).await?;
    Ok(StatusCode::NO_CONTENT)
}
