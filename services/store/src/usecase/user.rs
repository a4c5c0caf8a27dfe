use chrono::Utc;
use uuid::Uuid;

use neurarig_auth_types::token::issue_access_token;
use neurarig_domain::pagination::{PageRequest, Paged};
use neurarig_domain::user::UserRole;

use crate::domain::repository::{PasswordPort, UserRepository};
use crate::domain::types::{MIN_PASSWORD_LEN, User, validate_email};
use crate::error::StoreError;

/// Authenticated user plus a freshly issued access token.
#[derive(Debug)]
pub struct AuthOutput {
    pub user: User,
    pub token: String,
    pub expires_at: u64,
}

fn issue_token(user: User, jwt_secret: &str) -> Result<AuthOutput, StoreError> {
    let (token, expires_at) = issue_access_token(user.id, user.role, jwt_secret)
        .map_err(|e| StoreError::Internal(e.into()))?;
    Ok(AuthOutput {
        user,
        token,
        expires_at,
    })
}

fn check_password(password: &str) -> Result<(), StoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::invalid_input(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<R: UserRepository, P: PasswordPort> {
    pub users: R,
    pub passwords: P,
    pub jwt_secret: String,
}

impl<R: UserRepository, P: PasswordPort> RegisterUseCase<R, P> {
    pub async fn execute(&self, input: RegisterInput) -> Result<AuthOutput, StoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid_input("name is required"));
        }
        let email = input.email.trim().to_lowercase();
        if !validate_email(&email) {
            return Err(StoreError::invalid_input("invalid email address"));
        }
        check_password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(StoreError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            email,
            password_hash: self.passwords.hash(&input.password).await?,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        issue_token(user, &self.jwt_secret)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<R: UserRepository, P: PasswordPort> {
    pub users: R,
    pub passwords: P,
    pub jwt_secret: String,
}

impl<R: UserRepository, P: PasswordPort> LoginUseCase<R, P> {
    pub async fn execute(&self, input: LoginInput) -> Result<AuthOutput, StoreError> {
        let email = input.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(StoreError::InvalidCredentials)?;
        if !self
            .passwords
            .verify(&input.password, &user.password_hash)
            .await?
        {
            return Err(StoreError::InvalidCredentials);
        }
        issue_token(user, &self.jwt_secret)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, StoreError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

pub struct UpdateMeInput {
    pub name: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct UpdateMeUseCase<R: UserRepository, P: PasswordPort> {
    pub users: R,
    pub passwords: P,
}

impl<R: UserRepository, P: PasswordPort> UpdateMeUseCase<R, P> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateMeInput) -> Result<User, StoreError> {
        if input.name.is_none() && input.new_password.is_none() {
            return Err(StoreError::MissingData);
        }
        let name = match input.name.as_deref().map(str::trim) {
            Some("") => return Err(StoreError::invalid_input("name must not be empty")),
            other => other,
        };

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        let password_hash = match input.new_password {
            Some(ref new_password) => {
                check_password(new_password)?;
                let current = input
                    .current_password
                    .as_deref()
                    .ok_or(StoreError::InvalidCredentials)?;
                if !self.passwords.verify(current, &user.password_hash).await? {
                    return Err(StoreError::InvalidCredentials);
                }
                Some(self.passwords.hash(new_password).await?)
            }
            None => None,
        };

        self.users
            .update_profile(user_id, name, password_hash.as_deref())
            .await?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}

// ── ListUsers (admin) ────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Paged<User>, StoreError> {
        let page = page.clamped();
        let (users, total) = self.repo.list(page).await?;
        Ok(Paged::new(users, total, page))
    }
}

// ── SetRole (admin) ──────────────────────────────────────────────────────────

pub struct SetRoleUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> SetRoleUseCase<R> {
    pub async fn execute(
        &self,
        acting_user_id: Uuid,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<User, StoreError> {
        if acting_user_id == target_id {
            return Err(StoreError::invalid_input("you cannot change your own role"));
        }
        if !self.repo.set_role(target_id, role).await? {
            return Err(StoreError::UserNotFound);
        }
        self.repo
            .find_by_id(target_id)
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}

// ── DeleteUser (admin) ───────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, acting_user_id: Uuid, target_id: Uuid) -> Result<(), StoreError> {
        if acting_user_id == target_id {
            return Err(StoreError::invalid_input("you cannot delete your own account"));
        }
        if !self.repo.delete(target_id).await? {
            return Err(StoreError::UserNotFound);
        }
        Ok(())
    }
}

// ── EnsureAdmin (seed) ───────────────────────────────────────────────────────

pub struct EnsureAdminInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// What [`EnsureAdminUseCase`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created,
    Promoted,
    Unchanged,
}

pub struct EnsureAdminUseCase<R: UserRepository, P: PasswordPort> {
    pub users: R,
    pub passwords: P,
}

impl<R: UserRepository, P: PasswordPort> EnsureAdminUseCase<R, P> {
    /// Create the admin account, or promote an existing account with that
    /// email. An existing password is left untouched.
    pub async fn execute(&self, input: EnsureAdminInput) -> Result<AdminOutcome, StoreError> {
        let email = input.email.trim().to_lowercase();
        if !validate_email(&email) {
            return Err(StoreError::invalid_input("invalid email address"));
        }

        if let Some(user) = self.users.find_by_email(&email).await? {
            if user.role.is_admin() {
                return Ok(AdminOutcome::Unchanged);
            }
            self.users.set_role(user.id, UserRole::Admin).await?;
            return Ok(AdminOutcome::Promoted);
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid_input("name is required"));
        }
        check_password(&input.password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            email,
            password_hash: self.passwords.hash(&input.password).await?,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        Ok(AdminOutcome::Created)
    }
}
