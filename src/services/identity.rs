use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::farmer_profile;
use crate::entities::supplier_profile;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::error::ApiError;
use crate::middleware::auth::generate_token;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: String,
    #[validate(length(max = 15))]
    #[serde(default)]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    // Farmer-specific fields
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub farm_size_acres: Option<f64>,
    // Supplier-specific fields
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub business_license: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
}

/// Create the account plus its role profile (farmers and suppliers carry
/// one), all in one transaction.
pub async fn register(
    db: &DatabaseConnection,
    payload: RegisterPayload,
) -> Result<user::Model, ApiError> {
    payload.validate()?;

    let role: Role = payload
        .role
        .parse()
        .map_err(|err: String| ApiError::Validation(err))?;

    let password = hash_password(&payload.password)?;

    let txn = db.begin().await?;

    let existing = UserEntity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        role: Set(role),
        phone: Set(payload.phone),
        location: Set(payload.location),
        is_verified: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    // A concurrent registration can still slip past the check and hit the
    // unique column; surface that as the same conflict.
    let created = new_user.insert(&txn).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ApiError::Conflict("Username already exists".to_string())
        }
        _ => ApiError::Db(err),
    })?;

    match role {
        Role::Farmer => {
            let profile = farmer_profile::ActiveModel {
                user_id: Set(created.id),
                farm_name: Set(payload.farm_name.unwrap_or_default()),
                farm_size_acres: Set(payload.farm_size_acres.unwrap_or_default()),
                specialization: Set(payload.specialization.unwrap_or_default()),
                rating_average: Set(0.0),
                total_sales: Set(0),
                ..Default::default()
            };
            profile.insert(&txn).await?;
        }
        Role::Supplier => {
            let profile = supplier_profile::ActiveModel {
                user_id: Set(created.id),
                company_name: Set(payload.company_name.unwrap_or_default()),
                business_license: Set(payload.business_license.unwrap_or_default()),
                specialization: Set(payload.specialization.unwrap_or_default()),
                rating_average: Set(0.0),
                ..Default::default()
            };
            profile.insert(&txn).await?;
        }
        Role::Consumer | Role::Business | Role::Transporter => {}
    }

    txn.commit().await?;
    Ok(created)
}

pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    jwt_secret: &str,
) -> Result<String, ApiError> {
    let account = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Permission("Invalid username or password".to_string()))?;

    account
        .check_hash(password)
        .map_err(|_| ApiError::Permission("Invalid username or password".to_string()))?;

    generate_token(account.id, account.role, jwt_secret)
        .map_err(|_| ApiError::Internal)
}

#[derive(Deserialize, Validate, Debug)]
pub struct ProfileEdit {
    #[validate(length(max = 15))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
}

/// Self-edit of contact fields. Accounts are never hard-deleted.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    edit: ProfileEdit,
) -> Result<user::Model, ApiError> {
    edit.validate()?;

    let account = UserEntity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    let mut account: user::ActiveModel = account.into();
    if let Some(phone) = edit.phone {
        account.phone = Set(phone);
    }
    if let Some(location) = edit.location {
        account.location = Set(location);
    }

    let updated = account.update(db).await?;
    Ok(updated)
}

pub async fn require_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, ApiError> {
    UserEntity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal)
}
