//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

const USER_COLUMNS: &str = "id, name, email, role, phone, created_at, updated_at";

/// User row together with its password hash (login only)
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Fields for a new account; the password is already hashed
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub phone: Option<&'a str>,
}

/// Field changes; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<Role>,
    pub phone: Option<&'a str>,
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<User>>
where
    E: SqliteExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> RepoResult<Option<UserCredentials>> {
    let row = sqlx::query_as::<_, UserCredentials>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {USER_COLUMNS}"
    ))
    .bind(data.name.trim())
    .bind(data.email.trim().to_lowercase())
    .bind(data.password_hash)
    .bind(data.role)
    .bind(data.phone)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| duplicate_email(e, data.email))?;
    Ok(user)
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserChanges<'_>) -> RepoResult<User> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), role = COALESCE(?4, role), phone = COALESCE(?5, phone), updated_at = ?6 WHERE id = ?7 RETURNING {USER_COLUMNS}"
    ))
    .bind(data.name.map(str::trim))
    .bind(data.email.map(|e| e.trim().to_lowercase()))
    .bind(data.password_hash)
    .bind(data.role)
    .bind(data.phone)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| duplicate_email(e, data.email.unwrap_or("")))?
    .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Delete a user; their reservations go with them (FK cascade).
///
/// Room occupancy is not touched here, callers realign it in the same
/// transaction (see `ReservationManager::remove_user`).
pub async fn delete<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

fn duplicate_email(err: sqlx::Error, email: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Email '{}' is already registered", email.trim()))
        }
        other => other,
    }
}
