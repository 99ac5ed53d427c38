use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::config::DB_TABLE_USERS;
use crate::userdb::errors::UserError;
use crate::userdb::types::{Role, StateColumns, User, UserRow};

// Postgres implementations
pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY NOT NULL,
            external_id TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            account_status TEXT NOT NULL,
            is_email_verified BOOLEAN NOT NULL,
            verification_token TEXT,
            token_expires_at TIMESTAMPTZ,
            address TEXT,
            contact_number TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

async fn fetch_one_postgres(
    pool: &Pool<Postgres>,
    column: &str,
    value: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT * FROM {} WHERE {} = $1
        "#,
        table_name, column
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    row.map(User::try_from).transpose()
}

pub(super) async fn find_by_email_postgres(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_postgres(pool, "email", email).await
}

pub(super) async fn find_by_external_id_postgres(
    pool: &Pool<Postgres>,
    external_id: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_postgres(pool, "external_id", external_id).await
}

pub(super) async fn find_by_verification_token_postgres(
    pool: &Pool<Postgres>,
    token: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_postgres(pool, "verification_token", token).await
}

pub(super) async fn insert_user_postgres(
    pool: &Pool<Postgres>,
    user: &User,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let cols = StateColumns::from(&user.state);

    sqlx::query(&format!(
        r#"
        INSERT INTO {} (
            id, external_id, first_name, last_name, email, password_hash,
            role, account_status, is_email_verified, verification_token,
            token_expires_at, address, contact_number, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
        table_name
    ))
    .bind(&user.id)
    .bind(&user.external_id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(cols.account_status)
    .bind(cols.is_email_verified)
    .bind(&cols.verification_token)
    .bind(cols.token_expires_at)
    .bind(&user.address)
    .bind(&user.contact_number)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn consume_verification_token_postgres(
    pool: &Pool<Postgres>,
    token: &str,
    now: DateTime<Utc>,
) -> Result<bool, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET
            is_email_verified = TRUE,
            verification_token = NULL,
            token_expires_at = NULL,
            updated_at = $1
        WHERE verification_token = $2
        "#,
        table_name
    ))
    .bind(now)
    .bind(token)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn update_role_status_postgres(
    pool: &Pool<Postgres>,
    external_id: &str,
    role: Role,
    account_status: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET role = $1, account_status = $2, updated_at = $3
        WHERE external_id = $4
        "#,
        table_name
    ))
    .bind(role.as_str())
    .bind(account_status)
    .bind(now)
    .bind(external_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

pub(super) async fn update_profile_postgres(
    pool: &Pool<Postgres>,
    external_id: &str,
    address: &str,
    contact_number: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET address = $1, contact_number = $2, updated_at = $3
        WHERE external_id = $4
        "#,
        table_name
    ))
    .bind(address)
    .bind(contact_number)
    .bind(now)
    .bind(external_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

pub(super) async fn update_password_hash_postgres(
    pool: &Pool<Postgres>,
    id: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET password_hash = $1, updated_at = $2 WHERE id = $3
        "#,
        table_name
    ))
    .bind(password_hash)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

pub(super) async fn delete_user_postgres(
    pool: &Pool<Postgres>,
    external_id: &str,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {} WHERE external_id = $1
        "#,
        table_name
    ))
    .bind(external_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn list_all_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let rows = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT * FROM {} ORDER BY created_at ASC
        "#,
        table_name
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    rows.into_iter().map(User::try_from).collect()
}
