use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::config::DB_TABLE_USERS;
use crate::userdb::errors::UserError;
use crate::userdb::types::{Role, StateColumns, User, UserRow};

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
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
            token_expires_at TIMESTAMP,
            address TEXT,
            contact_number TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

async fn fetch_one_sqlite(
    pool: &Pool<Sqlite>,
    column: &str,
    value: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT * FROM {} WHERE {} = ?
        "#,
        table_name, column
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    row.map(User::try_from).transpose()
}

pub(super) async fn find_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_sqlite(pool, "email", email).await
}

pub(super) async fn find_by_external_id_sqlite(
    pool: &Pool<Sqlite>,
    external_id: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_sqlite(pool, "external_id", external_id).await
}

pub(super) async fn find_by_verification_token_sqlite(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<Option<User>, UserError> {
    fetch_one_sqlite(pool, "verification_token", token).await
}

pub(super) async fn insert_user_sqlite(pool: &Pool<Sqlite>, user: &User) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let cols = StateColumns::from(&user.state);

    sqlx::query(&format!(
        r#"
        INSERT INTO {} (
            id, external_id, first_name, last_name, email, password_hash,
            role, account_status, is_email_verified, verification_token,
            token_expires_at, address, contact_number, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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

/// Flip the verified flag and clear the token columns in one statement.
/// Returns false when no row held the token (already consumed or unknown).
pub(super) async fn consume_verification_token_sqlite(
    pool: &Pool<Sqlite>,
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
            updated_at = ?
        WHERE verification_token = ?
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

pub(super) async fn update_role_status_sqlite(
    pool: &Pool<Sqlite>,
    external_id: &str,
    role: Role,
    account_status: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET role = ?, account_status = ?, updated_at = ?
        WHERE external_id = ?
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

pub(super) async fn update_profile_sqlite(
    pool: &Pool<Sqlite>,
    external_id: &str,
    address: &str,
    contact_number: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET address = ?, contact_number = ?, updated_at = ?
        WHERE external_id = ?
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

pub(super) async fn update_password_hash_sqlite(
    pool: &Pool<Sqlite>,
    id: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET password_hash = ?, updated_at = ? WHERE id = ?
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

pub(super) async fn delete_user_sqlite(
    pool: &Pool<Sqlite>,
    external_id: &str,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {} WHERE external_id = ?
        "#,
        table_name
    ))
    .bind(external_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn list_all_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
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
